//! CPU rasterizer for timeline snapshots.
//!
//! Shapes are drawn from signed distances so edges get one pixel of
//! coverage falloff. Text is drawn as one block per grapheme.

use crate::renderer::FrameBuffer;
use crate::script::{text_grid, Color, Geometry, Vec2, GLYPH_ADVANCE, LINE_HEIGHT};
use crate::timeline::{ActiveFlash, RenderItem, Reveal, Snapshot};
use image::RgbaImage;
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::path::PathBuf;
use unicode_segmentation::UnicodeSegmentation;

/// Stroke widths are given in hundredths of a world unit
const STROKE_UNIT: f32 = 0.01;
const FLASH_RAYS: usize = 12;

/// Maps world units (origin centred, y up) to pixels
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixels_per_unit: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, frame_width: f32) -> Self {
        Self {
            width,
            height,
            pixels_per_unit: width as f32 / frame_width,
        }
    }

    pub fn to_pixel(&self, point: Vec2) -> (f32, f32) {
        (
            self.width as f32 / 2.0 + point.x * self.pixels_per_unit,
            self.height as f32 / 2.0 - point.y * self.pixels_per_unit,
        )
    }

    pub fn length(&self, units: f32) -> f32 {
        units * self.pixels_per_unit
    }

    /// Pixel rows and columns covering a world-space box, clamped to the frame
    fn pixel_span(&self, min: (f32, f32), max: (f32, f32)) -> Option<(u32, u32, u32, u32)> {
        let x0 = min.0.floor().max(0.0);
        let y0 = min.1.floor().max(0.0);
        let x1 = max.0.ceil().min(self.width as f32);
        let y1 = max.1.ceil().min(self.height as f32);
        (x0 < x1 && y0 < y1).then(|| (x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// Decoded images keyed by their path as written in the script
pub type ImageStore = HashMap<PathBuf, RgbaImage>;

/// Layer compositor
pub struct Compositor;

impl Compositor {
    /// Fill an axis-aligned pixel rectangle with color
    pub fn fill_rect(buffer: &mut FrameBuffer, x: i32, y: i32, width: u32, height: u32, color: [u8; 4]) {
        let (buf_width, buf_height) = buffer.dimensions();
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = (x + width as i32).clamp(0, buf_width as i32) as u32;
        let y1 = (y + height as i32).clamp(0, buf_height as i32) as u32;
        for py in y0..y1 {
            for px in x0..x1 {
                buffer.blend_pixel(px, py, color, 1.0);
            }
        }
    }

    /// Draw every item and flash of a snapshot, back to front
    pub fn draw_snapshot(buffer: &mut FrameBuffer, viewport: &Viewport, snapshot: &Snapshot, images: &ImageStore) {
        for item in &snapshot.items {
            Self::draw_item(buffer, viewport, item, images);
        }
        for flash in &snapshot.flashes {
            Self::draw_flash(buffer, viewport, flash);
        }
    }

    pub fn draw_item(buffer: &mut FrameBuffer, viewport: &Viewport, item: &RenderItem, images: &ImageStore) {
        let attrs = &item.attrs;
        if attrs.opacity <= 0.0 || attrs.scale <= 0.0 {
            return;
        }
        let (stroke_part, fill_part) = reveal_split(item);
        let stroke = Stroke {
            color: attrs.color.with_opacity(attrs.opacity),
            half_width: viewport.length(attrs.stroke_width * STROKE_UNIT * attrs.scale) / 2.0,
            progress: stroke_part,
        };
        let fill = Fill {
            color: attrs.color,
            gradient: &attrs.gradient,
            alpha: attrs.fill_opacity * attrs.opacity * fill_part,
        };
        let center = viewport.to_pixel(attrs.position);

        match &attrs.geometry {
            Geometry::Rectangle {
                width,
                height,
                corner_radius,
            } => {
                let half = (
                    viewport.length(width * attrs.scale) / 2.0,
                    viewport.length(height * attrs.scale) / 2.0,
                );
                let radius = viewport.length(corner_radius * attrs.scale).min(half.0).min(half.1);
                Self::draw_shape(buffer, viewport, center, half, &fill, &stroke, |dx, dy| {
                    rounded_box_distance(dx, dy, half, radius)
                });
            }
            Geometry::Circle { radius } => {
                let r = viewport.length(radius * attrs.scale);
                Self::draw_shape(buffer, viewport, center, (r, r), &fill, &stroke, |dx, dy| {
                    (dx * dx + dy * dy).sqrt() - r
                });
            }
            Geometry::Line { vector, arrow } => {
                let half = *vector * (attrs.scale * 0.5);
                let start = viewport.to_pixel(attrs.position - half);
                let end = viewport.to_pixel(attrs.position + half);
                Self::draw_line(buffer, viewport, start, end, *arrow, &stroke);
            }
            Geometry::Text { content, size, bold, .. } => {
                let progress = item.reveal_progress();
                let text = TextBlock {
                    content,
                    size: viewport.length(size * attrs.scale),
                    bold: *bold,
                    color: attrs.color.with_opacity(attrs.opacity),
                    revealed: progress,
                    cursor: matches!(item.reveal, Some((Reveal::Type, p)) if p < 1.0),
                };
                Self::draw_text(buffer, center, &text);
            }
            Geometry::Image { source, width, height } => {
                let half = (
                    viewport.length(width * attrs.scale) / 2.0,
                    viewport.length(height * attrs.scale) / 2.0,
                );
                match images.get(source) {
                    Some(img) => Self::blit_image(buffer, viewport, center, half, img, attrs.opacity * fill_part.max(stroke_part)),
                    None => {
                        // Unloaded images render as an outlined placeholder
                        Self::draw_shape(buffer, viewport, center, half, &fill, &stroke, |dx, dy| {
                            rounded_box_distance(dx, dy, half, 0.0)
                        });
                    }
                }
            }
            Geometry::Group => {}
        }
    }

    /// Rasterize a closed shape given its signed distance in pixels
    #[allow(clippy::too_many_arguments)]
    fn draw_shape<F>(
        buffer: &mut FrameBuffer,
        viewport: &Viewport,
        center: (f32, f32),
        half: (f32, f32),
        fill: &Fill,
        stroke: &Stroke,
        distance: F,
    ) where
        F: Fn(f32, f32) -> f32,
    {
        let pad = stroke.half_width + 1.0;
        let Some((x0, y0, x1, y1)) = viewport.pixel_span(
            (center.0 - half.0 - pad, center.1 - half.1 - pad),
            (center.0 + half.0 + pad, center.1 + half.1 + pad),
        ) else {
            return;
        };
        let draw_stroke = stroke.progress > 0.0 && stroke.half_width > 0.0;
        let draw_fill = fill.alpha > 0.0;

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - center.0;
                let dy = py as f32 + 0.5 - center.1;
                let d = distance(dx, dy);

                if draw_fill {
                    let coverage = (0.5 - d).clamp(0.0, 1.0);
                    if coverage > 0.0 {
                        let t = if half.0 > 0.0 { (dx / half.0 + 1.0) / 2.0 } else { 0.5 };
                        buffer.blend_pixel(px, py, fill.color_at(t), coverage);
                    }
                }

                if draw_stroke {
                    let coverage = (stroke.half_width + 0.5 - d.abs()).clamp(0.0, 1.0);
                    if coverage > 0.0 && outline_param(dx, dy) <= stroke.progress {
                        buffer.blend_pixel(px, py, stroke.color, coverage);
                    }
                }
            }
        }
    }

    fn draw_line(
        buffer: &mut FrameBuffer,
        viewport: &Viewport,
        start: (f32, f32),
        end: (f32, f32),
        arrow: bool,
        stroke: &Stroke,
    ) {
        if stroke.progress <= 0.0 {
            return;
        }
        let tip = (
            start.0 + (end.0 - start.0) * stroke.progress,
            start.1 + (end.1 - start.1) * stroke.progress,
        );
        let half_width = stroke.half_width.max(0.5);
        Self::stroke_segment(buffer, viewport, start, tip, half_width, stroke.color);

        if arrow {
            let (dx, dy) = (end.0 - start.0, end.1 - start.1);
            let len = (dx * dx + dy * dy).sqrt();
            if len > 0.0 {
                let (ux, uy) = (dx / len, dy / len);
                let head = (half_width * 6.0).max(viewport.length(0.2)).min(len);
                let base = (tip.0 - ux * head, tip.1 - uy * head);
                let left = (base.0 - uy * head * 0.5, base.1 + ux * head * 0.5);
                let right = (base.0 + uy * head * 0.5, base.1 - ux * head * 0.5);
                Self::fill_triangle(buffer, viewport, [tip, left, right], stroke.color);
            }
        }
    }

    fn stroke_segment(
        buffer: &mut FrameBuffer,
        viewport: &Viewport,
        a: (f32, f32),
        b: (f32, f32),
        half_width: f32,
        color: [u8; 4],
    ) {
        let pad = half_width + 1.0;
        let Some((x0, y0, x1, y1)) = viewport.pixel_span(
            (a.0.min(b.0) - pad, a.1.min(b.1) - pad),
            (a.0.max(b.0) + pad, a.1.max(b.1) + pad),
        ) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let d = segment_distance((px as f32 + 0.5, py as f32 + 0.5), a, b);
                let coverage = (half_width + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    buffer.blend_pixel(px, py, color, coverage);
                }
            }
        }
    }

    fn fill_triangle(buffer: &mut FrameBuffer, viewport: &Viewport, points: [(f32, f32); 3], color: [u8; 4]) {
        let min = (
            points.iter().map(|p| p.0).fold(f32::INFINITY, f32::min),
            points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min),
        );
        let max = (
            points.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max),
            points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max),
        );
        let Some((x0, y0, x1, y1)) = viewport.pixel_span(min, max) else {
            return;
        };
        let [a, b, c] = points;
        let edge = |p: (f32, f32), q: (f32, f32), r: (f32, f32)| (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0);
        for py in y0..y1 {
            for px in x0..x1 {
                let p = (px as f32 + 0.5, py as f32 + 0.5);
                let (e0, e1, e2) = (edge(a, b, p), edge(b, c, p), edge(c, a, p));
                let inside = (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0) || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0);
                if inside {
                    buffer.blend_pixel(px, py, color, 1.0);
                }
            }
        }
    }

    /// Draw text as one block per grapheme, centred on `center`
    fn draw_text(buffer: &mut FrameBuffer, center: (f32, f32), text: &TextBlock) {
        let (columns, rows) = text_grid(text.content);
        let advance = text.size * GLYPH_ADVANCE;
        let line = text.size * LINE_HEIGHT;
        let left = center.0 - columns as f32 * advance / 2.0;
        let top = center.1 - rows as f32 * line / 2.0;

        let total = text.content.graphemes(true).filter(|g| *g != "\n").count();
        let visible = (text.revealed.clamp(0.0, 1.0) * total as f32).ceil() as usize;
        let glyph_w = if text.bold { advance * 0.9 } else { advance * 0.7 };
        let glyph_h = text.size * 0.75;

        let mut shown = 0;
        let mut last_cell = (left, top);
        for (row, content_line) in text.content.split('\n').enumerate() {
            for (col, grapheme) in content_line.graphemes(true).enumerate() {
                if shown >= visible {
                    break;
                }
                shown += 1;
                let x = left + col as f32 * advance;
                let y = top + row as f32 * line;
                last_cell = (x + advance, y);
                if grapheme.trim().is_empty() {
                    continue;
                }
                let gy = y + (line - glyph_h) / 2.0;
                Self::fill_rect(
                    buffer,
                    x.round() as i32,
                    gy.round() as i32,
                    glyph_w.round().max(1.0) as u32,
                    glyph_h.round().max(1.0) as u32,
                    text.color,
                );
            }
        }

        if text.cursor {
            Self::fill_rect(
                buffer,
                last_cell.0.round() as i32,
                last_cell.1.round() as i32,
                (advance * 0.6).round().max(1.0) as u32,
                line.round().max(1.0) as u32,
                text.color,
            );
        }
    }

    /// Nearest-neighbour blit of an image into a pixel box
    fn blit_image(
        buffer: &mut FrameBuffer,
        viewport: &Viewport,
        center: (f32, f32),
        half: (f32, f32),
        img: &RgbaImage,
        opacity: f32,
    ) {
        let (img_w, img_h) = img.dimensions();
        if img_w == 0 || img_h == 0 || half.0 <= 0.0 || half.1 <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = viewport.pixel_span(
            (center.0 - half.0, center.1 - half.1),
            (center.0 + half.0, center.1 + half.1),
        ) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let u = (px as f32 + 0.5 - (center.0 - half.0)) / (half.0 * 2.0);
                let v = (py as f32 + 0.5 - (center.1 - half.1)) / (half.1 * 2.0);
                let sx = ((u * img_w as f32) as u32).min(img_w - 1);
                let sy = ((v * img_h as f32) as u32).min(img_h - 1);
                let texel = img.get_pixel(sx, sy).0;
                buffer.blend_pixel(px, py, texel, opacity);
            }
        }
    }

    /// Rays bursting outward from the flash centre, fading as they travel
    pub fn draw_flash(buffer: &mut FrameBuffer, viewport: &Viewport, flash: &ActiveFlash) {
        let center = viewport.to_pixel(flash.center);
        let radius = viewport.length(flash.radius);
        let inner = radius * (0.3 + 0.7 * flash.progress);
        let outer = inner + radius * 0.4 * (1.0 - flash.progress);
        let color = flash.color.with_opacity(1.0 - flash.progress);
        let half_width = viewport.length(0.02).max(1.0);
        for i in 0..FLASH_RAYS {
            let angle = i as f32 / FLASH_RAYS as f32 * TAU;
            let (sin, cos) = angle.sin_cos();
            let a = (center.0 + cos * inner, center.1 - sin * inner);
            let b = (center.0 + cos * outer, center.1 - sin * outer);
            Self::stroke_segment(buffer, viewport, a, b, half_width, color);
        }
    }
}

struct Stroke {
    color: [u8; 4],
    half_width: f32,
    /// Fraction of the outline drawn
    progress: f32,
}

struct Fill<'a> {
    color: Color,
    gradient: &'a [Color],
    alpha: f32,
}

impl Fill<'_> {
    /// Fill color at horizontal fraction `t` across the shape
    fn color_at(&self, t: f32) -> [u8; 4] {
        let color = match self.gradient {
            [] => self.color,
            [only] => *only,
            stops => {
                let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
                let i = (scaled.floor() as usize).min(stops.len() - 2);
                stops[i].lerp(stops[i + 1], scaled - i as f32)
            }
        };
        color.with_opacity(self.alpha)
    }
}

struct TextBlock<'a> {
    content: &'a str,
    size: f32,
    bold: bool,
    color: [u8; 4],
    revealed: f32,
    cursor: bool,
}

/// Outline and fill progress for an item's reveal
fn reveal_split(item: &RenderItem) -> (f32, f32) {
    match item.reveal {
        None => (1.0, 1.0),
        Some((Reveal::DrawThenFill, p)) => ((p * 2.0).min(1.0), (p * 2.0 - 1.0).max(0.0)),
        Some((_, p)) => (p, p),
    }
}

/// Position along an outline in `[0, 1)`, counter-clockwise from the right
fn outline_param(dx: f32, dy: f32) -> f32 {
    let angle = (-dy).atan2(dx);
    let angle = if angle < 0.0 { angle + TAU } else { angle };
    angle / TAU
}

fn rounded_box_distance(dx: f32, dy: f32, half: (f32, f32), radius: f32) -> f32 {
    let qx = dx.abs() - (half.0 - radius);
    let qy = dy.abs() - (half.1 - radius);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).min(0.0) - radius
}

fn segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
