//! Positioning helpers for authoring scripts.
//!
//! Everything works on world-unit bounding boxes; objects are moved by
//! shifting their position (and, for groups, every descendant).

use crate::script::{Geometry, ObjectSpec, Style, Vec2};

/// Axis-aligned bounding box in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn around(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn pad(&self, buff: f32) -> Bounds {
        Bounds {
            min: self.min - Vec2::new(buff, buff),
            max: self.max + Vec2::new(buff, buff),
        }
    }

    /// Point on the boundary in direction `dir` (components in -1..=1)
    pub fn edge(&self, dir: Vec2) -> Vec2 {
        let c = self.center();
        Vec2::new(
            c.x + dir.x * self.width() / 2.0,
            c.y + dir.y * self.height() / 2.0,
        )
    }
}

/// Visible frame for a given width and aspect ratio, centred on the origin
pub fn frame_bounds(frame_width: f32, aspect: f32) -> Bounds {
    Bounds::around(Vec2::ZERO, Vec2::new(frame_width, frame_width / aspect))
}

/// Bounds of an object; groups cover their descendants
pub fn bounds_of(spec: &ObjectSpec) -> Bounds {
    if spec.is_group() {
        let mut leaves = spec.children.iter().map(bounds_of);
        match leaves.next() {
            Some(first) => leaves.fold(first, |acc, b| acc.union(&b)),
            None => Bounds::around(spec.style().position, Vec2::ZERO),
        }
    } else {
        style_bounds(&spec.shape.geometry, &spec.shape.style)
    }
}

pub fn style_bounds(geometry: &Geometry, style: &Style) -> Bounds {
    Bounds::around(style.position, geometry.size() * style.scale)
}

/// Translate an object and all of its descendants
pub fn shift(spec: &mut ObjectSpec, delta: Vec2) {
    spec.shape.style.position += delta;
    for child in &mut spec.children {
        shift(child, delta);
    }
}

/// Centre an object on `point`
pub fn move_to(spec: &mut ObjectSpec, point: Vec2) {
    let delta = point - bounds_of(spec).center();
    shift(spec, delta);
}

/// Scale an object about its own centre; groups scale their layout too
pub fn scale(spec: &mut ObjectSpec, factor: f32) {
    let pivot = bounds_of(spec).center();
    scale_about(spec, pivot, factor);
}

fn scale_about(spec: &mut ObjectSpec, pivot: Vec2, factor: f32) {
    let style = &mut spec.shape.style;
    style.position = pivot + (style.position - pivot) * factor;
    style.scale *= factor;
    for child in &mut spec.children {
        scale_about(child, pivot, factor);
    }
}

/// Place `spec` beside `anchor` in direction `dir`, `buff` units apart
pub fn next_to(spec: &mut ObjectSpec, anchor: Bounds, dir: Vec2, buff: f32) {
    let own = bounds_of(spec);
    let anchor_center = anchor.center();
    let mut target = anchor_center;
    if dir.x != 0.0 {
        target.x += dir.x * (anchor.width() / 2.0 + own.width() / 2.0 + buff);
    }
    if dir.y != 0.0 {
        target.y += dir.y * (anchor.height() / 2.0 + own.height() / 2.0 + buff);
    }
    move_to(spec, target);
}

/// Push an object against the frame edge in direction `dir`
pub fn to_edge(spec: &mut ObjectSpec, frame: Bounds, dir: Vec2, buff: f32) {
    let own = bounds_of(spec);
    let mut target = own.center();
    if dir.x != 0.0 {
        target.x = frame.center().x + dir.x * (frame.width() / 2.0 - own.width() / 2.0 - buff);
    }
    if dir.y != 0.0 {
        target.y = frame.center().y + dir.y * (frame.height() / 2.0 - own.height() / 2.0 - buff);
    }
    move_to(spec, target);
}

/// Lay children out row-major in a grid of uniform cells centred on the origin
pub fn arrange_in_grid(children: &mut [ObjectSpec], rows: usize, cols: usize, buff: f32) {
    if children.is_empty() || cols == 0 {
        return;
    }
    let rows = rows.max(children.len().div_ceil(cols));
    let (cell_w, cell_h) = children.iter().map(bounds_of).fold((0.0f32, 0.0f32), |acc, b| {
        (acc.0.max(b.width()), acc.1.max(b.height()))
    });
    let total_w = cols as f32 * cell_w + (cols - 1) as f32 * buff;
    let total_h = rows as f32 * cell_h + (rows.saturating_sub(1)) as f32 * buff;
    for (i, child) in children.iter_mut().enumerate() {
        let (row, col) = (i / cols, i % cols);
        let x = -total_w / 2.0 + cell_w / 2.0 + col as f32 * (cell_w + buff);
        let y = total_h / 2.0 - cell_h / 2.0 - row as f32 * (cell_h + buff);
        move_to(child, Vec2::new(x, y));
    }
}

/// Stack children top to bottom, optionally flush left
pub fn arrange_down(children: &mut [ObjectSpec], buff: f32, align_left: bool) {
    let mut cursor_y = 0.0;
    let left = children
        .iter()
        .map(|c| bounds_of(c).width())
        .fold(0.0f32, f32::max)
        / -2.0;
    for child in children.iter_mut() {
        let own = bounds_of(child);
        let x = if align_left { left + own.width() / 2.0 } else { 0.0 };
        move_to(child, Vec2::new(x, cursor_y - own.height() / 2.0));
        cursor_y -= own.height() + buff;
    }
    let total = bounds_of_all(children);
    if let Some(total) = total {
        let delta = Vec2::ZERO - total.center();
        for child in children.iter_mut() {
            shift(child, Vec2::new(0.0, delta.y));
        }
    }
}

fn bounds_of_all(children: &[ObjectSpec]) -> Option<Bounds> {
    let mut iter = children.iter().map(bounds_of);
    let first = iter.next()?;
    Some(iter.fold(first, |acc, b| acc.union(&b)))
}

/// Rectangle geometry and style tightly surrounding `bounds`
pub fn surrounding(id: impl Into<String>, bounds: Bounds, buff: f32) -> ObjectSpec {
    let padded = bounds.pad(buff);
    let mut spec = ObjectSpec::new(
        id,
        Geometry::Rectangle {
            width: padded.width(),
            height: padded.height(),
            corner_radius: 0.0,
        },
    );
    spec.style_mut().position = padded.center();
    spec
}
