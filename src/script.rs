use crate::rate::RateFunc;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::path::PathBuf;

/// Main video script structure that defines the entire video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoScript {
    pub metadata: Metadata,
    /// Narration clips, scheduled at absolute offsets into the timeline
    #[serde(default)]
    pub cues: Vec<AudioCue>,
    /// Steps played before the first segment; their objects may persist
    #[serde(default)]
    pub stage: Vec<Step>,
    pub segments: Vec<Segment>,
}

impl VideoScript {
    /// Iterate over every step of the script in playback order
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.stage
            .iter()
            .chain(self.segments.iter().flat_map(|s| s.steps.iter()))
    }
}

/// Video metadata and configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub resolution: Resolution,
    pub fps: u32,
    /// Minimum total length; the final frame is held until then
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Width of the visible frame in world units
    #[serde(default = "default_frame_width")]
    pub frame_width: f32,
}

fn default_frame_width() -> f32 {
    16.0
}

/// Video resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolution {
    Named(String), // e.g., "1920x1080", "1280x720"
    Dimensions { width: u32, height: u32 },
}

impl Resolution {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Resolution::Named(s) => {
                let parts: Vec<&str> = s.split('x').collect();
                if parts.len() == 2 {
                    let width = parts[0].parse().unwrap_or(1920);
                    let height = parts[1].parse().unwrap_or(1080);
                    (width, height)
                } else {
                    (1920, 1080) // Default to 1080p
                }
            }
            Resolution::Dimensions { width, height } => (*width, *height),
        }
    }
}

/// A narration clip tied to an offset (seconds) on the timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioCue {
    pub id: String,
    pub source: PathBuf,
    pub offset: f32,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    1.0
}

/// A thematic block of the video, bounded by setup and cleanup steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub steps: Vec<Step>,
}

/// A scene-mutation command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Put objects on stage instantly
    Add { objects: Vec<ObjectSpec> },
    /// Take objects off stage instantly
    Remove { targets: Vec<String> },
    /// Bundle existing objects under a new group id
    Group { id: String, members: Vec<String> },
    Play {
        animations: Vec<AnimationSpec>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_time: Option<f32>,
        #[serde(default)]
        lag_ratio: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rate_func: Option<RateFunc>,
    },
    Wait { seconds: f32 },
}

/// One animation inside a play step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSpec {
    #[serde(flatten)]
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_time: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_func: Option<RateFunc>,
}

impl AnimationSpec {
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            run_time: None,
            rate_func: None,
        }
    }

    pub fn run_time(mut self, seconds: f32) -> Self {
        self.run_time = Some(seconds);
        self
    }

    pub fn rate(mut self, rate: RateFunc) -> Self {
        self.rate_func = Some(rate);
        self
    }
}

impl From<Effect> for AnimationSpec {
    fn from(effect: Effect) -> Self {
        Self::new(effect)
    }
}

/// What an animation does to the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Create {
        object: ObjectSpec,
    },
    DrawBorderThenFill {
        object: ObjectSpec,
    },
    Write {
        object: ObjectSpec,
    },
    TypeWithCursor {
        object: ObjectSpec,
    },
    FadeIn {
        object: ObjectSpec,
        #[serde(default)]
        shift: Vec2,
        #[serde(default = "default_factor")]
        scale: f32,
    },
    GrowFromCenter {
        object: ObjectSpec,
    },
    FadeOut {
        target: String,
        #[serde(default)]
        shift: Vec2,
        #[serde(default = "default_factor")]
        scale: f32,
    },
    Animate {
        target: String,
        patch: AttrPatch,
    },
    Transform {
        target: String,
        into: ShapeSpec,
    },
    ReplacementTransform {
        source: String,
        object: ObjectSpec,
    },
    TransformFromCopy {
        source: String,
        object: ObjectSpec,
    },
    Indicate {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
        #[serde(default = "default_indicate_scale")]
        scale_factor: f32,
    },
    Flash {
        target: String,
        #[serde(default = "default_flash_color")]
        color: Color,
        #[serde(default = "default_factor")]
        radius: f32,
    },
    Group {
        animations: Vec<AnimationSpec>,
        #[serde(default)]
        lag_ratio: f32,
    },
}

fn default_factor() -> f32 {
    1.0
}

fn default_indicate_scale() -> f32 {
    1.2
}

fn default_flash_color() -> Color {
    Color::rgb(255, 255, 0)
}

impl Effect {
    /// Short name used in logs and summaries
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Create { .. } => "create",
            Effect::DrawBorderThenFill { .. } => "draw_border_then_fill",
            Effect::Write { .. } => "write",
            Effect::TypeWithCursor { .. } => "type_with_cursor",
            Effect::FadeIn { .. } => "fade_in",
            Effect::GrowFromCenter { .. } => "grow_from_center",
            Effect::FadeOut { .. } => "fade_out",
            Effect::Animate { .. } => "animate",
            Effect::Transform { .. } => "transform",
            Effect::ReplacementTransform { .. } => "replacement_transform",
            Effect::TransformFromCopy { .. } => "transform_from_copy",
            Effect::Indicate { .. } => "indicate",
            Effect::Flash { .. } => "flash",
            Effect::Group { .. } => "group",
        }
    }
}

/// A visual object declaration: an id, a shape and optional group children
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectSpec {
    pub id: String,
    #[serde(flatten)]
    pub shape: ShapeSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ObjectSpec>,
}

impl ObjectSpec {
    pub fn new(id: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            shape: ShapeSpec {
                geometry,
                style: Style::default(),
            },
            children: Vec::new(),
        }
    }

    /// Group object with inline children
    pub fn group(id: impl Into<String>, children: Vec<ObjectSpec>) -> Self {
        let mut spec = Self::new(id, Geometry::Group);
        spec.children = children;
        spec.sync_group_position();
        spec
    }

    pub fn is_group(&self) -> bool {
        matches!(self.shape.geometry, Geometry::Group)
    }

    /// This object followed by all descendants, depth first
    pub fn flatten(&self) -> Vec<&ObjectSpec> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }

    pub fn style(&self) -> &Style {
        &self.shape.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.shape.style
    }

    /// Centre the object (and its children) on `point`
    pub fn at(mut self, point: Vec2) -> Self {
        crate::layout::move_to(&mut self, point);
        self
    }

    pub fn scaled(mut self, factor: f32) -> Self {
        crate::layout::scale(&mut self, factor);
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.shape.style.color = color;
        self
    }

    pub fn filled(mut self, opacity: f32) -> Self {
        self.shape.style.fill_opacity = opacity;
        self
    }

    pub fn stroke(mut self, width: f32) -> Self {
        self.shape.style.stroke_width = width;
        self
    }

    pub fn gradient(mut self, colors: &[Color]) -> Self {
        self.shape.style.gradient = colors.to_vec();
        self
    }

    /// Keep a group's own position at the centre of its children
    pub(crate) fn sync_group_position(&mut self) {
        if self.is_group() && !self.children.is_empty() {
            self.shape.style.position = crate::layout::bounds_of(self).center();
        }
    }
}

/// Geometry plus style, without identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShapeSpec {
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default)]
    pub style: Style,
}

/// Shape of a visual object, in world units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Geometry {
    Rectangle {
        width: f32,
        height: f32,
        #[serde(default)]
        corner_radius: f32,
    },
    Circle {
        radius: f32,
    },
    /// Segment centred on the object position
    Line {
        vector: Vec2,
        #[serde(default)]
        arrow: bool,
    },
    Text {
        content: String,
        #[serde(default = "default_text_size")]
        size: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font: Option<String>,
        #[serde(default)]
        bold: bool,
    },
    Image {
        source: PathBuf,
        width: f32,
        height: f32,
    },
    Group,
}

fn default_text_size() -> f32 {
    0.5
}

/// Horizontal advance of one grapheme, relative to text size
pub const GLYPH_ADVANCE: f32 = 0.55;
/// Line height, relative to text size
pub const LINE_HEIGHT: f32 = 1.2;

impl Geometry {
    /// Unscaled extent (width, height)
    pub fn size(&self) -> Vec2 {
        match self {
            Geometry::Rectangle { width, height, .. } => Vec2::new(*width, *height),
            Geometry::Circle { radius } => Vec2::new(radius * 2.0, radius * 2.0),
            Geometry::Line { vector, .. } => Vec2::new(vector.x.abs(), vector.y.abs()),
            Geometry::Text { content, size, .. } => {
                let (columns, rows) = text_grid(content);
                Vec2::new(
                    columns as f32 * size * GLYPH_ADVANCE,
                    rows as f32 * size * LINE_HEIGHT,
                )
            }
            Geometry::Image { width, height, .. } => Vec2::new(*width, *height),
            Geometry::Group => Vec2::ZERO,
        }
    }

    /// Interpolate between two geometries; mismatched kinds swap halfway
    pub fn lerp(&self, other: &Geometry, t: f32) -> Geometry {
        match (self, other) {
            (
                Geometry::Rectangle {
                    width: w0,
                    height: h0,
                    corner_radius: r0,
                },
                Geometry::Rectangle {
                    width: w1,
                    height: h1,
                    corner_radius: r1,
                },
            ) => Geometry::Rectangle {
                width: lerp(*w0, *w1, t),
                height: lerp(*h0, *h1, t),
                corner_radius: lerp(*r0, *r1, t),
            },
            (Geometry::Circle { radius: r0 }, Geometry::Circle { radius: r1 }) => {
                Geometry::Circle {
                    radius: lerp(*r0, *r1, t),
                }
            }
            (Geometry::Line { vector: v0, .. }, Geometry::Line { vector: v1, arrow }) => {
                Geometry::Line {
                    vector: v0.lerp(*v1, t),
                    arrow: *arrow,
                }
            }
            _ if t < 0.5 => self.clone(),
            _ => other.clone(),
        }
    }
}

/// Longest line in graphemes and number of lines
pub fn text_grid(content: &str) -> (usize, usize) {
    use unicode_segmentation::UnicodeSegmentation;

    let mut columns = 0;
    let mut rows = 0;
    for line in content.split('\n') {
        rows += 1;
        columns = columns.max(line.graphemes(true).count());
    }
    (columns, rows.max(1))
}

/// Visual style of an object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Style {
    #[serde(default)]
    pub position: Vec2,
    #[serde(default = "default_factor")]
    pub scale: f32,
    #[serde(default = "default_color")]
    pub color: Color,
    #[serde(default = "default_factor")]
    pub opacity: f32,
    #[serde(default)]
    pub fill_opacity: f32,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    /// Horizontal fill gradient; overrides the flat fill when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gradient: Vec<Color>,
}

fn default_color() -> Color {
    Color::rgb(255, 255, 255)
}

fn default_stroke_width() -> f32 {
    4.0
}

impl Default for Style {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
            color: default_color(),
            opacity: 1.0,
            fill_opacity: 0.0,
            stroke_width: default_stroke_width(),
            gradient: Vec::new(),
        }
    }
}

/// Partial attribute change applied by an `animate` effect
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AttrPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_to: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<Vec2>,
    /// Scale factor about the target's centre
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
}

impl AttrPatch {
    pub fn move_to(mut self, point: Vec2) -> Self {
        self.move_to = Some(point);
        self
    }

    pub fn shift(mut self, delta: Vec2) -> Self {
        self.shift = Some(delta);
        self
    }

    pub fn scale(mut self, factor: f32) -> Self {
        self.scale = Some(factor);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn fill_opacity(mut self, opacity: f32) -> Self {
        self.fill_opacity = Some(opacity);
        self
    }

    pub fn stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == AttrPatch::default()
    }
}

/// 2D point or vector in world units (y grows upward)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const UP: Vec2 = Vec2 { x: 0.0, y: 1.0 };
    pub const DOWN: Vec2 = Vec2 { x: 0.0, y: -1.0 };
    pub const LEFT: Vec2 = Vec2 { x: -1.0, y: 0.0 };
    pub const RIGHT: Vec2 = Vec2 { x: 1.0, y: 0.0 };
    pub const UL: Vec2 = Vec2 { x: -1.0, y: 1.0 };
    pub const UR: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        Vec2::new(lerp(self.x, other.x, t), lerp(self.y, other.y, t))
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Color representation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "default_alpha")]
    pub a: u8,
}

fn default_alpha() -> u8 {
    255
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb`
    pub fn hex(code: &str) -> Option<Self> {
        let code = code.strip_prefix('#').unwrap_or(code);
        if code.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&code[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn lerp(self, other: Color, t: f32) -> Color {
        let mix = |a: u8, b: u8| lerp(a as f32, b as f32, t).round().clamp(0.0, 255.0) as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// RGBA bytes with the alpha channel multiplied by `opacity`
    pub fn with_opacity(self, opacity: f32) -> [u8; 4] {
        let alpha = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        [self.r, self.g, self.b, alpha]
    }
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
