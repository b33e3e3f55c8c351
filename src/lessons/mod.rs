//! Script authoring DSL and the built-in lessons.
//!
//! Lessons are ordinary [`VideoScript`]s assembled in code. The helpers here
//! keep the authoring close to how the video reads: declare a shape, lay it
//! out, then `play` an animation on it.

pub mod palette;
mod variables;

use crate::layout::{self, Bounds};
use crate::rate::RateFunc;
use crate::script::{
    text_grid, AnimationSpec, AttrPatch, AudioCue, Color, Effect, Geometry, Metadata, ObjectSpec,
    Resolution, Segment, Step, Vec2, VideoScript, GLYPH_ADVANCE,
};
use clap::ValueEnum;

/// Width of the visible frame in world units
pub const FRAME_WIDTH: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Lesson {
    /// Variables, the stack and the heap across C, Java, Python and JavaScript
    Variables,
}

impl Lesson {
    pub fn script(self) -> VideoScript {
        match self {
            Lesson::Variables => variables::script(),
        }
    }
}

/// Visible frame of a 16:9 lesson
pub fn frame() -> Bounds {
    layout::frame_bounds(FRAME_WIDTH, 16.0 / 9.0)
}

pub struct ScriptBuilder {
    metadata: Metadata,
    cues: Vec<AudioCue>,
    stage: Vec<Step>,
    segments: Vec<Segment>,
}

impl ScriptBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            metadata: Metadata {
                title: title.into(),
                resolution: Resolution::Named("1920x1080".into()),
                fps: 30,
                duration: None,
                description: None,
                frame_width: FRAME_WIDTH,
            },
            cues: Vec::new(),
            stage: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn resolution(mut self, resolution: &str) -> Self {
        self.metadata.resolution = Resolution::Named(resolution.into());
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.metadata.fps = fps;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    /// Schedule a narration clip at an absolute offset in seconds
    pub fn cue(mut self, id: impl Into<String>, source: impl Into<String>, offset: f32) -> Self {
        self.cues.push(AudioCue {
            id: id.into(),
            source: source.into().into(),
            offset,
            volume: 1.0,
        });
        self
    }

    /// Steps run before the first segment; their objects may stay on stage
    pub fn stage(mut self, prelude: SegmentBuilder) -> Self {
        self.stage.extend(prelude.steps);
        self
    }

    pub fn segment(mut self, segment: SegmentBuilder) -> Self {
        self.segments.push(segment.build());
        self
    }

    pub fn build(self) -> VideoScript {
        VideoScript {
            metadata: self.metadata,
            cues: self.cues,
            stage: self.stage,
            segments: self.segments,
        }
    }
}

pub struct SegmentBuilder {
    id: String,
    title: Option<String>,
    steps: Vec<Step>,
}

impl SegmentBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            steps: Vec::new(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn add(&mut self, objects: impl IntoIterator<Item = ObjectSpec>) -> &mut Self {
        self.steps.push(Step::Add {
            objects: objects.into_iter().collect(),
        });
        self
    }

    pub fn remove(&mut self, targets: &[&str]) -> &mut Self {
        self.steps.push(Step::Remove {
            targets: targets.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn group(&mut self, id: &str, members: &[&str]) -> &mut Self {
        self.steps.push(Step::Group {
            id: id.into(),
            members: members.iter().map(|m| m.to_string()).collect(),
        });
        self
    }

    pub fn then(&mut self, step: impl Into<Step>) -> &mut Self {
        self.steps.push(step.into());
        self
    }

    /// Play `effect` on every child of `groups` in one lagged step, then
    /// bundle each group's children back under the group's id
    pub fn stagger_in(
        &mut self,
        groups: &[&ObjectSpec],
        effect: impl Fn(ObjectSpec) -> AnimationSpec,
        lag_ratio: f32,
        run_time: f32,
    ) -> &mut Self {
        let animations = groups
            .iter()
            .flat_map(|g| g.children.iter().cloned())
            .map(&effect);
        self.then(play(animations).lag(lag_ratio).run_time(run_time));
        for group in groups {
            let members: Vec<&str> = group.children.iter().map(|c| c.id.as_str()).collect();
            self.group(&group.id, &members);
        }
        self
    }

    pub fn wait(&mut self, seconds: f32) -> &mut Self {
        self.steps.push(Step::Wait { seconds });
        self
    }

    pub fn build(self) -> Segment {
        Segment {
            id: self.id,
            title: self.title,
            steps: self.steps,
        }
    }
}

/// A play step under construction
#[derive(Debug, Clone)]
pub struct Play {
    animations: Vec<AnimationSpec>,
    run_time: Option<f32>,
    lag_ratio: f32,
    rate_func: Option<RateFunc>,
}

pub fn play(animations: impl IntoIterator<Item = AnimationSpec>) -> Play {
    Play {
        animations: animations.into_iter().collect(),
        run_time: None,
        lag_ratio: 0.0,
        rate_func: None,
    }
}

impl Play {
    pub fn run_time(mut self, seconds: f32) -> Self {
        self.run_time = Some(seconds);
        self
    }

    pub fn lag(mut self, lag_ratio: f32) -> Self {
        self.lag_ratio = lag_ratio;
        self
    }

    pub fn rate(mut self, rate: RateFunc) -> Self {
        self.rate_func = Some(rate);
        self
    }
}

impl From<Play> for Step {
    fn from(play: Play) -> Self {
        Step::Play {
            animations: play.animations,
            run_time: play.run_time,
            lag_ratio: play.lag_ratio,
            rate_func: play.rate_func,
        }
    }
}

// Shapes

pub fn rect(id: &str, width: f32, height: f32) -> ObjectSpec {
    rounded_rect(id, width, height, 0.0)
}

pub fn rounded_rect(id: &str, width: f32, height: f32, corner_radius: f32) -> ObjectSpec {
    ObjectSpec::new(
        id,
        Geometry::Rectangle {
            width,
            height,
            corner_radius,
        },
    )
}

pub fn square(id: &str, side: f32) -> ObjectSpec {
    rect(id, side, side)
}

pub fn circle(id: &str, radius: f32) -> ObjectSpec {
    ObjectSpec::new(id, Geometry::Circle { radius })
}

/// Segment from `from` to `to`
pub fn line(id: &str, from: Vec2, to: Vec2) -> ObjectSpec {
    ObjectSpec::new(
        id,
        Geometry::Line {
            vector: to - from,
            arrow: false,
        },
    )
    .at((from + to) * 0.5)
}

/// Arrow from `from` to `to`, pulled in by `buff` at both ends
pub fn arrow(id: &str, from: Vec2, to: Vec2, buff: f32) -> ObjectSpec {
    let delta = to - from;
    let length = delta.length();
    let inset = if length > 2.0 * buff {
        delta * (buff / length)
    } else {
        Vec2::ZERO
    };
    let (from, to) = (from + inset, to - inset);
    ObjectSpec::new(
        id,
        Geometry::Line {
            vector: to - from,
            arrow: true,
        },
    )
    .at((from + to) * 0.5)
}

pub fn text(id: &str, content: &str, size: f32) -> ObjectSpec {
    styled_text(id, content, size, None, false)
}

pub fn bold_text(id: &str, content: &str, size: f32, font: &str) -> ObjectSpec {
    styled_text(id, content, size, Some(font), true)
}

/// Monospaced source line
pub fn code(id: &str, content: &str, size: f32) -> ObjectSpec {
    styled_text(id, content, size, Some("Monospace"), false)
}

pub fn styled_text(id: &str, content: &str, size: f32, font: Option<&str>, bold: bool) -> ObjectSpec {
    ObjectSpec::new(
        id,
        Geometry::Text {
            content: content.into(),
            size,
            font: font.map(str::to_string),
            bold,
        },
    )
}

pub fn image(id: &str, source: &str, width: f32, height: f32) -> ObjectSpec {
    ObjectSpec::new(
        id,
        Geometry::Image {
            source: source.into(),
            width,
            height,
        },
    )
}

/// Full-frame backdrop with a horizontal gradient fill
pub fn backdrop(id: &str, colors: &[Color], opacity: f32) -> ObjectSpec {
    rect(id, FRAME_WIDTH, frame().height())
        .stroke(0.0)
        .filled(opacity)
        .gradient(colors)
}

/// `count` copies of `cell` laid out in a grid centred on the origin.
///
/// Children are named `{id}-{index}`.
pub fn grid(id: &str, cell: &ObjectSpec, count: usize, rows: usize, cols: usize, buff: f32) -> ObjectSpec {
    let mut cells: Vec<ObjectSpec> = (0..count)
        .map(|i| {
            let mut c = cell.clone();
            c.id = format!("{id}-{i}");
            c
        })
        .collect();
    layout::arrange_in_grid(&mut cells, rows, cols, buff);
    ObjectSpec::group(id, cells)
}

/// Lines stacked top to bottom and flush left, grouped under `id`
pub fn column(id: &str, mut lines: Vec<ObjectSpec>, buff: f32) -> ObjectSpec {
    layout::arrange_down(&mut lines, buff, true);
    ObjectSpec::group(id, lines)
}

const TAG_TEXT_SIZE: f32 = 0.22;

/// Filled rounded box with a centred label; children are `{id}-box` and `{id}-label`.
///
/// Labels too long for the box are shrunk to fit its width.
pub fn tag(id: &str, label: &str, width: f32, height: f32, fill: Color) -> ObjectSpec {
    let body = rounded_rect(&format!("{id}-box"), width, height, 0.15)
        .colored(fill)
        .filled(0.85);
    let (columns, _) = text_grid(label);
    let fit = 0.9 * width / (columns.max(1) as f32 * GLYPH_ADVANCE);
    let label = styled_text(&format!("{id}-label"), label, TAG_TEXT_SIZE.min(fit), Some("Futura"), false)
        .colored(palette::BLACK);
    ObjectSpec::group(id, vec![body, label])
}

/// Centre of the `index`th child of a group
pub fn child_center(group: &ObjectSpec, index: usize) -> Vec2 {
    group
        .children
        .get(index)
        .map(|c| layout::bounds_of(c).center())
        .unwrap_or_else(|| layout::bounds_of(group).center())
}

pub fn next_to(mut spec: ObjectSpec, anchor: &ObjectSpec, dir: Vec2, buff: f32) -> ObjectSpec {
    layout::next_to(&mut spec, layout::bounds_of(anchor), dir, buff);
    spec
}

pub fn to_edge(mut spec: ObjectSpec, dir: Vec2, buff: f32) -> ObjectSpec {
    layout::to_edge(&mut spec, frame(), dir, buff);
    spec
}

pub fn shifted(mut spec: ObjectSpec, delta: Vec2) -> ObjectSpec {
    layout::shift(&mut spec, delta);
    spec
}

pub fn edge(spec: &ObjectSpec, dir: Vec2) -> Vec2 {
    layout::bounds_of(spec).edge(dir)
}

// Animations

pub fn create(object: ObjectSpec) -> AnimationSpec {
    Effect::Create { object }.into()
}

pub fn draw_border_then_fill(object: ObjectSpec) -> AnimationSpec {
    Effect::DrawBorderThenFill { object }.into()
}

pub fn write(object: ObjectSpec) -> AnimationSpec {
    Effect::Write { object }.into()
}

pub fn type_with_cursor(object: ObjectSpec) -> AnimationSpec {
    Effect::TypeWithCursor { object }.into()
}

pub fn fade_in(object: ObjectSpec) -> AnimationSpec {
    fade_in_from(object, Vec2::ZERO, 1.0)
}

/// Fade in while travelling along `shift` and growing from `scale`
pub fn fade_in_from(object: ObjectSpec, shift: Vec2, scale: f32) -> AnimationSpec {
    Effect::FadeIn { object, shift, scale }.into()
}

pub fn grow_from_center(object: ObjectSpec) -> AnimationSpec {
    Effect::GrowFromCenter { object }.into()
}

pub fn fade_out(target: &str) -> AnimationSpec {
    fade_out_to(target, Vec2::ZERO, 1.0)
}

pub fn fade_out_to(target: &str, shift: Vec2, scale: f32) -> AnimationSpec {
    Effect::FadeOut {
        target: target.into(),
        shift,
        scale,
    }
    .into()
}

/// One fade-out per target, played together
pub fn fade_out_all(targets: &[&str]) -> Vec<AnimationSpec> {
    targets.iter().map(|t| fade_out(t)).collect()
}

pub fn animate(target: &str, patch: AttrPatch) -> AnimationSpec {
    Effect::Animate {
        target: target.into(),
        patch,
    }
    .into()
}

/// Morph `target` into the shape and style of `into` (its id is ignored)
pub fn transform(target: &str, into: &ObjectSpec) -> AnimationSpec {
    Effect::Transform {
        target: target.into(),
        into: into.shape.clone(),
    }
    .into()
}

pub fn replacement_transform(source: &str, object: ObjectSpec) -> AnimationSpec {
    Effect::ReplacementTransform {
        source: source.into(),
        object,
    }
    .into()
}

pub fn transform_from_copy(source: &str, object: ObjectSpec) -> AnimationSpec {
    Effect::TransformFromCopy {
        source: source.into(),
        object,
    }
    .into()
}

pub fn indicate(target: &str, color: Color) -> AnimationSpec {
    Effect::Indicate {
        target: target.into(),
        color: Some(color),
        scale_factor: 1.2,
    }
    .into()
}

pub fn flash(target: &str, color: Color, radius: f32) -> AnimationSpec {
    Effect::Flash {
        target: target.into(),
        color,
        radius,
    }
    .into()
}

/// Nested animations started `lag_ratio` of a duration apart
pub fn lagged(animations: impl IntoIterator<Item = AnimationSpec>, lag_ratio: f32) -> AnimationSpec {
    Effect::Group {
        animations: animations.into_iter().collect(),
        lag_ratio,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::director::Director;

    #[test]
    fn test_builders_produce_directable_script() {
        let mut intro = SegmentBuilder::new("intro").titled("Intro");
        intro
            .then(play([write(text("title", "Variable", 0.75))]).run_time(2.0))
            .wait(1.0)
            .then(play([fade_out("title")]));
        let script = ScriptBuilder::new("Demo")
            .fps(10)
            .cue("intro", "voices/intro.mp3", 0.0)
            .segment(intro)
            .build();

        assert_eq!(script.metadata.frame_width, FRAME_WIDTH);
        assert_eq!(script.segments[0].title.as_deref(), Some("Intro"));
        let timeline = Director::direct(&script).unwrap();
        assert!((timeline.duration() - 4.0).abs() < 1e-9);
        assert_eq!(timeline.total_frames(), 40);
    }

    #[test]
    fn test_play_builder_sets_timing() {
        let step: Step = play([fade_out("a"), fade_out("b")])
            .run_time(2.5)
            .lag(0.2)
            .rate(RateFunc::Linear)
            .into();
        match step {
            Step::Play {
                animations,
                run_time,
                lag_ratio,
                rate_func,
            } => {
                assert_eq!(animations.len(), 2);
                assert_eq!(run_time, Some(2.5));
                assert_eq!(lag_ratio, 0.2);
                assert_eq!(rate_func, Some(RateFunc::Linear));
            }
            _ => panic!("Expected play step"),
        }
    }

    #[test]
    fn test_grid_names_and_places_cells() {
        let cells = grid("heap", &square("cell", 0.5), 6, 2, 3, 0.1);
        assert_eq!(cells.children.len(), 6);
        assert_eq!(cells.children[5].id, "heap-5");
        assert!((child_center(&cells, 0).x + 0.6).abs() < 1e-5);
        assert_eq!(cells.style().position, Vec2::ZERO);
    }

    #[test]
    fn test_arrow_is_inset_by_buff() {
        let a = arrow("ref", Vec2::new(0.0, 2.0), Vec2::new(0.0, -2.0), 0.5);
        assert_eq!(a.style().position, Vec2::ZERO);
        match a.shape.geometry {
            Geometry::Line { vector, arrow } => {
                assert!(arrow);
                assert!((vector.y + 3.0).abs() < 1e-5);
            }
            _ => panic!("Expected line"),
        }
    }

    #[test]
    fn test_line_spans_endpoints() {
        let l = line("link", Vec2::new(-2.0, 0.0), Vec2::new(2.0, 1.0));
        assert_eq!(edge(&l, Vec2::LEFT).x, -2.0);
        assert_eq!(l.style().position, Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_tag_groups_box_and_label() {
        let t = tag("x", "x:5", 0.8, 0.6, palette::YELLOW_D).at(Vec2::new(3.0, 2.0));
        assert_eq!(t.children[0].id, "x-box");
        assert_eq!(t.children[1].id, "x-label");
        assert_eq!(t.children[1].style().position, Vec2::new(3.0, 2.0));

        let long = tag("c", "c:30 (const)", 1.0, 0.6, palette::PURPLE_B);
        assert!(layout::bounds_of(&long.children[1]).width() <= 0.9 + 1e-5);
    }

    #[test]
    fn test_stagger_in_regroups_children() {
        let lines = column("code", vec![code("code-0", "int x = 5;", 0.35), code("code-1", "free(p);", 0.35)], 0.25);
        let mut seg = SegmentBuilder::new("c");
        seg.stagger_in(&[&lines], |l| fade_in_from(l, Vec2::RIGHT, 1.0), 0.2, 3.0)
            .then(play([fade_out("code")]));
        let segment = seg.build();
        assert_eq!(segment.steps.len(), 3);
        match &segment.steps[1] {
            Step::Group { id, members } => {
                assert_eq!(id, "code");
                assert_eq!(members, &vec!["code-0".to_string(), "code-1".to_string()]);
            }
            _ => panic!("Expected group step"),
        }
    }
}
