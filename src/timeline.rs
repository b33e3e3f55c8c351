use crate::rate::RateFunc;
use crate::scene::{Attributes, PropertyMask};
use crate::script::{AudioCue, Color, Vec2};

/// How an introducing animation reveals its object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    /// Outline traced progressively, fill follows along
    Create,
    /// Outline traced in the first half, fill in the second
    DrawThenFill,
    /// Text appears grapheme by grapheme
    Write,
    /// Like `Write`, with a cursor block after the last grapheme
    Type,
}

/// One interpolation of an object's attributes between two instants
#[derive(Debug, Clone)]
pub struct Clip {
    pub start: f64,
    pub end: f64,
    pub from: Attributes,
    pub to: Attributes,
    pub mask: PropertyMask,
    pub rate: RateFunc,
    pub reveal: Option<Reveal>,
    pub effect: &'static str,
}

impl Clip {
    /// Linear progress in `[0, 1]`
    pub fn progress(&self, time: f64) -> f64 {
        if self.end <= self.start {
            return if time >= self.start { 1.0 } else { 0.0 };
        }
        ((time - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    pub fn eased(&self, time: f64) -> f32 {
        self.rate.apply(self.progress(time)) as f32
    }

    pub fn value_at(&self, time: f64) -> Attributes {
        self.from.interpolate(&self.to, self.eased(time))
    }
}

/// A continuous stretch during which an object is on stage
#[derive(Debug, Clone)]
pub struct Lifespan {
    pub enter: f64,
    pub exit: Option<f64>,
    pub z: usize,
    /// Attributes at the instant the object entered
    pub initial: Attributes,
}

impl Lifespan {
    pub fn contains(&self, time: f64) -> bool {
        time >= self.enter && self.exit.map_or(true, |exit| time < exit)
    }
}

/// Everything that happens to one object id over the whole video
#[derive(Debug, Clone)]
pub struct Track {
    pub id: String,
    pub is_group: bool,
    pub lifespans: Vec<Lifespan>,
    /// Sorted by start time
    pub clips: Vec<Clip>,
}

impl Track {
    fn sample(&self, time: f64) -> Option<RenderItem> {
        let life = self.lifespans.iter().find(|l| l.contains(time))?;
        let mut attrs = life.initial.clone();
        let mut reveal = None;

        for clip in &self.clips {
            if clip.start > time {
                break;
            }
            if clip.start < life.enter || life.exit.is_some_and(|exit| clip.start >= exit) {
                continue;
            }
            if !clip.mask.is_empty() {
                attrs.overlay(&clip.value_at(time), clip.mask);
            }
            if let Some(kind) = clip.reveal {
                reveal = Some((kind, clip.eased(time)));
            }
        }

        Some(RenderItem {
            id: self.id.clone(),
            attrs,
            reveal,
            z: life.z,
        })
    }
}

/// A radial burst drawn around a point; leaves no state behind
#[derive(Debug, Clone)]
pub struct FlashOverlay {
    pub center: Vec2,
    pub radius: f32,
    pub color: Color,
    pub start: f64,
    pub end: f64,
    pub rate: RateFunc,
}

/// Where a thematic segment sits on the timeline
#[derive(Debug, Clone)]
pub struct SegmentSpan {
    pub id: String,
    pub title: Option<String>,
    pub start: f64,
    pub end: f64,
    /// Ids put on stage during the segment
    pub introduced: Vec<String>,
    /// Segment objects still on stage right before the final play step
    pub live_before_cleanup: Vec<String>,
    /// Ids taken off stage by the final play step
    pub cleanup: Vec<String>,
}

/// An object as it appears at one instant
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub id: String,
    pub attrs: Attributes,
    /// Reveal kind and eased progress of the latest introducing animation
    pub reveal: Option<(Reveal, f32)>,
    pub z: usize,
}

impl RenderItem {
    pub fn reveal_progress(&self) -> f32 {
        self.reveal.map_or(1.0, |(_, p)| p)
    }
}

#[derive(Debug, Clone)]
pub struct ActiveFlash {
    pub center: Vec2,
    pub radius: f32,
    pub color: Color,
    pub progress: f32,
}

/// The visible scene at one instant, back to front
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub time: f64,
    pub items: Vec<RenderItem>,
    pub flashes: Vec<ActiveFlash>,
}

impl Snapshot {
    pub fn item(&self, id: &str) -> Option<&RenderItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

/// Directed, immutable timeline for the whole video
#[derive(Debug, Clone)]
pub struct Timeline {
    fps: u32,
    duration: f64,
    tracks: Vec<Track>,
    flashes: Vec<FlashOverlay>,
    segments: Vec<SegmentSpan>,
    cues: Vec<AudioCue>,
}

impl Timeline {
    pub(crate) fn new(
        fps: u32,
        duration: f64,
        tracks: Vec<Track>,
        flashes: Vec<FlashOverlay>,
        segments: Vec<SegmentSpan>,
        cues: Vec<AudioCue>,
    ) -> Self {
        Self {
            fps,
            duration,
            tracks,
            flashes,
            segments,
            cues,
        }
    }

    /// Get total frame count
    pub fn total_frames(&self) -> u32 {
        (self.duration * self.fps as f64).ceil() as u32
    }

    /// Get FPS
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Convert frame number to time in seconds
    pub fn frame_to_time(&self, frame: u32) -> f64 {
        frame as f64 / self.fps as f64
    }

    pub fn segments(&self) -> &[SegmentSpan] {
        &self.segments
    }

    pub fn segment(&self, id: &str) -> Option<&SegmentSpan> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn cues(&self) -> &[AudioCue] {
        &self.cues
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|t| t.clips.len()).sum()
    }

    /// Segment playing at `time`
    pub fn segment_at_time(&self, time: f64) -> Option<&str> {
        self.segments
            .iter()
            .find(|s| time >= s.start && time < s.end)
            .map(|s| s.id.as_str())
    }

    /// Get segment at given frame number
    pub fn segment_at_frame(&self, frame: u32) -> Option<&str> {
        self.segment_at_time(self.frame_to_time(frame))
    }

    /// Ids on stage at `time`, groups included
    pub fn live_at(&self, time: f64) -> Vec<&str> {
        self.tracks
            .iter()
            .filter(|t| t.lifespans.iter().any(|l| l.contains(time)))
            .map(|t| t.id.as_str())
            .collect()
    }

    /// Visible objects and flashes at `time`
    pub fn sample(&self, time: f64) -> Snapshot {
        let mut items: Vec<RenderItem> = self
            .tracks
            .iter()
            .filter(|t| !t.is_group)
            .filter_map(|t| t.sample(time))
            .collect();
        items.sort_by_key(|i| i.z);

        let flashes = self
            .flashes
            .iter()
            .filter(|f| time >= f.start && time < f.end)
            .map(|f| ActiveFlash {
                center: f.center,
                radius: f.radius,
                color: f.color,
                progress: f.rate.apply((time - f.start) / (f.end - f.start)) as f32,
            })
            .collect();

        Snapshot {
            time,
            items,
            flashes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Geometry, ShapeSpec, Style};

    fn attrs(x: f32, opacity: f32) -> Attributes {
        let mut a = Attributes::from_shape(&ShapeSpec {
            geometry: Geometry::Circle { radius: 1.0 },
            style: Style::default(),
        });
        a.position = Vec2::new(x, 0.0);
        a.opacity = opacity;
        a
    }

    fn clip(start: f64, end: f64, from: Attributes, to: Attributes, mask: PropertyMask) -> Clip {
        Clip {
            start,
            end,
            from,
            to,
            mask,
            rate: RateFunc::Linear,
            reveal: None,
            effect: "test",
        }
    }

    fn span(id: &str, start: f64, end: f64) -> SegmentSpan {
        SegmentSpan {
            id: id.into(),
            title: None,
            start,
            end,
            introduced: vec![],
            live_before_cleanup: vec![],
            cleanup: vec![],
        }
    }

    fn create_test_timeline() -> Timeline {
        let track = Track {
            id: "dot".into(),
            is_group: false,
            lifespans: vec![Lifespan {
                enter: 1.0,
                exit: Some(6.0),
                z: 0,
                initial: attrs(0.0, 0.0),
            }],
            clips: vec![
                clip(1.0, 2.0, attrs(0.0, 0.0), attrs(0.0, 1.0), PropertyMask::OPACITY),
                clip(3.0, 5.0, attrs(0.0, 1.0), attrs(4.0, 1.0), PropertyMask::POSITION),
            ],
        };
        Timeline::new(
            30,
            10.0,
            vec![track],
            vec![],
            vec![span("scene1", 0.0, 5.0), span("scene2", 5.0, 10.0)],
            vec![],
        )
    }

    #[test]
    fn test_timeline_creation() {
        let timeline = create_test_timeline();
        assert_eq!(timeline.fps(), 30);
        assert_eq!(timeline.total_frames(), 300); // 10 seconds at 30fps
        assert_eq!(timeline.frame_to_time(45), 1.5);
        assert_eq!(timeline.clip_count(), 2);
    }

    #[test]
    fn test_get_segment_at_frame() {
        let timeline = create_test_timeline();

        // First segment: 0-150 frames (5 seconds)
        assert_eq!(timeline.segment_at_frame(0), Some("scene1"));
        assert_eq!(timeline.segment_at_frame(100), Some("scene1"));

        // Second segment: 150-300 frames
        assert_eq!(timeline.segment_at_frame(150), Some("scene2"));
        assert_eq!(timeline.segment_at_frame(299), Some("scene2"));
        assert_eq!(timeline.segment_at_frame(300), None);
    }

    #[test]
    fn test_sample_interpolates_masked_properties() {
        let timeline = create_test_timeline();

        assert!(timeline.sample(0.5).items.is_empty());

        let fading = timeline.sample(1.5);
        let dot = fading.item("dot").unwrap();
        assert!((dot.attrs.opacity - 0.5).abs() < 1e-6);
        assert_eq!(dot.attrs.position, Vec2::ZERO);

        let moving = timeline.sample(4.0);
        let dot = moving.item("dot").unwrap();
        assert_eq!(dot.attrs.opacity, 1.0);
        assert!((dot.attrs.position.x - 2.0).abs() < 1e-6);

        let settled = timeline.sample(5.5);
        assert_eq!(settled.item("dot").unwrap().attrs.position.x, 4.0);

        assert!(timeline.sample(6.0).items.is_empty());
        assert_eq!(timeline.live_at(5.9), vec!["dot"]);
    }

    #[test]
    fn test_flash_is_transient() {
        let timeline = Timeline::new(
            30,
            3.0,
            vec![],
            vec![FlashOverlay {
                center: Vec2::ZERO,
                radius: 1.0,
                color: Color::rgb(255, 255, 0),
                start: 1.0,
                end: 2.0,
                rate: RateFunc::Linear,
            }],
            vec![],
            vec![],
        );
        assert!(timeline.sample(0.5).flashes.is_empty());
        let mid = timeline.sample(1.5);
        assert!((mid.flashes[0].progress - 0.5).abs() < 1e-6);
        assert!(timeline.sample(2.0).flashes.is_empty());
    }
}
