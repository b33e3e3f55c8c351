//! Replays a video script against a live scene and records the result as a
//! [`Timeline`].
//!
//! Steps run strictly in order. A play step schedules its animations
//! (concurrently, or staggered by a lag ratio), resolves each one against the
//! current scene, commits the final state and advances the clock by the
//! step's duration. Any dangling reference, timing error or leaked segment
//! object aborts the whole run.

use crate::error::{DirectorError, DirectorResult};
use crate::layout;
use crate::rate::RateFunc;
use crate::scene::{patch_mask, Attributes, PropertyMask, Scene};
use crate::script::{AnimationSpec, AudioCue, Effect, ObjectSpec, Segment, Step, Vec2, VideoScript};
use crate::timeline::{Clip, FlashOverlay, Lifespan, Reveal, SegmentSpan, Timeline, Track};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Run time of an animation that does not declare one
pub const DEFAULT_RUN_TIME: f64 = 1.0;

/// An animation placed relative to the start of its play step
#[derive(Debug, Clone)]
struct Scheduled<'a> {
    effect: &'a Effect,
    start: f64,
    duration: f64,
    rate: RateFunc,
}

pub struct Director {
    scene: Scene,
    cursor: f64,
    tracks: Vec<Track>,
    track_index: HashMap<String, usize>,
    flashes: Vec<FlashOverlay>,
    next_z: usize,
    introduced: Vec<String>,
}

impl Director {
    /// Direct a whole script into a timeline
    pub fn direct(script: &VideoScript) -> DirectorResult<Timeline> {
        check_cues(&script.cues)?;
        if let Some(seconds) = script.metadata.duration {
            check_run_time(seconds).map_err(|_| DirectorError::InvalidTiming {
                what: "duration",
                value: seconds,
            })?;
        }

        let mut director = Director::new();
        for (index, step) in script.stage.iter().enumerate() {
            director
                .run_step(step)
                .map_err(|e| e.at_step("stage", index))?;
        }

        let mut seen = HashSet::new();
        let mut spans = Vec::with_capacity(script.segments.len());
        for segment in &script.segments {
            if !seen.insert(segment.id.as_str()) {
                return Err(DirectorError::DuplicateSegment(segment.id.clone()));
            }
            spans.push(director.run_segment(segment)?);
        }

        let duration = director
            .cursor
            .max(script.metadata.duration.unwrap_or(0.0) as f64);
        info!(
            segments = spans.len(),
            tracks = director.tracks.len(),
            duration,
            "directed '{}'",
            script.metadata.title
        );
        Ok(director.finish(script.metadata.fps, duration, spans, script.cues.clone()))
    }

    fn new() -> Self {
        Self {
            scene: Scene::new(),
            cursor: 0.0,
            tracks: Vec::new(),
            track_index: HashMap::new(),
            flashes: Vec::new(),
            next_z: 0,
            introduced: Vec::new(),
        }
    }

    fn run_segment(&mut self, segment: &Segment) -> DirectorResult<SegmentSpan> {
        let before = self.scene.live_ids();
        let start = self.cursor;
        let log_start = self.introduced.len();
        let final_play = segment
            .steps
            .iter()
            .rposition(|s| matches!(s, Step::Play { .. }));

        let mut live_before_cleanup = Vec::new();
        let mut cleanup = Vec::new();
        for (index, step) in segment.steps.iter().enumerate() {
            let live = (Some(index) == final_play).then(|| self.scene.live_ids());
            self.run_step(step)
                .map_err(|e| e.at_step(&segment.id, index))?;
            if let Some(live) = live {
                let after = self.scene.live_ids();
                cleanup = live.difference(&after).cloned().collect();
                live_before_cleanup = live.difference(&before).cloned().collect();
            }
        }

        let leaked: Vec<String> = self
            .scene
            .live_ids()
            .difference(&before)
            .cloned()
            .collect();
        if !leaked.is_empty() {
            return Err(DirectorError::SegmentLeak {
                segment: segment.id.clone(),
                objects: leaked,
            });
        }

        debug!(
            segment = %segment.id,
            start,
            end = self.cursor,
            "segment directed"
        );
        Ok(SegmentSpan {
            id: segment.id.clone(),
            title: segment.title.clone(),
            start,
            end: self.cursor,
            introduced: self.introduced[log_start..].to_vec(),
            live_before_cleanup,
            cleanup,
        })
    }

    fn run_step(&mut self, step: &Step) -> DirectorResult<()> {
        match step {
            Step::Add { objects } => {
                for spec in objects {
                    self.add_instantly(spec)?;
                }
            }
            Step::Remove { targets } => {
                for target in targets {
                    self.retire(target, self.cursor)?;
                }
            }
            Step::Group { id, members } => {
                self.scene.insert_group(id, members)?;
                let attrs = self.scene.attrs(id)?.clone();
                self.open_track(id, true, self.cursor, attrs);
            }
            Step::Wait { seconds } => {
                if !seconds.is_finite() || *seconds < 0.0 {
                    return Err(DirectorError::InvalidTiming {
                        what: "wait",
                        value: *seconds,
                    });
                }
                self.cursor += *seconds as f64;
            }
            Step::Play {
                animations,
                run_time,
                lag_ratio,
                rate_func,
            } => self.play(animations, *run_time, *lag_ratio, rate_func.unwrap_or_default())?,
        }
        Ok(())
    }

    fn play(
        &mut self,
        animations: &[AnimationSpec],
        run_time: Option<f32>,
        lag_ratio: f32,
        rate: RateFunc,
    ) -> DirectorResult<()> {
        if let Some(seconds) = run_time {
            check_run_time(seconds)?;
        }
        let (mut scheduled, natural) = schedule(animations, lag_ratio, rate)?;
        let total = match run_time {
            Some(seconds) => {
                let k = seconds as f64 / natural;
                for item in &mut scheduled {
                    item.start *= k;
                    item.duration *= k;
                }
                seconds as f64
            }
            None => natural,
        };

        let base = self.cursor;
        for item in &scheduled {
            debug!(
                effect = item.effect.name(),
                start = base + item.start,
                duration = item.duration,
                "animation"
            );
            self.apply(item.effect, base + item.start, item.duration, item.rate)?;
        }
        self.cursor = base + total;
        Ok(())
    }

    fn apply(&mut self, effect: &Effect, start: f64, duration: f64, rate: RateFunc) -> DirectorResult<()> {
        let end = start + duration;
        match effect {
            Effect::Create { object } => {
                self.introduce(object, start, end, rate, Some(Reveal::Create), PropertyMask::NONE, |a, _| a.clone())
            }
            Effect::DrawBorderThenFill { object } => self.introduce(
                object,
                start,
                end,
                rate,
                Some(Reveal::DrawThenFill),
                PropertyMask::NONE,
                |a, _| a.clone(),
            ),
            Effect::Write { object } => {
                self.introduce(object, start, end, rate, Some(Reveal::Write), PropertyMask::NONE, |a, _| a.clone())
            }
            Effect::TypeWithCursor { object } => {
                self.introduce(object, start, end, rate, Some(Reveal::Type), PropertyMask::NONE, |a, _| a.clone())
            }
            Effect::FadeIn { object, shift, scale } => self.introduce(
                object,
                start,
                end,
                rate,
                None,
                PropertyMask::POSITION | PropertyMask::SCALE | PropertyMask::OPACITY,
                |a, pivot| {
                    let mut from = a.scaled_about(pivot, *scale);
                    from.position = from.position - *shift;
                    from.opacity = 0.0;
                    from
                },
            ),
            Effect::GrowFromCenter { object } => self.introduce(
                object,
                start,
                end,
                rate,
                None,
                PropertyMask::POSITION | PropertyMask::SCALE,
                |a, pivot| a.scaled_about(pivot, 0.0),
            ),
            Effect::FadeOut { target, shift, scale } => {
                let pivot = self.scene.center(target)?;
                for leaf in self.scene.leaves(target)? {
                    let from = self.scene.attrs(&leaf)?.clone();
                    let mut to = from.scaled_about(pivot, *scale);
                    to.position += *shift;
                    to.opacity = 0.0;
                    self.push_clip(
                        &leaf,
                        clip(start, end, from, to, PropertyMask::ALL, rate, effect.name()),
                    );
                }
                self.retire(target, end)
            }
            Effect::Animate { target, patch } => {
                let pivot = self.scene.center(target)?;
                let mask = patch_mask(patch);
                for leaf in self.scene.leaves(target)? {
                    let from = self.scene.attrs(&leaf)?.clone();
                    let to = from.patched(patch, pivot);
                    self.scene.set_attrs(&leaf, settle(&from, &to, rate))?;
                    self.push_clip(&leaf, clip(start, end, from, to, mask, rate, effect.name()));
                }
                Ok(())
            }
            Effect::Transform { target, into } => {
                if self.scene.get(target)?.is_group() {
                    return Err(DirectorError::GroupMorph(target.clone()));
                }
                let from = self.scene.attrs(target)?.clone();
                let to = Attributes::from_shape(into);
                self.scene.set_attrs(target, settle(&from, &to, rate))?;
                self.push_clip(
                    target,
                    clip(start, end, from, to, PropertyMask::ALL, rate, effect.name()),
                );
                Ok(())
            }
            Effect::ReplacementTransform { source, object } => {
                self.morph(source, object, start, end, rate, true, effect.name())
            }
            Effect::TransformFromCopy { source, object } => {
                self.morph(source, object, start, end, rate, false, effect.name())
            }
            Effect::Indicate {
                target,
                color,
                scale_factor,
            } => {
                let pivot = self.scene.center(target)?;
                for leaf in self.scene.leaves(target)? {
                    let from = self.scene.attrs(&leaf)?.clone();
                    let mut to = from.scaled_about(pivot, *scale_factor);
                    if let Some(color) = color {
                        to.color = *color;
                    }
                    self.push_clip(
                        &leaf,
                        clip(
                            start,
                            end,
                            from,
                            to,
                            PropertyMask::POSITION | PropertyMask::SCALE | PropertyMask::COLOR,
                            RateFunc::ThereAndBack,
                            effect.name(),
                        ),
                    );
                }
                Ok(())
            }
            Effect::Flash { target, color, radius } => {
                let center = self.scene.center(target)?;
                self.flashes.push(FlashOverlay {
                    center,
                    radius: *radius,
                    color: *color,
                    start,
                    end,
                    rate,
                });
                Ok(())
            }
            // Nested groups are flattened by the scheduler.
            Effect::Group { .. } => Ok(()),
        }
    }

    /// Put a declared object on stage, animating each leaf from `from_fn(final, pivot)`
    #[allow(clippy::too_many_arguments)]
    fn introduce<F>(
        &mut self,
        object: &ObjectSpec,
        start: f64,
        end: f64,
        rate: RateFunc,
        reveal: Option<Reveal>,
        mask: PropertyMask,
        from_fn: F,
    ) -> DirectorResult<()>
    where
        F: Fn(&Attributes, Vec2) -> Attributes,
    {
        let pivot = layout::bounds_of(object).center();
        for id in self.scene.insert_spec(object)? {
            let attrs = self.scene.attrs(&id)?.clone();
            if self.scene.get(&id)?.is_group() {
                self.open_track(&id, true, start, attrs);
                continue;
            }
            let from = from_fn(&attrs, pivot);
            self.open_track(&id, false, start, from.clone());
            let mut c = clip(start, end, from, attrs, mask, rate, "introduce");
            c.reveal = reveal;
            self.push_clip(&id, c);
        }
        Ok(())
    }

    fn add_instantly(&mut self, object: &ObjectSpec) -> DirectorResult<()> {
        for id in self.scene.insert_spec(object)? {
            let object = self.scene.get(&id)?;
            let (is_group, attrs) = (object.is_group(), object.attrs.clone());
            self.open_track(&id, is_group, self.cursor, attrs);
        }
        Ok(())
    }

    /// Morph `source` into a newly declared object.
    ///
    /// Leaves are paired in order; surplus new leaves fade in, and when the
    /// source is replaced its surplus leaves fade out.
    #[allow(clippy::too_many_arguments)]
    fn morph(
        &mut self,
        source: &str,
        object: &ObjectSpec,
        start: f64,
        end: f64,
        rate: RateFunc,
        replace: bool,
        effect: &'static str,
    ) -> DirectorResult<()> {
        let source_leaves = self.scene.leaves(source)?;
        let source_attrs = source_leaves
            .iter()
            .map(|leaf| self.scene.attrs(leaf).cloned())
            .collect::<DirectorResult<Vec<_>>>()?;

        let mut new_leaves = Vec::new();
        for id in self.scene.insert_spec(object)? {
            let attrs = self.scene.attrs(&id)?.clone();
            if self.scene.get(&id)?.is_group() {
                self.open_track(&id, true, start, attrs);
            } else {
                new_leaves.push((id, attrs));
            }
        }

        for (i, (id, to)) in new_leaves.iter().enumerate() {
            let (from, mask) = match source_attrs.get(i) {
                Some(src) => (src.clone(), PropertyMask::ALL),
                None => {
                    let mut from = to.clone();
                    from.opacity = 0.0;
                    (from, PropertyMask::OPACITY)
                }
            };
            self.open_track(id, false, start, from.clone());
            self.push_clip(id, clip(start, end, from, to.clone(), mask, rate, effect));
        }

        if replace {
            let surplus: Vec<String> = source_leaves.iter().skip(new_leaves.len()).cloned().collect();
            for leaf in &surplus {
                let from = self.scene.attrs(leaf)?.clone();
                let mut to = from.clone();
                to.opacity = 0.0;
                self.push_clip(leaf, clip(start, end, from, to, PropertyMask::OPACITY, rate, effect));
            }
            for id in self.scene.remove(source)? {
                let exit = if surplus.contains(&id) { end } else { start };
                self.close_track(&id, exit);
            }
        }
        Ok(())
    }

    /// Take `target` off stage, closing its lifespan at `exit`
    fn retire(&mut self, target: &str, exit: f64) -> DirectorResult<()> {
        for id in self.scene.remove(target)? {
            self.close_track(&id, exit);
        }
        Ok(())
    }

    fn open_track(&mut self, id: &str, is_group: bool, enter: f64, initial: Attributes) {
        let z = self.next_z;
        self.next_z += 1;
        self.introduced.push(id.to_string());
        let lifespan = Lifespan {
            enter,
            exit: None,
            z,
            initial,
        };
        match self.track_index.get(id) {
            Some(&index) => {
                let track = &mut self.tracks[index];
                track.is_group = is_group;
                track.lifespans.push(lifespan);
            }
            None => {
                self.track_index.insert(id.to_string(), self.tracks.len());
                self.tracks.push(Track {
                    id: id.to_string(),
                    is_group,
                    lifespans: vec![lifespan],
                    clips: Vec::new(),
                });
            }
        }
    }

    fn close_track(&mut self, id: &str, exit: f64) {
        if let Some(&index) = self.track_index.get(id) {
            if let Some(life) = self.tracks[index]
                .lifespans
                .iter_mut()
                .rev()
                .find(|l| l.exit.is_none())
            {
                life.exit = Some(exit);
            }
        }
    }

    fn push_clip(&mut self, id: &str, clip: Clip) {
        if let Some(&index) = self.track_index.get(id) {
            self.tracks[index].clips.push(clip);
        }
    }

    fn finish(
        mut self,
        fps: u32,
        duration: f64,
        segments: Vec<SegmentSpan>,
        cues: Vec<AudioCue>,
    ) -> Timeline {
        for track in &mut self.tracks {
            track.clips.sort_by(|a, b| a.start.total_cmp(&b.start));
        }
        Timeline::new(fps, duration, self.tracks, self.flashes, segments, cues)
    }
}

/// State an object is left in once a clip from `from` to `to` has run out
fn settle(from: &Attributes, to: &Attributes, rate: RateFunc) -> Attributes {
    let reached = rate.apply(1.0) as f32;
    if reached >= 1.0 {
        to.clone()
    } else {
        from.interpolate(to, reached)
    }
}

fn clip(
    start: f64,
    end: f64,
    from: Attributes,
    to: Attributes,
    mask: PropertyMask,
    rate: RateFunc,
    effect: &'static str,
) -> Clip {
    Clip {
        start,
        end,
        from,
        to,
        mask,
        rate,
        reveal: None,
        effect,
    }
}

/// Place animations relative to the start of their group.
///
/// Returns the flattened leaves and the group's natural duration. Each
/// animation starts `lag_ratio × duration` after the previous one; a nested
/// group is scaled to its own run time when it declares one.
fn schedule(
    animations: &[AnimationSpec],
    lag_ratio: f32,
    rate: RateFunc,
) -> DirectorResult<(Vec<Scheduled<'_>>, f64)> {
    if animations.is_empty() {
        return Err(DirectorError::EmptyPlay);
    }
    if !lag_ratio.is_finite() || lag_ratio < 0.0 {
        return Err(DirectorError::InvalidTiming {
            what: "lag ratio",
            value: lag_ratio,
        });
    }

    let mut out = Vec::new();
    let mut offset = 0.0;
    let mut end: f64 = 0.0;
    for anim in animations {
        if let Some(seconds) = anim.run_time {
            check_run_time(seconds)?;
        }
        let rate = anim.rate_func.unwrap_or(rate);
        let (mut children, natural) = match &anim.effect {
            Effect::Group {
                animations,
                lag_ratio,
            } => schedule(animations, *lag_ratio, rate)?,
            effect => (
                vec![Scheduled {
                    effect,
                    start: 0.0,
                    duration: DEFAULT_RUN_TIME,
                    rate,
                }],
                DEFAULT_RUN_TIME,
            ),
        };

        let duration = anim.run_time.map(f64::from).unwrap_or(natural);
        let k = duration / natural;
        for child in &mut children {
            child.start = offset + child.start * k;
            child.duration *= k;
        }
        out.extend(children);
        end = end.max(offset + duration);
        offset += lag_ratio as f64 * duration;
    }
    Ok((out, end))
}

fn check_run_time(seconds: f32) -> DirectorResult<()> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(DirectorError::InvalidTiming {
            what: "run time",
            value: seconds,
        });
    }
    Ok(())
}

/// Cue offsets must be non-negative and non-decreasing in declaration order
pub fn check_cues(cues: &[AudioCue]) -> DirectorResult<()> {
    let mut previous: Option<&AudioCue> = None;
    for cue in cues {
        if !cue.offset.is_finite() || cue.offset < 0.0 {
            return Err(DirectorError::InvalidCueOffset {
                cue: cue.id.clone(),
                offset: cue.offset,
            });
        }
        if let Some(prev) = previous {
            if cue.offset < prev.offset {
                return Err(DirectorError::CueOutOfOrder {
                    cue: cue.id.clone(),
                    offset: cue.offset,
                    previous: prev.offset,
                });
            }
        }
        previous = Some(cue);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{AttrPatch, Color, Geometry, Metadata, Resolution, ShapeSpec, Style};

    fn circle(id: &str, x: f32) -> ObjectSpec {
        let mut spec = ObjectSpec::new(id, Geometry::Circle { radius: 0.5 });
        spec.style_mut().position = Vec2::new(x, 0.0);
        spec
    }

    fn text(id: &str, content: &str) -> ObjectSpec {
        ObjectSpec::new(
            id,
            Geometry::Text {
                content: content.into(),
                size: 0.5,
                font: None,
                bold: false,
            },
        )
    }

    fn play(animations: Vec<AnimationSpec>) -> Step {
        Step::Play {
            animations,
            run_time: None,
            lag_ratio: 0.0,
            rate_func: None,
        }
    }

    fn fade_in(object: ObjectSpec) -> AnimationSpec {
        Effect::FadeIn {
            object,
            shift: Vec2::ZERO,
            scale: 1.0,
        }
        .into()
    }

    fn fade_out(target: &str) -> AnimationSpec {
        Effect::FadeOut {
            target: target.into(),
            shift: Vec2::ZERO,
            scale: 1.0,
        }
        .into()
    }

    fn script(cues: Vec<AudioCue>, stage: Vec<Step>, segments: Vec<Segment>) -> VideoScript {
        VideoScript {
            metadata: Metadata {
                title: "Test".into(),
                resolution: Resolution::Named("1280x720".into()),
                fps: 30,
                duration: None,
                description: None,
                frame_width: 16.0,
            },
            cues,
            stage,
            segments,
        }
    }

    fn segment(id: &str, steps: Vec<Step>) -> Segment {
        Segment {
            id: id.into(),
            title: None,
            steps,
        }
    }

    fn cue(id: &str, offset: f32) -> AudioCue {
        AudioCue {
            id: id.into(),
            source: format!("{id}.mp3").into(),
            offset,
            volume: 1.0,
        }
    }

    #[test]
    fn test_sequential_steps_advance_clock() {
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "intro",
                vec![
                    play(vec![fade_in(circle("dot", 0.0))]),
                    Step::Wait { seconds: 2.0 },
                    play(vec![fade_out("dot")]),
                ],
            )],
        );
        let timeline = Director::direct(&s).unwrap();
        assert_eq!(timeline.duration(), 4.0);
        let span = timeline.segment("intro").unwrap();
        assert_eq!((span.start, span.end), (0.0, 4.0));
        assert_eq!(span.introduced, vec!["dot"]);
        assert_eq!(span.cleanup, vec!["dot"]);

        let dot = timeline.track("dot").unwrap();
        assert_eq!(dot.lifespans[0].enter, 0.0);
        assert_eq!(dot.lifespans[0].exit, Some(4.0));
        assert_eq!(timeline.live_at(2.0), vec!["dot"]);
        assert!(timeline.live_at(4.0).is_empty());
    }

    #[test]
    fn test_lag_ratio_staggers_starts() {
        let lagged = Step::Play {
            animations: vec![
                fade_in(circle("a", 0.0)),
                fade_in(circle("b", 1.0)),
                fade_in(circle("c", 2.0)),
            ],
            run_time: None,
            lag_ratio: 0.5,
            rate_func: None,
        };
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![lagged, play(vec![fade_out("a"), fade_out("b"), fade_out("c")])],
            )],
        );
        let timeline = Director::direct(&s).unwrap();
        let starts: Vec<f64> = ["a", "b", "c"]
            .iter()
            .map(|id| timeline.track(id).unwrap().clips[0].start)
            .collect();
        assert_eq!(starts, vec![0.0, 0.5, 1.0]);
        // 1.0 + last duration 1.0, then a 1s fade out
        assert_eq!(timeline.duration(), 3.0);
    }

    #[test]
    fn test_successive_and_concurrent_extremes() {
        let anims = vec![fade_in(circle("a", 0.0)), fade_in(circle("b", 1.0))];
        let (concurrent, total) = schedule(&anims, 0.0, RateFunc::Smooth).unwrap();
        assert_eq!(total, 1.0);
        assert!(concurrent.iter().all(|s| s.start == 0.0));

        let (successive, total) = schedule(&anims, 1.0, RateFunc::Smooth).unwrap();
        assert_eq!(total, 2.0);
        assert_eq!(successive[1].start, 1.0);
    }

    #[test]
    fn test_play_run_time_scales_group() {
        let animations = vec![
            fade_in(circle("a", 0.0)),
            fade_in(circle("b", 1.0)).run_time(1.5),
        ];
        let step = Step::Play {
            animations,
            run_time: Some(3.0),
            lag_ratio: 0.0,
            rate_func: Some(RateFunc::Linear),
        };
        let s = script(
            vec![],
            vec![],
            vec![segment("s", vec![step, play(vec![fade_out("a"), fade_out("b")])])],
        );
        let timeline = Director::direct(&s).unwrap();
        let a = &timeline.track("a").unwrap().clips[0];
        let b = &timeline.track("b").unwrap().clips[0];
        assert_eq!(a.end - a.start, 2.0);
        assert_eq!(b.end - b.start, 3.0);
        assert_eq!(a.rate, RateFunc::Linear);
        assert_eq!(timeline.duration(), 4.0);
    }

    #[test]
    fn test_nested_group_lag() {
        let inner = AnimationSpec::new(Effect::Group {
            animations: vec![fade_in(circle("a", 0.0)), fade_in(circle("b", 1.0))],
            lag_ratio: 1.0,
        });
        let (items, total) = schedule(std::slice::from_ref(&inner), 0.0, RateFunc::Smooth).unwrap();
        assert_eq!(total, 2.0);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].start, 1.0);
    }

    #[test]
    fn test_transform_unknown_object_fails() {
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![play(vec![Effect::Animate {
                    target: "ghost".into(),
                    patch: AttrPatch::default().scale(2.0),
                }
                .into()])],
            )],
        );
        let err = Director::direct(&s).unwrap_err();
        assert!(matches!(err.root(), DirectorError::UnknownObject(id) if id == "ghost"));
        assert_eq!(err.to_string(), "s step 0: object 'ghost' is not on stage");
    }

    #[test]
    fn test_fade_out_twice_fails() {
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![
                    play(vec![fade_in(circle("a", 0.0))]),
                    play(vec![fade_out("a")]),
                    play(vec![fade_out("a")]),
                ],
            )],
        );
        let err = Director::direct(&s).unwrap_err();
        assert!(matches!(err.root(), DirectorError::UnknownObject(_)));
    }

    #[test]
    fn test_segment_leak_detected() {
        let s = script(
            vec![],
            vec![],
            vec![segment("leaky", vec![play(vec![fade_in(circle("a", 0.0))])])],
        );
        match Director::direct(&s).unwrap_err() {
            DirectorError::SegmentLeak { segment, objects } => {
                assert_eq!(segment, "leaky");
                assert_eq!(objects, vec!["a"]);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_stage_objects_persist_across_segments() {
        let stage = vec![Step::Add {
            objects: vec![circle("bg", 0.0)],
        }];
        let s = script(
            vec![],
            stage,
            vec![
                segment(
                    "one",
                    vec![
                        play(vec![fade_in(circle("a", 1.0))]),
                        play(vec![fade_out("a")]),
                    ],
                ),
                segment(
                    "two",
                    vec![
                        play(vec![fade_in(circle("b", 1.0))]),
                        play(vec![fade_out("b"), fade_out("bg")]),
                    ],
                ),
            ],
        );
        let timeline = Director::direct(&s).unwrap();
        assert_eq!(timeline.live_at(0.5), vec!["bg", "a"]);
        assert_eq!(timeline.segment("two").unwrap().cleanup, vec!["b", "bg"]);
        assert_eq!(timeline.segment("two").unwrap().live_before_cleanup, vec!["b"]);
    }

    #[test]
    fn test_cue_order_checked() {
        assert!(check_cues(&[cue("a", 0.0), cue("b", 47.0), cue("c", 47.0)]).is_ok());
        assert!(matches!(
            check_cues(&[cue("a", 10.0), cue("b", 5.0)]),
            Err(DirectorError::CueOutOfOrder { cue, .. }) if cue == "b"
        ));
        assert!(matches!(
            check_cues(&[cue("a", -1.0)]),
            Err(DirectorError::InvalidCueOffset { .. })
        ));
    }

    #[test]
    fn test_replacement_transform_swaps_objects() {
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![
                    play(vec![Effect::Write {
                        object: text("title", "The most fundamental concept"),
                    }
                    .into()]),
                    play(vec![Effect::ReplacementTransform {
                        source: "title".into(),
                        object: text("title2", "Variable"),
                    }
                    .into()]),
                    play(vec![fade_out("title2")]),
                ],
            )],
        );
        let timeline = Director::direct(&s).unwrap();
        assert_eq!(timeline.track("title").unwrap().lifespans[0].exit, Some(1.0));
        let title2 = timeline.track("title2").unwrap();
        assert_eq!(title2.lifespans[0].enter, 1.0);

        // Mid-morph the new object still looks like the old one
        let early = timeline.sample(1.01);
        match &early.item("title2").unwrap().attrs.geometry {
            Geometry::Text { content, .. } => assert_eq!(content, "The most fundamental concept"),
            other => panic!("unexpected geometry {other:?}"),
        }
        assert!(early.item("title").is_none());
    }

    #[test]
    fn test_transform_from_copy_keeps_source() {
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![
                    play(vec![fade_in(text("t", "Variable"))]),
                    play(vec![Effect::TransformFromCopy {
                        source: "t".into(),
                        object: text("sub", "A name that holds some value"),
                    }
                    .into()]),
                    play(vec![fade_out("t"), fade_out("sub")]),
                ],
            )],
        );
        let timeline = Director::direct(&s).unwrap();
        assert_eq!(timeline.live_at(1.5), vec!["t", "sub"]);
    }

    #[test]
    fn test_indicate_leaves_state_unchanged() {
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![
                    play(vec![fade_in(circle("plate", 0.0))]),
                    play(vec![Effect::Indicate {
                        target: "plate".into(),
                        color: Some(Color::rgb(255, 0, 0)),
                        scale_factor: 1.2,
                    }
                    .into()]),
                    play(vec![fade_out("plate")]),
                ],
            )],
        );
        let timeline = Director::direct(&s).unwrap();
        let peak = timeline.sample(1.5);
        let plate = peak.item("plate").unwrap();
        assert!((plate.attrs.scale - 1.2).abs() < 1e-4);
        assert_eq!(plate.attrs.color, Color::rgb(255, 0, 0));

        let after = timeline.sample(2.0);
        let plate = after.item("plate").unwrap();
        assert!((plate.attrs.scale - 1.0).abs() < 1e-6);
        assert_eq!(plate.attrs.color, Color::rgb(255, 255, 255));
    }

    #[test]
    fn test_animate_group_scales_about_center() {
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![
                    Step::Add {
                        objects: vec![circle("a", -1.0), circle("b", 1.0)],
                    },
                    Step::Group {
                        id: "world".into(),
                        members: vec!["a".into(), "b".into()],
                    },
                    play(vec![Effect::Animate {
                        target: "world".into(),
                        patch: AttrPatch::default().scale(2.0),
                    }
                    .into()]),
                    play(vec![fade_out("world")]),
                ],
            )],
        );
        let timeline = Director::direct(&s).unwrap();
        let snapshot = timeline.sample(1.0);
        assert_eq!(snapshot.item("a").unwrap().attrs.position, Vec2::new(-2.0, 0.0));
        assert_eq!(snapshot.item("b").unwrap().attrs.scale, 2.0);
        assert!(timeline.live_at(2.0).is_empty());
    }

    #[test]
    fn test_there_and_back_animation_settles_at_start() {
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![
                    play(vec![fade_in(circle("glow", 0.0))]),
                    Step::Play {
                        animations: vec![Effect::Animate {
                            target: "glow".into(),
                            patch: AttrPatch::default().scale(1.1).opacity(0.6),
                        }
                        .into()],
                        run_time: Some(2.0),
                        lag_ratio: 0.0,
                        rate_func: Some(RateFunc::ThereAndBack),
                    },
                    play(vec![fade_out("glow")]),
                ],
            )],
        );
        let timeline = Director::direct(&s).unwrap();
        let peak = timeline.sample(2.0);
        assert!((peak.item("glow").unwrap().attrs.scale - 1.1).abs() < 1e-4);

        // The fade-out starts from the untouched state, not the peak
        let fading = timeline.sample(3.0);
        let glow = fading.item("glow").unwrap();
        assert!((glow.attrs.scale - 1.0).abs() < 1e-6);
        let clip = timeline.track("glow").unwrap().clips.last().unwrap();
        assert_eq!(clip.effect, "fade_out");
        assert!((clip.from.opacity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_transform_morphs_geometry() {
        let into = ShapeSpec {
            geometry: Geometry::Circle { radius: 2.5 },
            style: Style {
                color: Color::rgb(255, 255, 0),
                ..Style::default()
            },
        };
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![
                    play(vec![fade_in(circle("dot", 0.0))]),
                    play(vec![Effect::Transform {
                        target: "dot".into(),
                        into,
                    }
                    .into()]),
                    play(vec![fade_out("dot")]),
                ],
            )],
        );
        let timeline = Director::direct(&s).unwrap();
        let done = timeline.sample(2.0);
        let dot = done.item("dot").unwrap();
        assert_eq!(dot.attrs.geometry, Geometry::Circle { radius: 2.5 });
        assert_eq!(dot.attrs.color, Color::rgb(255, 255, 0));
    }

    #[test]
    fn test_transform_group_rejected() {
        let s = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![
                    play(vec![fade_in(ObjectSpec::group("g", vec![circle("a", 0.0)]))]),
                    play(vec![Effect::Transform {
                        target: "g".into(),
                        into: circle("x", 0.0).shape,
                    }
                    .into()]),
                ],
            )],
        );
        let err = Director::direct(&s).unwrap_err();
        assert!(matches!(err.root(), DirectorError::GroupMorph(_)));
    }

    #[test]
    fn test_invalid_timings_rejected() {
        let bad_wait = script(vec![], vec![], vec![segment("s", vec![Step::Wait { seconds: -1.0 }])]);
        assert!(matches!(
            Director::direct(&bad_wait).unwrap_err().root(),
            DirectorError::InvalidTiming { what: "wait", .. }
        ));

        let empty = script(vec![], vec![], vec![segment("s", vec![play(vec![])])]);
        assert!(matches!(
            Director::direct(&empty).unwrap_err().root(),
            DirectorError::EmptyPlay
        ));

        let zero_run = script(
            vec![],
            vec![],
            vec![segment(
                "s",
                vec![Step::Play {
                    animations: vec![fade_in(circle("a", 0.0))],
                    run_time: Some(0.0),
                    lag_ratio: 0.0,
                    rate_func: None,
                }],
            )],
        );
        assert!(matches!(
            Director::direct(&zero_run).unwrap_err().root(),
            DirectorError::InvalidTiming { what: "run time", .. }
        ));

        let mut endless = script(vec![], vec![], vec![segment("s", vec![])]);
        endless.metadata.duration = Some(f32::INFINITY);
        assert!(matches!(
            Director::direct(&endless).unwrap_err(),
            DirectorError::InvalidTiming { what: "duration", .. }
        ));
    }

    #[test]
    fn test_duplicate_segment_rejected() {
        let s = script(
            vec![],
            vec![],
            vec![segment("s", vec![]), segment("s", vec![])],
        );
        assert!(matches!(
            Director::direct(&s).unwrap_err(),
            DirectorError::DuplicateSegment(_)
        ));
    }

    #[test]
    fn test_metadata_duration_holds_last_frame() {
        let mut s = script(vec![cue("a", 0.0)], vec![], vec![segment("s", vec![Step::Wait { seconds: 1.0 }])]);
        s.metadata.duration = Some(5.0);
        let timeline = Director::direct(&s).unwrap();
        assert_eq!(timeline.duration(), 5.0);
        assert_eq!(timeline.total_frames(), 150);
        assert_eq!(timeline.cues().len(), 1);
    }
}
