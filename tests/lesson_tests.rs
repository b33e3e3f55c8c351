use choreo::lessons::{circle, fade_in, fade_out_all, play, Lesson, ScriptBuilder, SegmentBuilder};
use choreo::{Director, VideoScript};

fn variables() -> VideoScript {
    Lesson::Variables.script()
}

#[test]
fn test_variables_lesson_cue_offsets() {
    let timeline = Director::direct(&variables()).unwrap();
    let offsets: Vec<f32> = timeline.cues().iter().map(|c| c.offset).collect();

    assert_eq!(offsets, vec![0.0, 47.0, 98.0, 125.0, 152.0, 182.0, 215.0]);
    assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    assert!(timeline
        .cues()
        .iter()
        .all(|c| c.source.to_string_lossy().starts_with("voices/voice-variables-")));
}

#[test]
fn test_variables_lesson_segments_clean_up() {
    let timeline = Director::direct(&variables()).unwrap();
    let ids: Vec<&str> = timeline.segments().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["intro", "memory", "stack-heap", "c", "java", "python", "javascript", "summary"]
    );

    for span in timeline.segments() {
        assert!(!span.cleanup.is_empty(), "segment '{}' has no fade-out", span.id);
        for id in &span.live_before_cleanup {
            assert!(
                span.cleanup.contains(id),
                "segment '{}' final fade-out misses '{}'",
                span.id,
                id
            );
        }
    }
}

#[test]
fn test_variables_lesson_segments_are_contiguous() {
    let timeline = Director::direct(&variables()).unwrap();
    let spans = timeline.segments();

    for pair in spans.windows(2) {
        assert!((pair[0].end - pair[1].start).abs() < 1e-9);
    }
    let last = spans.last().unwrap();
    assert!(timeline.duration() >= last.end);
    assert_eq!(timeline.live_at(timeline.duration()), vec!["bg"]);
}

#[test]
fn test_variables_lesson_survives_json() {
    let script = variables();
    let json = serde_json::to_string(&script).unwrap();
    let reparsed: VideoScript = serde_json::from_str(&json).unwrap();

    let original = Director::direct(&script).unwrap();
    let replayed = Director::direct(&reparsed).unwrap();
    assert_eq!(original.segments().len(), replayed.segments().len());
    assert_eq!(original.total_frames(), replayed.total_frames());
    assert_eq!(original.clip_count(), replayed.clip_count());
}

fn two_dots(lag: f32) -> VideoScript {
    let mut segment = SegmentBuilder::new("dots");
    segment
        .then(play([fade_in(circle("a", 0.5)), fade_in(circle("b", 0.5))]).lag(lag))
        .then(play(fade_out_all(&["a", "b"])));
    ScriptBuilder::new("Dots").fps(10).segment(segment).build()
}

#[test]
fn test_zero_lag_plays_concurrently() {
    let timeline = Director::direct(&two_dots(0.0)).unwrap();
    let a = &timeline.track("a").unwrap().clips[0];
    let b = &timeline.track("b").unwrap().clips[0];

    assert_eq!((a.start, a.end), (b.start, b.end));
    assert!((timeline.duration() - 2.0).abs() < 1e-9);
}

#[test]
fn test_full_lag_plays_successively() {
    let timeline = Director::direct(&two_dots(1.0)).unwrap();
    let a = &timeline.track("a").unwrap().clips[0];
    let b = &timeline.track("b").unwrap().clips[0];

    assert!((b.start - a.end).abs() < 1e-9);
    assert!((timeline.duration() - 3.0).abs() < 1e-9);
    // "b" is not on stage until its fade begins
    assert!(!timeline.live_at(0.5).contains(&"b"));
    assert!(timeline.live_at(1.5).contains(&"b"));
}
