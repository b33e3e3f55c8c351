use crate::director::Director;
use crate::script::{Step, VideoScript};
use crate::timeline::Timeline;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Script parser that handles JSON/TOML video scripts
pub struct ScriptParser;

impl ScriptParser {
    /// Parse a script file, picking the format from its extension
    pub fn parse(path: &Path) -> Result<VideoScript> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::parse_toml(path),
            _ => Self::parse_json(path),
        }
    }

    /// Parse a JSON script file
    pub fn parse_json(path: &Path) -> Result<VideoScript> {
        let content = read(path)?;
        let script: VideoScript = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON script: {}", path.display()))?;

        Self::validate_script(&script)?;
        debug!(path = %path.display(), "parsed script");
        Ok(script)
    }

    /// Parse a TOML script file
    pub fn parse_toml(path: &Path) -> Result<VideoScript> {
        let content = read(path)?;
        let script: VideoScript = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML script: {}", path.display()))?;

        Self::validate_script(&script)?;
        debug!(path = %path.display(), "parsed script");
        Ok(script)
    }

    /// Structural checks that need no scene replay
    fn validate_script(script: &VideoScript) -> Result<()> {
        if script.metadata.title.is_empty() {
            anyhow::bail!("Script title cannot be empty");
        }

        if script.metadata.fps == 0 {
            anyhow::bail!("FPS must be greater than 0");
        }

        if let Some(duration) = script.metadata.duration {
            if !duration.is_finite() || duration <= 0.0 {
                anyhow::bail!("Duration must be positive");
            }
        }

        if !script.metadata.frame_width.is_finite() || script.metadata.frame_width <= 0.0 {
            anyhow::bail!("Frame width must be positive");
        }

        let (width, height) = script.metadata.resolution.dimensions();
        if width == 0 || height == 0 {
            anyhow::bail!("Resolution must be non-zero");
        }

        if script.segments.is_empty() {
            anyhow::bail!("Script must contain at least one segment");
        }

        for (idx, segment) in script.segments.iter().enumerate() {
            if segment.id.is_empty() {
                anyhow::bail!("Segment {} has empty ID", idx);
            }

            if segment.steps.is_empty() {
                warn!(segment = %segment.id, "segment has no steps");
            }
        }

        Ok(())
    }

    /// Fully validate a script by directing it
    pub fn validate(script: &VideoScript) -> Result<Timeline> {
        Self::validate_script(script)?;
        let timeline = Director::direct(script)
            .with_context(|| format!("Failed to direct script '{}'", script.metadata.title))?;
        Ok(timeline)
    }

    /// Get a summary of the script structure
    pub fn summarize(script: &VideoScript) -> String {
        let (width, height) = script.metadata.resolution.dimensions();
        let plays = script
            .steps()
            .filter(|s| matches!(s, Step::Play { .. }))
            .count();

        let mut summary = String::new();
        summary.push_str(&format!("Title: {}\n", script.metadata.title));
        summary.push_str(&format!("Resolution: {}x{}\n", width, height));
        summary.push_str(&format!("FPS: {}\n", script.metadata.fps));
        if let Some(duration) = script.metadata.duration {
            summary.push_str(&format!("Duration: {:.2}s\n", duration));
        }
        summary.push_str(&format!("Stage steps: {}\n", script.stage.len()));
        summary.push_str(&format!("Segments: {}\n", script.segments.len()));

        for (idx, segment) in script.segments.iter().enumerate() {
            summary.push_str(&format!(
                "  Segment {}: '{}' ({} steps)\n",
                idx + 1,
                segment.id,
                segment.steps.len()
            ));
        }

        summary.push_str(&format!("Play steps: {}\n", plays));
        if !script.cues.is_empty() {
            summary.push_str(&format!("Audio cues: {}\n", script.cues.len()));
        }

        summary
    }

    /// Segment and cue tables of a directed timeline
    pub fn describe(timeline: &Timeline) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Timeline: {:.2}s, {} frames @ {} fps, {} tracks, {} clips\n",
            timeline.duration(),
            timeline.total_frames(),
            timeline.fps(),
            timeline.tracks().len(),
            timeline.clip_count()
        ));

        out.push_str("\nSegments:\n");
        for span in timeline.segments() {
            out.push_str(&format!(
                "  {:<14} {:>8.2}s → {:>8.2}s  introduced {:>3}, cleaned up {:>3}\n",
                span.id,
                span.start,
                span.end,
                span.introduced.len(),
                span.cleanup.len()
            ));
        }

        if !timeline.cues().is_empty() {
            out.push_str("\nCues:\n");
            for cue in timeline.cues() {
                out.push_str(&format!(
                    "  {:<14} {:>8.2}s  {}\n",
                    cue.id,
                    cue.offset,
                    cue.source.display()
                ));
            }
        }

        out
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"
    {
        "metadata": {
            "title": "Test Video",
            "resolution": "1920x1080",
            "fps": 60
        },
        "cues": [{"id": "intro", "source": "voice-01.mp3", "offset": 0}],
        "segments": [
            {
                "id": "intro",
                "steps": [
                    {"op": "play", "animations": [
                        {"type": "write", "object": {"id": "title", "shape": "text", "content": "Variable"}}
                    ]},
                    {"op": "wait", "seconds": 1.5},
                    {"op": "play", "animations": [{"type": "fade_out", "target": "title"}]}
                ]
            }
        ]
    }
    "#;

    fn temp_file(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_valid_json() {
        let file = temp_file(VALID, ".json");
        let script = ScriptParser::parse(file.path()).unwrap();
        let timeline = ScriptParser::validate(&script).unwrap();
        assert_eq!(timeline.duration(), 3.5);
    }

    #[test]
    fn test_parse_invalid_json() {
        let json = r#"
        {
            "metadata": {
                "title": "",
                "resolution": "1920x1080",
                "fps": 0
            },
            "segments": []
        }
        "#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let result = ScriptParser::parse_json(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[metadata]
title = "Toml Video"
resolution = "1280x720"
fps = 24

[[segments]]
id = "only"

[[segments.steps]]
op = "add"

[[segments.steps.objects]]
id = "box"
shape = "rectangle"
width = 2.0
height = 1.0

[[segments.steps]]
op = "wait"
seconds = 1.0

[[segments.steps]]
op = "remove"
targets = ["box"]
"#;
        let file = temp_file(toml, ".toml");
        let script = ScriptParser::parse(file.path()).unwrap();
        assert_eq!(script.metadata.fps, 24);
        let timeline = ScriptParser::validate(&script).unwrap();
        assert_eq!(timeline.total_frames(), 24);
    }

    #[test]
    fn test_toml_infinite_duration_rejected() {
        let toml = r#"
[metadata]
title = "Endless"
resolution = "320x180"
fps = 10
duration = inf

[[segments]]
id = "only"

[[segments.steps]]
op = "wait"
seconds = 1.0
"#;
        let file = temp_file(toml, ".toml");
        let script = ScriptParser::parse(file.path()).unwrap();
        assert_eq!(script.metadata.duration, Some(f32::INFINITY));
        let err = ScriptParser::validate(&script).unwrap_err();
        assert!(err.to_string().contains("Duration must be positive"));
    }

    #[test]
    fn test_validate_reports_dangling_reference() {
        let json = r#"{
            "metadata": {"title": "Test", "resolution": "1920x1080", "fps": 30},
            "segments": [{"id": "s1", "steps": [
                {"op": "play", "animations": [{"type": "fade_out", "target": "ghost"}]}
            ]}]
        }"#;
        let script: VideoScript = serde_json::from_str(json).unwrap();
        let err = ScriptParser::validate(&script).unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("Failed to direct script 'Test'"));
        assert!(chain.contains("object 'ghost' is not on stage"));
    }

    #[test]
    fn test_validate_script_edge_cases() {
        let json = r#"{
            "metadata": {"title": "Test", "resolution": "1920x1080", "fps": 30, "duration": -5.0},
            "segments": [{"id": "s1", "steps": []}]
        }"#;
        let script: VideoScript = serde_json::from_str(json).unwrap();
        let result = ScriptParser::validate_script(&script);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Duration must be positive"));

        let json = r#"{
            "metadata": {"title": "Test", "resolution": "1920x1080", "fps": 30},
            "segments": [{"id": "", "steps": []}]
        }"#;
        let script: VideoScript = serde_json::from_str(json).unwrap();
        assert!(ScriptParser::validate_script(&script).is_err());
    }

    #[test]
    fn test_summarize() {
        let script: VideoScript = serde_json::from_str(VALID).unwrap();
        let summary = ScriptParser::summarize(&script);
        assert!(summary.contains("Test Video"));
        assert!(summary.contains("1920x1080"));
        assert!(summary.contains("Segment 1: 'intro' (3 steps)"));
        assert!(summary.contains("Play steps: 2"));
        assert!(summary.contains("Audio cues: 1"));
    }

    #[test]
    fn test_describe_lists_segments_and_cues() {
        let script: VideoScript = serde_json::from_str(VALID).unwrap();
        let timeline = ScriptParser::validate(&script).unwrap();
        let table = ScriptParser::describe(&timeline);
        assert!(table.contains("210 frames @ 60 fps"));
        assert!(table.contains("intro"));
        assert!(table.contains("voice-01.mp3"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = ScriptParser::parse_json(Path::new("/nonexistent/file.json"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to read script file"));
    }
}
