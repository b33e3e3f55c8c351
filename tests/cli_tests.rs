use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn choreo() -> Command {
    Command::new(env!("CARGO_BIN_EXE_choreo"))
}

#[test]
fn test_cli_help() {
    choreo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Choreographed explainer videos"));
}

#[test]
fn test_cli_validate_script() {
    choreo()
        .arg("validate")
        .arg("scripts/hello.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation complete"))
        .stdout(predicate::str::contains("65 frames"));
}

#[test]
fn test_cli_validate_lesson() {
    choreo()
        .args(["validate", "--lesson", "variables"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation complete: 8 segments"));
}

#[test]
fn test_cli_requires_a_source() {
    choreo().arg("validate").assert().failure();
    choreo()
        .args(["validate", "scripts/hello.json", "--lesson", "variables"])
        .assert()
        .failure();
}

#[test]
fn test_cli_inspect_lesson_lists_cues() {
    choreo()
        .args(["inspect", "--lesson", "variables"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Segment 3: 'stack-heap'"))
        .stdout(predicate::str::contains("Cues:"))
        .stdout(predicate::str::contains("voices/voice-variables-07.mp3"));
}

#[test]
fn test_cli_lesson_export_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("variables.json");

    choreo()
        .args(["lesson", "variables", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Lesson exported to"));

    choreo()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation complete"));
}

#[test]
fn test_cli_lesson_to_stdout() {
    choreo()
        .args(["lesson", "variables"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Variables\""))
        .stdout(predicate::str::contains("voices/voice-variables-01.mp3"));
}

#[test]
fn test_cli_render_then_cache() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");

    choreo()
        .args(["render", "scripts/hello.json", "--no-encode", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("65 frames"));

    assert!(fs::metadata(output.join("frame_0.ppm")).is_ok());
    assert!(fs::metadata(output.join("frame_64.ppm")).is_ok());
    assert!(fs::metadata(output.join("render.sha256")).is_ok());
    assert!(fs::metadata(output.join("output.mp4")).is_err());

    choreo()
        .args(["render", "scripts/hello.json", "--no-encode", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn test_cli_rejects_leaking_segment() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leak.json");
    fs::write(
        &path,
        r#"{
            "metadata": {"title": "Leak", "resolution": "320x180", "fps": 10},
            "segments": [{"id": "intro", "steps": [
                {"op": "play", "animations": [
                    {"type": "fade_in", "object": {"id": "dot", "shape": "circle", "radius": 1}}
                ]}
            ]}]
        }"#,
    )
    .unwrap();

    choreo()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("leaves objects on stage: dot"));
}

#[test]
fn test_cli_missing_script() {
    choreo()
        .args(["validate", "scripts/does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read script file"));
}
