//! End-to-end render: direct, preload, rasterize, mix, encode.

use crate::assets::{AssetLoader, AssetStats};
use crate::audio::AudioMixer;
use crate::config::AppConfig;
use crate::parser::ScriptParser;
use crate::renderer::{EncodeJob, RenderEngine, VideoEncoder};
use crate::script::VideoScript;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FINGERPRINT_FILE: &str = "render.sha256";
const AUDIO_FILE: &str = "audio.wav";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub output_dir: PathBuf,
    pub encode: bool,
    /// Re-render even when the output matches the script fingerprint
    pub force: bool,
    pub video_name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl RenderOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            output_dir: config.render.output_dir.clone(),
            encode: config.render.encode,
            force: false,
            video_name: config.render.video_name.clone(),
            sample_rate: config.audio.sample_rate,
            channels: config.audio.channels,
        }
    }
}

/// What a render run produced
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub frames: u32,
    pub duration: f64,
    /// Output already matched the script; nothing was rendered
    pub cached: bool,
    pub audio: Option<PathBuf>,
    pub video: Option<PathBuf>,
    /// Encoding was requested but ffmpeg is not installed
    pub encoder_missing: bool,
    pub assets: Option<AssetStats>,
    pub fingerprint: String,
}

pub struct RenderPipeline;

impl RenderPipeline {
    /// Content hash of everything that affects the rendered frames
    pub fn fingerprint(script: &VideoScript, options: &RenderOptions) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(env!("CARGO_PKG_VERSION"));
        hasher.update(serde_json::to_vec(script).context("Failed to serialize script")?);
        hasher.update(options.sample_rate.to_le_bytes());
        hasher.update(options.channels.to_le_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Render `script`, resolving assets against `base_dir`
    pub fn run(script: &VideoScript, base_dir: &Path, options: &RenderOptions) -> Result<RenderReport> {
        anyhow::ensure!(
            options.sample_rate > 0 && options.channels > 0,
            "Audio output needs a non-zero sample rate and channel count"
        );
        let timeline = ScriptParser::validate(script)?;
        let output_dir = &options.output_dir;
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

        let fingerprint = Self::fingerprint(script, options)?;
        let fingerprint_path = output_dir.join(FINGERPRINT_FILE);
        let mut report = RenderReport {
            frames: timeline.total_frames(),
            duration: timeline.duration(),
            cached: false,
            audio: None,
            video: None,
            encoder_missing: false,
            assets: None,
            fingerprint: fingerprint.clone(),
        };

        if !options.force && Self::is_current(output_dir, &fingerprint_path, &fingerprint) {
            info!(fingerprint = %fingerprint, "output is up to date, skipping render");
            report.cached = true;
            return Ok(report);
        }

        let mut loader = AssetLoader::new(base_dir);
        loader.preload(script)?;
        report.assets = Some(loader.stats());

        let fps = timeline.fps();
        let duration = timeline.duration();
        let engine = RenderEngine::new(script, timeline, &loader);
        info!(frames = report.frames, "rendering frames");
        Self::remove_stale_frames(output_dir, report.frames)?;
        engine.render(output_dir)?;

        if !script.cues.is_empty() {
            let mut mixer = AudioMixer::new(options.sample_rate, options.channels);
            mixer.add_cues(&script.cues, loader.base_path())?;
            let mixed = mixer.mix(duration as f32);
            let audio_path = output_dir.join(AUDIO_FILE);
            mixer.export(&audio_path, &mixed)?;
            info!(cues = mixer.track_count(), "mixed narration into {}", audio_path.display());
            report.audio = Some(audio_path);
        }

        if options.encode {
            if VideoEncoder::is_available() {
                let (width, height) = engine.dimensions();
                let pattern = RenderEngine::frame_pattern(output_dir);
                let video = output_dir.join(&options.video_name);
                VideoEncoder::encode(&EncodeJob {
                    frame_pattern: &pattern,
                    output: &video,
                    fps,
                    width,
                    height,
                    frames: report.frames,
                    duration,
                    audio: report.audio.as_deref(),
                })?;
                report.video = Some(video);
            } else {
                report.encoder_missing = true;
            }
        }

        fs::write(&fingerprint_path, &fingerprint)
            .with_context(|| format!("Failed to write {}", fingerprint_path.display()))?;
        Ok(report)
    }

    /// Delete frames a longer earlier run left behind at or past `total`
    fn remove_stale_frames(output_dir: &Path, total: u32) -> Result<()> {
        let entries = fs::read_dir(output_dir)
            .with_context(|| format!("Failed to list output directory: {}", output_dir.display()))?;
        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let index = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_prefix("frame_")?.strip_suffix(".ppm")?.parse::<u32>().ok());
            if index.is_some_and(|n| n >= total) {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove stale frame: {}", path.display()))?;
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "removed stale frames");
        }
        Ok(())
    }

    fn is_current(output_dir: &Path, fingerprint_path: &Path, fingerprint: &str) -> bool {
        let last = fs::read_to_string(fingerprint_path).unwrap_or_default();
        last.trim() == fingerprint && RenderEngine::frame_path(output_dir, 0).exists()
    }
}
