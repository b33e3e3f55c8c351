use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

/// One ffmpeg invocation: numbered frames plus an optional narration track
#[derive(Debug, Clone)]
pub struct EncodeJob<'a> {
    /// Pattern for input frames (e.g. "output/frame_%d.ppm")
    pub frame_pattern: &'a Path,
    pub output: &'a Path,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    /// Number of frames to read from the pattern
    pub frames: u32,
    /// Video length in seconds; the audio track is padded or cut to it
    pub duration: f64,
    pub audio: Option<&'a Path>,
}

impl EncodeJob<'_> {
    /// Command-line arguments passed to ffmpeg
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-f", "image2", "-framerate"]
            .map(OsString::from)
            .to_vec();
        args.push(self.fps.to_string().into());
        args.push("-i".into());
        args.push(self.frame_pattern.into());

        if let Some(audio) = self.audio {
            args.push("-i".into());
            args.push(audio.into());
        }

        args.extend(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-s"].map(OsString::from));
        args.push(format!("{}x{}", self.width, self.height).into());
        args.push("-frames:v".into());
        args.push(self.frames.to_string().into());

        if self.audio.is_some() {
            args.extend(["-c:a", "aac", "-af", "apad", "-t"].map(OsString::from));
            args.push(format!("{:.3}", self.duration).into());
        }

        args.push(self.output.into());
        args
    }
}

/// Handles video encoding using external FFmpeg process
pub struct VideoEncoder;

impl VideoEncoder {
    /// Check if FFmpeg is available
    pub fn is_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    /// Encode a sequence of frames to a video file
    pub fn encode(job: &EncodeJob) -> Result<()> {
        if !Self::is_available() {
            anyhow::bail!("FFmpeg not found. Please install ffmpeg to enable video encoding.");
        }

        info!("encoding video to {}", job.output.display());
        let status = Command::new("ffmpeg")
            .args(job.args())
            .status()
            .context("Failed to execute ffmpeg")?;

        if !status.success() {
            anyhow::bail!("FFmpeg encoding failed with {}", status);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job<'a>(audio: Option<&'a Path>) -> EncodeJob<'a> {
        EncodeJob {
            frame_pattern: Path::new("out/frame_%d.ppm"),
            output: Path::new("out/output.mp4"),
            fps: 30,
            width: 1280,
            height: 720,
            frames: 375,
            duration: 12.5,
            audio,
        }
    }

    fn joined(args: &[OsString]) -> String {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_video_only_args() {
        let args = joined(&job(None).args());
        assert!(args.starts_with("-y -loglevel error -f image2 -framerate 30 -i out/frame_%d.ppm"));
        assert!(args.contains("-s 1280x720 -frames:v 375"));
        assert!(!args.contains("aac"));
        assert!(args.ends_with("out/output.mp4"));
    }

    #[test]
    fn test_narration_is_padded_to_video_length() {
        let args = joined(&job(Some(Path::new("out/audio.wav"))).args());
        assert!(args.contains("-i out/frame_%d.ppm -i out/audio.wav"));
        assert!(args.contains("-c:a aac -af apad -t 12.500"));
    }
}
