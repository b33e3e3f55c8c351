use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub render: RenderConfig,
    pub audio: AudioConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    pub output_dir: PathBuf,
    /// Hand frames and narration to ffmpeg when it is installed
    pub encode: bool,
    pub video_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Filter used when RUST_LOG is unset
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig {
                output_dir: PathBuf::from("output"),
                encode: true,
                video_name: "output.mp4".to_string(),
            },
            audio: AudioConfig {
                sample_rate: 44100,
                channels: 2,
            },
            log: LogConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let loaded: Self = Self::builder(config::File::with_name("choreo").required(false))?
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would produce an unplayable render
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.audio.sample_rate == 0 {
            return Err(config::ConfigError::Message(
                "audio.sample_rate must be greater than 0".into(),
            ));
        }
        if self.audio.channels == 0 {
            return Err(config::ConfigError::Message(
                "audio.channels must be greater than 0".into(),
            ));
        }
        if self.render.video_name.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "render.video_name cannot be empty".into(),
            ));
        }
        Ok(())
    }

    fn builder<S>(file: S) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        Ok(config::Config::builder()
            .set_default("render.output_dir", "output")?
            .set_default("render.encode", true)?
            .set_default("render.video_name", "output.mp4")?
            .set_default("audio.sample_rate", 44100)?
            .set_default("audio.channels", 2)?
            .set_default("log.level", "info")?
            // Load from file if exists
            .add_source(file)
            // Allow env var overrides (e.g. CHOREO__RENDER__ENCODE=false)
            .add_source(
                config::Environment::with_prefix("CHOREO")
                    .prefix_separator("__")
                    .separator("__"),
            ))
    }
}
