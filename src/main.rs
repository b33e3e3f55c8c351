use anyhow::{Context, Result};
use choreo::config::AppConfig;
use choreo::lessons::Lesson;
use choreo::pipeline::{RenderOptions, RenderPipeline, RenderReport};
use choreo::{ScriptParser, VideoScript};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "choreo")]
#[command(about = "Choreographed explainer videos from declarative scripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a script and replay it against the scene without rendering
    Validate {
        #[command(flatten)]
        source: ScriptSource,
    },
    /// Print the script summary, segment table and cue table
    Inspect {
        #[command(flatten)]
        source: ScriptSource,
    },
    /// Render frames, mix narration and encode the video
    Render {
        #[command(flatten)]
        source: ScriptSource,

        /// Directory for frames, audio and video (defaults to the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the frames and audio but skip ffmpeg
        #[arg(long)]
        no_encode: bool,

        /// Render even when the output is up to date
        #[arg(long)]
        force: bool,
    },
    /// Export a built-in lesson as a JSON script
    Lesson {
        #[arg(value_enum)]
        name: Lesson,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ScriptSource {
    /// Path to a JSON or TOML script
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Use a built-in lesson instead of a script file
    #[arg(long, value_enum)]
    lesson: Option<Lesson>,
}

impl ScriptSource {
    /// The script and the directory its assets are resolved against
    fn load(&self) -> Result<(VideoScript, PathBuf)> {
        match (&self.script, self.lesson) {
            (Some(path), _) => {
                println!("Parsing script: {}", path.display());
                let script = ScriptParser::parse(path)?;
                let base = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."))
                    .to_path_buf();
                Ok((script, base))
            }
            (None, Some(lesson)) => Ok((lesson.script(), PathBuf::from("."))),
            (None, None) => anyhow::bail!("Either a script path or --lesson is required"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Logs go to stderr so exported scripts on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate { source } => {
            let (script, _) = source.load()?;
            let timeline = ScriptParser::validate(&script)?;
            println!(
                "✅ Validation complete: {} segments, {:.2}s, {} frames",
                timeline.segments().len(),
                timeline.duration(),
                timeline.total_frames()
            );
        }
        Commands::Inspect { source } => {
            let (script, _) = source.load()?;
            let timeline = ScriptParser::validate(&script)?;
            println!("\n📋 Script Summary:");
            println!("{}", ScriptParser::summarize(&script));
            println!("{}", ScriptParser::describe(&timeline));
        }
        Commands::Render {
            source,
            output,
            no_encode,
            force,
        } => {
            let (script, base) = source.load()?;
            let mut options = RenderOptions::from_config(&config);
            if let Some(dir) = output {
                options.output_dir = dir;
            }
            options.encode &= !no_encode;
            options.force = force;

            println!("\n🎬 Rendering '{}'...", script.metadata.title);
            let report = RenderPipeline::run(&script, &base, &options)?;
            print_report(&report, &options);
        }
        Commands::Lesson { name, output } => {
            let json = serde_json::to_string_pretty(&name.script())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("📄 Lesson exported to: {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

fn print_report(report: &RenderReport, options: &RenderOptions) {
    let short = &report.fingerprint[..report.fingerprint.len().min(12)];
    if report.cached {
        println!("✨ Output is up to date ({}), nothing to render", short);
        println!("   Use --force to render again.");
        return;
    }

    println!(
        "  ✓ {} frames ({:.2}s) written to: {}",
        report.frames,
        report.duration,
        options.output_dir.display()
    );
    if let Some(audio) = &report.audio {
        println!("  ✓ Mixed audio exported to: {}", audio.display());
    }
    if let Some(stats) = &report.assets {
        println!("\n📊 Asset Statistics:");
        println!("  {}", stats);
    }

    if let Some(video) = &report.video {
        println!("✨ Video created successfully: {}", video.display());
    } else if report.encoder_missing {
        println!("⚠️  FFmpeg not found. Skipping video encoding.");
        println!("   Frames are saved in: {}", options.output_dir.display());
        println!("\n💡 To enable video generation, install FFmpeg:");
        if cfg!(target_os = "macos") {
            println!("   brew install ffmpeg");
        } else if cfg!(target_os = "windows") {
            println!("   choco install ffmpeg");
        } else if cfg!(target_os = "linux") {
            println!("   sudo apt-get install ffmpeg");
        } else {
            println!("   Install FFmpeg from https://ffmpeg.org/download.html");
        }
    }
}
