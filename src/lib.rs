pub mod assets;
pub mod audio;
pub mod config;
pub mod director;
pub mod error;
pub mod layout;
pub mod lessons;
pub mod parser;
pub mod pipeline;
pub mod rate;
pub mod renderer;
pub mod scene;
pub mod script;
pub mod timeline;

pub use assets::AssetLoader;
pub use audio::{AudioDecoder, AudioMixer};
pub use director::Director;
pub use error::{DirectorError, DirectorResult};
pub use parser::ScriptParser;
pub use pipeline::{RenderOptions, RenderPipeline, RenderReport};
pub use rate::RateFunc;
pub use renderer::{Compositor, FrameBuffer, RenderEngine};
pub use script::VideoScript;
pub use timeline::{Snapshot, Timeline};
