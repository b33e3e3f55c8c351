pub mod compositor;
pub mod encoder;
pub mod engine;
pub mod frame_buffer;

pub use compositor::{Compositor, ImageStore, Viewport};
pub use encoder::{EncodeJob, VideoEncoder};
pub use engine::RenderEngine;
pub use frame_buffer::FrameBuffer;
