use crate::assets::{image_sources, AssetLoader};
use crate::renderer::compositor::{ImageStore, Viewport};
use crate::renderer::{Compositor, FrameBuffer};
use crate::script::VideoScript;
use crate::timeline::Timeline;
use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info};

/// Background behind every frame
pub const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Rasterizes a directed timeline into numbered frames
pub struct RenderEngine {
    timeline: Timeline,
    viewport: Viewport,
    width: u32,
    height: u32,
    images: ImageStore,
}

impl RenderEngine {
    /// Create a render engine for a directed script.
    ///
    /// Images the script refers to are taken from `assets`; anything not
    /// preloaded is drawn as a placeholder box.
    pub fn new(script: &VideoScript, timeline: Timeline, assets: &AssetLoader) -> Self {
        let (width, height) = script.metadata.resolution.dimensions();
        let viewport = Viewport::new(width, height, script.metadata.frame_width);

        let images: ImageStore = image_sources(script)
            .into_iter()
            .filter_map(|source| {
                let pixels = assets.image(&source)?.pixels.clone();
                Some((source, pixels))
            })
            .collect();
        debug!(images = images.len(), width, height, "render engine ready");

        Self {
            timeline,
            viewport,
            width,
            height,
            images,
        }
    }

    /// Render a single frame
    pub fn render_frame(&self, frame_number: u32) -> FrameBuffer {
        let mut buffer = FrameBuffer::new(self.width, self.height);
        buffer.clear(BACKGROUND);
        let snapshot = self.timeline.sample(self.timeline.frame_to_time(frame_number));
        Compositor::draw_snapshot(&mut buffer, &self.viewport, &snapshot, &self.images);
        buffer
    }

    /// Path of a frame inside `output_dir`, matching [`Self::frame_pattern`]
    pub fn frame_path(output_dir: &Path, frame_number: u32) -> PathBuf {
        output_dir.join(format!("frame_{}.ppm", frame_number))
    }

    /// ffmpeg input pattern for the frames written by [`Self::render`]
    pub fn frame_pattern(output_dir: &Path) -> PathBuf {
        output_dir.join("frame_%d.ppm")
    }

    /// Render all frames to the output directory in parallel.
    ///
    /// Returns the number of frames written.
    pub fn render(&self, output_dir: &Path) -> Result<u32> {
        let total_frames = self.timeline.total_frames();
        let done = AtomicU32::new(0);
        let step = (self.timeline.fps() * 10).max(1);

        (0..total_frames).into_par_iter().try_for_each(|frame| {
            self.render_frame(frame)
                .save_ppm(&Self::frame_path(output_dir, frame))?;
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % step == 0 {
                info!("rendered {}/{} frames", finished, total_frames);
            }
            Ok::<(), anyhow::Error>(())
        })?;

        Ok(total_frames)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
