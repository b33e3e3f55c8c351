use crate::script::{Effect, Geometry, ObjectSpec, Step, VideoScript};
use anyhow::{Context, Result};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Asset types that can be loaded
#[derive(Debug, Clone)]
pub enum Asset {
    Image(ImageAsset),
    Narration(NarrationAsset),
}

/// Decoded RGBA image
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pixels: RgbaImage,
}

/// Narration clip checked to exist; decoding happens at mix time
#[derive(Debug, Clone)]
pub struct NarrationAsset {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Asset loader that manages loading and caching of assets
pub struct AssetLoader {
    assets: HashMap<PathBuf, Asset>,
    base_path: PathBuf,
}

impl AssetLoader {
    /// Create a new asset loader with a base path for resolving relative paths
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            assets: HashMap::new(),
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Load and decode an image asset
    pub fn load_image(&mut self, path: &Path) -> Result<&ImageAsset> {
        let full_path = self.resolve_path(path);

        if !self.assets.contains_key(&full_path) {
            if !full_path.exists() {
                anyhow::bail!("Image file not found: {}", full_path.display());
            }

            let pixels = image::open(&full_path)
                .with_context(|| format!("Failed to decode image: {}", full_path.display()))?
                .to_rgba8();
            let (width, height) = pixels.dimensions();
            debug!(path = %full_path.display(), width, height, "loaded image");

            self.assets.insert(
                full_path.clone(),
                Asset::Image(ImageAsset {
                    path: full_path.clone(),
                    width,
                    height,
                    pixels,
                }),
            );
        }

        match self.assets.get(&full_path) {
            Some(Asset::Image(img)) => Ok(img),
            _ => anyhow::bail!("Asset is not an image: {}", full_path.display()),
        }
    }

    /// Register a narration clip after checking that it exists
    pub fn load_narration(&mut self, path: &Path) -> Result<&NarrationAsset> {
        let full_path = self.resolve_path(path);

        if !self.assets.contains_key(&full_path) {
            let meta = std::fs::metadata(&full_path)
                .with_context(|| format!("Narration file not found: {}", full_path.display()))?;

            self.assets.insert(
                full_path.clone(),
                Asset::Narration(NarrationAsset {
                    path: full_path.clone(),
                    bytes: meta.len(),
                }),
            );
        }

        match self.assets.get(&full_path) {
            Some(Asset::Narration(clip)) => Ok(clip),
            _ => anyhow::bail!("Asset is not a narration clip: {}", full_path.display()),
        }
    }

    /// Already-loaded image, if any
    pub fn image(&self, path: &Path) -> Option<&ImageAsset> {
        match self.assets.get(&self.resolve_path(path)) {
            Some(Asset::Image(img)) => Some(img),
            _ => None,
        }
    }

    /// Load every image and narration clip a script refers to.
    ///
    /// The first missing or undecodable asset aborts the preload.
    pub fn preload(&mut self, script: &VideoScript) -> Result<()> {
        for cue in &script.cues {
            self.load_narration(&cue.source)
                .with_context(|| format!("Cue '{}'", cue.id))?;
        }
        for source in image_sources(script) {
            self.load_image(&source)?;
        }
        Ok(())
    }

    /// Resolve a path relative to the base path
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// Get statistics about loaded assets
    pub fn stats(&self) -> AssetStats {
        let mut images = 0;
        let mut narration = 0;

        for asset in self.assets.values() {
            match asset {
                Asset::Image(_) => images += 1,
                Asset::Narration(_) => narration += 1,
            }
        }

        AssetStats {
            total: self.assets.len(),
            images,
            narration,
        }
    }

    /// Clear all loaded assets from memory
    pub fn clear(&mut self) {
        self.assets.clear();
    }
}

/// Every image path declared anywhere in a script, in first-use order
pub fn image_sources(script: &VideoScript) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for step in script.steps() {
        match step {
            Step::Add { objects } => {
                for object in objects {
                    collect_images(object, &mut out);
                }
            }
            Step::Play { animations, .. } => {
                let mut stack: Vec<&Effect> = animations.iter().map(|a| &a.effect).collect();
                while let Some(effect) = stack.pop() {
                    match effect {
                        Effect::Create { object }
                        | Effect::DrawBorderThenFill { object }
                        | Effect::Write { object }
                        | Effect::TypeWithCursor { object }
                        | Effect::FadeIn { object, .. }
                        | Effect::GrowFromCenter { object }
                        | Effect::ReplacementTransform { object, .. }
                        | Effect::TransformFromCopy { object, .. } => collect_images(object, &mut out),
                        Effect::Transform { into, .. } => note_image(&into.geometry, &mut out),
                        Effect::Group { animations, .. } => {
                            stack.extend(animations.iter().rev().map(|a| &a.effect));
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn collect_images(spec: &ObjectSpec, out: &mut Vec<PathBuf>) {
    for object in spec.flatten() {
        note_image(&object.shape.geometry, out);
    }
}

fn note_image(geometry: &Geometry, out: &mut Vec<PathBuf>) {
    if let Geometry::Image { source, .. } = geometry {
        if !out.contains(source) {
            out.push(source.clone());
        }
    }
}

/// Statistics about loaded assets
#[derive(Debug, Clone)]
pub struct AssetStats {
    pub total: usize,
    pub images: usize,
    pub narration: usize,
}

impl std::fmt::Display for AssetStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total: {}, Images: {}, Narration clips: {}",
            self.total, self.images, self.narration
        )
    }
}
