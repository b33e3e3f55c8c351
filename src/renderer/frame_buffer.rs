use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// RGBA frame buffer for rendering
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>, // RGBA, 4 bytes per pixel
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Clear buffer with color
    pub fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx..idx + 4].copy_from_slice(&color);
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let idx = self.index(x, y)?;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(pixel)
    }

    /// Alpha blend `color` scaled by `coverage` (0..=1) onto the pixel
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [u8; 4], coverage: f32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let alpha = color[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let inv_alpha = 1.0 - alpha;
        let bg = &mut self.pixels[idx..idx + 4];
        for channel in 0..3 {
            bg[channel] = (color[channel] as f32 * alpha + bg[channel] as f32 * inv_alpha).round() as u8;
        }
        // Output alpha is always opaque
        bg[3] = 255;
    }

    /// Get buffer dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get raw pixel data
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Save as binary PPM, dropping the alpha channel
    pub fn save_ppm(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create frame file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "P6")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        for chunk in self.pixels.chunks_exact(4) {
            writer.write_all(&chunk[0..3])?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_buffer_creation() {
        let fb = FrameBuffer::new(1920, 1080);
        assert_eq!(fb.dimensions(), (1920, 1080));
        assert_eq!(fb.as_bytes().len(), 1920 * 1080 * 4);
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new(100, 100);
        fb.clear([255, 0, 0, 255]); // Red

        assert_eq!(fb.get_pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(fb.get_pixel(50, 50), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_set_get_pixel() {
        let mut fb = FrameBuffer::new(100, 100);
        fb.set_pixel(10, 20, [100, 150, 200, 255]);

        assert_eq!(fb.get_pixel(10, 20), Some([100, 150, 200, 255]));
        assert_eq!(fb.get_pixel(100, 100), None); // Out of bounds
    }

    #[test]
    fn test_alpha_blending() {
        let mut fb = FrameBuffer::new(100, 100);
        fb.clear([255, 255, 255, 255]);

        fb.blend_pixel(50, 50, [255, 0, 0, 128], 1.0);
        let pixel = fb.get_pixel(50, 50).unwrap();
        assert_eq!(pixel[0], 255);
        assert!(pixel[1] > 120 && pixel[1] < 135);

        // Half coverage halves the effective alpha
        fb.blend_pixel(10, 10, [0, 0, 0, 255], 0.5);
        let pixel = fb.get_pixel(10, 10).unwrap();
        assert!(pixel[0] > 120 && pixel[0] < 135);

        fb.blend_pixel(20, 20, [0, 0, 0, 255], 0.0);
        assert_eq!(fb.get_pixel(20, 20), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_save_ppm_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("frame_0.ppm");
        let mut fb = FrameBuffer::new(3, 2);
        fb.clear([1, 2, 3, 255]);
        fb.save_ppm(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n3 2\n255\n"));
        assert_eq!(bytes.len(), b"P6\n3 2\n255\n".len() + 3 * 2 * 3);
        assert_eq!(&bytes[bytes.len() - 3..], &[1, 2, 3]);
    }
}
