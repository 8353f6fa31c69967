//! Getting pixels in and out: PNG decoding, PNG export, and a procedural
//! line-art sketch for running without an image file.

use std::path::Path;

use image::{ExtendedColorType, RgbaImage};

use crate::error::Result;
use crate::pixel_buffer::{Color, PixelBuffer, CHANNELS};

/// Anything that can hand over an RGBA8 snapshot, top-left origin, row-major
pub trait ImageSource {
    fn dimensions(&self) -> (u32, u32);

    /// `width * height * 4` bytes
    fn snapshot(&self) -> Vec<u8>;
}

impl ImageSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn snapshot(&self) -> Vec<u8> {
        self.as_raw().clone()
    }
}

impl PixelBuffer {
    /// Build a buffer from any image source
    pub fn from_source(source: &impl ImageSource) -> Result<Self> {
        let (width, height) = source.dimensions();
        Self::new(width, height, source.snapshot())
    }
}

/// Decode an image file (PNG) to RGBA8
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbaImage> {
    let path = path.as_ref();
    let img = image::open(path)?.to_rgba8();
    tracing::info!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "image loaded"
    );
    Ok(img)
}

/// Write the target plane as a PNG
pub fn export_png(buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
    image::save_buffer(
        path,
        buffer.target(),
        buffer.width(),
        buffer.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

// ============================================================================
// Line-art sketch
// ============================================================================

const INK: Color = Color::BLACK;
/// Stroke width; two pixels keeps diagonal runs closed under 4-connectivity
const STROKE: f32 = 2.0;

/// Coloring-book style page: opaque black outlines on a transparent page.
/// A frame, a circle, a square and a horizon line split it into regions.
pub fn line_art(width: u32, height: u32) -> Result<PixelBuffer> {
    let mut pixels = Color::TRANSPARENT
        .to_bytes()
        .repeat(width as usize * height as usize);

    let w = width as f32;
    let h = height as f32;
    let cx = w * 0.35;
    let cy = h * 0.45;
    let radius = w.min(h) * 0.25;
    let (sq_x0, sq_y0) = (w * 0.62, h * 0.2);
    let (sq_x1, sq_y1) = (w * 0.9, h * 0.55);
    let horizon = h * 0.78;

    for y in 0..height {
        for x in 0..width {
            let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);

            let frame = fx < STROKE || fy < STROKE || fx > w - STROKE || fy > h - STROKE;
            let dist = (fx - cx).hypot(fy - cy);
            let circle = (dist - radius).abs() < STROKE * 0.5 + 0.25;
            let in_square_band = fx > sq_x0 - STROKE * 0.5
                && fx < sq_x1 + STROKE * 0.5
                && fy > sq_y0 - STROKE * 0.5
                && fy < sq_y1 + STROKE * 0.5;
            let inside_square = fx > sq_x0 + STROKE * 0.5
                && fx < sq_x1 - STROKE * 0.5
                && fy > sq_y0 + STROKE * 0.5
                && fy < sq_y1 - STROKE * 0.5;
            let square = in_square_band && !inside_square;
            let ground = (fy - horizon).abs() < STROKE * 0.5;

            if frame || circle || square || ground {
                let i = (x as usize + y as usize * width as usize) * CHANNELS;
                pixels[i..i + CHANNELS].copy_from_slice(&INK.to_bytes());
            }
        }
    }

    PixelBuffer::new(width, height, pixels)
}
