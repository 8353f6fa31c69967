use std::path::Path;

use crate::config::FillConfig;
use crate::error::Result;
use crate::fill::{FillControl, FillEngine, FillReport, FillStep};
use crate::image_source::load_image;
use crate::pixel_buffer::{translate_x, translate_y, Color, PixelBuffer, Plane};

/// A pixel buffer together with the engine that fills it.
///
/// Owning both keeps a fill from ever running against a buffer it was not
/// armed for, and gives event loops one object to drive.
pub struct FillCanvas {
    buffer: PixelBuffer,
    engine: FillEngine,
}

impl FillCanvas {
    pub fn new(buffer: PixelBuffer, config: FillConfig) -> Result<Self> {
        Ok(Self {
            buffer,
            engine: FillEngine::new(config)?,
        })
    }

    /// Load an image file as the source plane
    pub fn from_image(path: impl AsRef<Path>, config: FillConfig) -> Result<Self> {
        let img = load_image(path)?;
        Self::new(PixelBuffer::from_source(&img)?, config)
    }

    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    #[inline]
    pub fn config(&self) -> &FillConfig {
        self.engine.config()
    }

    #[inline]
    pub fn is_filling(&self) -> bool {
        self.engine.is_filling()
    }

    /// Paint a single cell given in center-origin, Y-up coordinates.
    /// Returns whether the cell would keep spreading; false when it lies
    /// outside the buffer (nothing is written then).
    pub fn paint_centered(&mut self, x: f32, y: f32, color: Color) -> bool {
        let bx = translate_x(self.buffer.width(), x);
        let by = translate_y(self.buffer.height(), y);
        if !self.buffer.in_bounds(bx, by) {
            return false;
        }
        let (bx, by) = (bx as u32, by as u32);
        self.buffer.set_color(bx, by, color);
        self.buffer.alpha(Plane::Source, bx, by) <= self.engine.config().alpha_threshold
    }

    /// Fill from a buffer-space seed to completion
    pub fn fill<F>(&mut self, x: i32, y: i32, color: Color, flush: F) -> Result<FillReport>
    where
        F: FnMut(&PixelBuffer) -> FillControl,
    {
        self.engine.fill(&mut self.buffer, (x, y), color, flush)
    }

    /// Fill from a center-origin, Y-up seed to completion
    pub fn fill_centered<F>(&mut self, x: f32, y: f32, color: Color, flush: F) -> Result<FillReport>
    where
        F: FnMut(&PixelBuffer) -> FillControl,
    {
        let seed = self.translate(x, y);
        self.engine.fill(&mut self.buffer, seed, color, flush)
    }

    /// Arm a fill from a buffer-space seed; drive it with `advance`
    pub fn begin(&mut self, x: i32, y: i32, color: Color) -> Result<()> {
        self.engine.begin(&self.buffer, (x, y), color)
    }

    pub fn begin_centered(&mut self, x: f32, y: f32, color: Color) -> Result<()> {
        let seed = self.translate(x, y);
        self.engine.begin(&self.buffer, seed, color)
    }

    pub fn advance(&mut self) -> FillStep {
        self.engine.advance(&mut self.buffer)
    }

    pub fn cancel(&mut self) -> Option<FillReport> {
        self.engine.cancel()
    }

    /// Restore the original image. Refused while a fill is armed.
    pub fn reset(&mut self) -> bool {
        if self.engine.is_filling() {
            return false;
        }
        self.buffer.reset();
        true
    }

    fn translate(&self, x: f32, y: f32) -> (i32, i32) {
        (
            translate_x(self.buffer.width(), x),
            translate_y(self.buffer.height(), y),
        )
    }
}
