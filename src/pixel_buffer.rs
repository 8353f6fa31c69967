//! Two-plane RGBA pixel storage
//!
//! The source plane is the untouched image; the target plane is what fills
//! paint into and what gets shown.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bytes per pixel (RGBA8, top-left origin, row-major)
pub const CHANNELS: usize = 4;

// ============================================================================
// Color
// ============================================================================

/// A straight RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const GREEN: Self = Self::rgba(0, 255, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Which of the two planes to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Original pixels, never written after construction
    Source,
    /// Working pixels, painted by fills
    Target,
}

// ============================================================================
// Coordinate translation
// ============================================================================

/// Lands outside every buffer
const OFF_BUFFER: i32 = i32::MIN;

/// Center-origin X (as a display surface reports it) to buffer column.
/// Truncates toward zero. NaN and infinities map off the buffer.
#[inline]
pub fn translate_x(width: u32, x: f32) -> i32 {
    if !x.is_finite() {
        return OFF_BUFFER;
    }
    (x + width as f32 * 0.5).trunc() as i32
}

/// Center-origin, Y-up coordinate to buffer row (Y-down). Truncates toward
/// zero. NaN and infinities map off the buffer.
#[inline]
pub fn translate_y(height: u32, y: f32) -> i32 {
    if !y.is_finite() {
        return OFF_BUFFER;
    }
    (-y + height as f32 * 0.5).trunc() as i32
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8 image held twice: once as loaded, once as painted
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    source: Vec<u8>,
    target: Vec<u8>,
}

impl PixelBuffer {
    /// Build from a snapshot of the source image. Target starts as a copy.
    pub fn new(width: u32, height: u32, source: Vec<u8>) -> Result<Self> {
        let target = source.clone();
        Self::from_planes(width, height, source, target)
    }

    /// Build from separate source and target planes
    pub fn from_planes(width: u32, height: u32, source: Vec<u8>, target: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyDimensions { width, height });
        }
        if source.len() != target.len() {
            return Err(Error::PlaneMismatch {
                source_len: source.len(),
                target_len: target.len(),
            });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if source.len() != expected {
            return Err(Error::PlaneSize {
                expected,
                actual: source.len(),
            });
        }
        Ok(Self {
            width,
            height,
            source,
            target,
        })
    }

    /// Solid-color buffer, mostly useful for tests and demos
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
        let len = width as usize * height as usize;
        let source = color.to_bytes().repeat(len);
        Self::new(width, height, source)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    #[inline]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    #[inline]
    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// `[0, width) x [0, height)`; the only bound used anywhere in the crate
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// Byte offset of the pixel at (x, y). No bounds check: callers test
    /// `in_bounds` first.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (x as usize + y as usize * self.width as usize) * CHANNELS
    }

    #[inline]
    fn plane(&self, plane: Plane) -> &[u8] {
        match plane {
            Plane::Source => &self.source,
            Plane::Target => &self.target,
        }
    }

    /// Alpha byte of a pixel. Same contract as `index`.
    #[inline]
    pub fn alpha(&self, plane: Plane, x: u32, y: u32) -> u8 {
        self.plane(plane)[self.index(x, y) + 3]
    }

    /// Overwrite all four channels of a target pixel. Same contract as `index`.
    #[inline]
    pub fn set_color(&mut self, x: u32, y: u32, color: Color) {
        let idx = self.index(x, y);
        self.target[idx..idx + CHANNELS].copy_from_slice(&color.to_bytes());
    }

    /// Read a pixel (bounds checked)
    pub fn pixel(&self, plane: Plane, x: i32, y: i32) -> Option<Color> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.index(x as u32, y as u32);
        let p = &self.plane(plane)[idx..idx + CHANNELS];
        Some(Color::rgba(p[0], p[1], p[2], p[3]))
    }

    /// Throw away every fill and show the original image again
    pub fn reset(&mut self) {
        self.target.copy_from_slice(&self.source);
    }
}
