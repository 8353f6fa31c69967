//! colorfill
//!
//! Incremental flood fill for coloring-book style images. A fill spreads
//! from a seed in waves, stops at cells already carrying the fill alpha, and
//! hands the partially painted buffer back to the caller every few waves so
//! it can be shown while the fill is still running.
//!
//! ```no_run
//! use colorfill::{Color, FillCanvas, FillConfig, FillControl};
//!
//! let mut canvas = FillCanvas::from_image("page.png", FillConfig::default())?;
//! canvas.fill_centered(0.0, 0.0, Color::GREEN, |_buffer| {
//!     // upload `_buffer.target()` to the screen here
//!     FillControl::Continue
//! })?;
//! # Ok::<(), colorfill::Error>(())
//! ```

mod canvas;
mod config;
mod error;
mod fill;
mod image_source;
mod pixel_buffer;

#[cfg(feature = "viewer")]
pub mod display;

pub use canvas::FillCanvas;
pub use config::{
    FillConfig, Propagation, Settings, DEFAULT_ALPHA_THRESHOLD, DEFAULT_MAX_FILL_COUNT,
};
pub use error::{Error, Result};
pub use fill::{Direction, FillControl, FillEngine, FillReport, FillStep};
pub use image_source::{export_png, line_art, load_image, ImageSource};
pub use pixel_buffer::{translate_x, translate_y, Color, PixelBuffer, Plane, CHANNELS};
