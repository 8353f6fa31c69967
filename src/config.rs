//! Fill and viewer settings, stored as JSON

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pixel_buffer::Color;

/// Source-plane alpha above which a painted cell stops spreading
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 100;
/// Waves between two flushes
pub const DEFAULT_MAX_FILL_COUNT: u32 = 30;

/// What a cell that fails the alpha gate does with its neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Neighbors are proposed even from gated cells. Only cells whose target
    /// alpha already equals the fill alpha act as walls.
    #[default]
    Observed,
    /// Gated cells are painted but propose no neighbors
    Gated,
}

/// Construction-time fill parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    pub alpha_threshold: u8,
    pub max_fill_count: u32,
    pub propagation: Propagation,
}

impl FillConfig {
    pub fn new(alpha_threshold: u8, max_fill_count: u32) -> Self {
        Self {
            alpha_threshold,
            max_fill_count,
            propagation: Propagation::default(),
        }
    }

    pub fn with_propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_fill_count == 0 {
            return Err(Error::InvalidConfig(
                "max_fill_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FillConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA_THRESHOLD, DEFAULT_MAX_FILL_COUNT)
    }
}

/// Everything the viewer persists between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fill: FillConfig,
    /// Colors bound to the number keys, in order
    pub palette: Vec<Color>,
}

impl Settings {
    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.fill.validate()?;
        Ok(settings)
    }

    /// Load settings, or fall back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Palette entry for a zero-based slot, clamped to the last color
    pub fn color(&self, slot: usize) -> Color {
        self.palette
            .get(slot)
            .or_else(|| self.palette.last())
            .copied()
            .unwrap_or(Color::GREEN)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fill: FillConfig::default(),
            palette: vec![
                Color::GREEN,
                Color::rgb(230, 57, 70),
                Color::rgb(255, 183, 3),
                Color::rgb(33, 158, 188),
                Color::rgb(142, 68, 173),
                Color::rgb(255, 120, 180),
                Color::rgb(120, 72, 36),
                Color::rgb(250, 250, 250),
                Color::rgb(40, 40, 40),
            ],
        }
    }
}
