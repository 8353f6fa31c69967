use thiserror::Error;

/// Errors raised while building buffers, loading configuration or images,
/// or starting a fill. The fill itself never fails once it is running.
#[derive(Debug, Error)]
pub enum Error {
    #[error("buffer dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("pixel plane holds {actual} bytes, expected {expected} for the buffer size")]
    PlaneSize { expected: usize, actual: usize },

    #[error("source plane holds {source_len} bytes but target plane holds {target_len}")]
    PlaneMismatch { source_len: usize, target_len: usize },

    #[error("invalid fill configuration: {0}")]
    InvalidConfig(String),

    #[error("a fill is already in progress on this buffer")]
    FillInProgress,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
