//! Error type for configuration loading and rule validation.
//!
//! Pipeline stages never fail: anomalies there are logged and skipped
//! (see `generation::StageOutcome`). Only authored input can be rejected.

use std::path::PathBuf;

/// Errors raised while loading or validating generator input
#[derive(Debug, thiserror::Error)]
pub enum LevelGenError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
    #[error("Invalid tile rule {index}: {reason}")]
    InvalidTileRule { index: usize, reason: String },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, LevelGenError>;
