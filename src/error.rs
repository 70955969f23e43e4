//! Error types shared by every fallible operation in the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building networks, loading data, or writing outputs.
///
/// Numerical problems during training (diverging or NaN losses) are not
/// errors: they are logged and training carries on.
#[derive(Debug, Error)]
pub enum GanError {
    /// A file or directory could not be read, written or created.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The dataset files are malformed or inconsistent.
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Layers do not chain, or a convolution geometry is impossible.
    #[error("architecture error: {0}")]
    Architecture(String),

    /// A value of the wrong length reached a network boundary.
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    Shape { expected: usize, actual: usize },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> GanError {
        GanError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, GanError>;
