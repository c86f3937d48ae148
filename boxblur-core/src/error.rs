//! Error types for image I/O and configuration.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a valid BMP file: {0}")]
    Format(String),

    #[error("unsupported BMP format: {0}")]
    UnsupportedFormat(String),
}

impl ImageError {
    /// True for failures of the underlying file rather than of its contents.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            ImageError::Open { .. } | ImageError::Create { .. } | ImageError::Io(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
