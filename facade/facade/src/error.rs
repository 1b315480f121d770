//! Error types for the extraction pipeline.

use std::path::PathBuf;
use thiserror::Error;

use facade_detect::DetectError;
use facade_io::IoError;

/// Result type for pipeline operations.
pub type FacadeResult<T> = Result<T, FacadeError>;

/// Errors from loading a pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has unknown keys.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors that can occur anywhere in the pipeline.
#[derive(Debug, Error)]
pub enum FacadeError {
    /// Reading or writing a point cloud failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Plane detection failed.
    #[error(transparent)]
    Detect(#[from] DetectError),

    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FacadeError {
    /// Whether the run finished normally but found no upright plane.
    #[must_use]
    pub fn is_no_plane(&self) -> bool {
        matches!(self, Self::Detect(DetectError::NoUprightPlane { .. }))
    }
}
