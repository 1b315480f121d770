//! Error types for geometric construction.

use thiserror::Error;

/// Result type for geometric construction.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors that can occur while building geometric primitives.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// The three sample points are collinear or coincident, so they do not
    /// span a plane.
    #[error("degenerate sample: points are collinear (normal length {normal_length:e})")]
    DegenerateSample {
        /// Length of the un-normalized cross product.
        normal_length: f64,
    },

    /// Plane coefficients have a zero (or non-finite) normal.
    #[error("plane normal is zero or not finite")]
    ZeroNormal,
}
