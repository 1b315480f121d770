//! Error types for plane detection.

use thiserror::Error;

/// Result type for plane detection operations.
pub type DetectResult<T> = Result<T, DetectError>;

/// Errors that can occur during plane detection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    /// Not enough points for the operation.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points required.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },

    /// Every sampled triple was degenerate, so no plane hypothesis exists.
    #[error("no plane hypothesis: all samples were degenerate across {iterations} iterations")]
    DegenerateSample {
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// No round produced an upright plane.
    #[error("no upright plane found after {rounds} rounds ({remaining} points left)")]
    NoUprightPlane {
        /// Number of rounds that ran.
        rounds: usize,
        /// Points still unclaimed when the search stopped.
        remaining: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of why the parameter is invalid.
        reason: String,
    },
}

impl DetectError {
    /// Create an `InvalidParameter` error with the given reason.
    #[must_use]
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}
