//! Facade extraction from point clouds.
//!
//! This umbrella crate re-exports the facade-* crates and adds the pieces
//! that tie them together: a TOML-loadable [`PipelineConfig`] and
//! [`run_pipeline`], which finds the dominant upright plane in a cloud and
//! strips sparse clutter from it.
//!
//! # Quick Start
//!
//! ```no_run
//! use facade::prelude::*;
//!
//! let config = PipelineConfig::from_file("facade.toml").unwrap();
//! let input = load_pcd("scan.pcd").unwrap();
//!
//! let result = run_pipeline(&input.cloud, &config, &mut config.rng()).unwrap();
//! println!("{result}");
//!
//! save_pcd("facade.pcd", &input.header, result.cloud()).unwrap();
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Points, clouds, planes and geometry primitives
//! - [`detect`] - RANSAC, upright plane extraction, density cleanup
//! - [`io`] - ASCII PCD reading and writing

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// Re-exports
// =============================================================================

/// Points, clouds, planes and geometry primitives.
pub use facade_types as types;

/// RANSAC plane fitting, upright plane extraction, density cleanup.
pub use facade_detect as detect;

/// ASCII PCD reading and writing.
pub use facade_io as io;

mod config;
mod error;
mod pipeline;

pub use config::PipelineConfig;
pub use error::{ConfigError, FacadeError, FacadeResult};
pub use pipeline::{process_file, run_pipeline, PipelineResult};

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for facade extraction.
///
/// # Usage
///
/// ```
/// use facade::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use facade_types::{CloudPoint, Plane, Point3, PointCloud, UpAxis};

    // Detection
    pub use facade_detect::{DensityParams, ExtractionConfig, RansacConfig};

    // I/O
    pub use facade_io::{load_pcd, save_pcd, PcdFile, PcdHeader};

    // Pipeline
    pub use crate::{run_pipeline, FacadeError, PipelineConfig, PipelineResult};
}
