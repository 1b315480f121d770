//! Upright plane detection for point clouds.
//!
//! This crate finds the dominant vertical plane (typically a building facade)
//! in a scanned point cloud:
//!
//! - [`fit_plane`] - Plain RANSAC over three-point hypotheses
//! - [`extract_upright_plane`] - Repeats the fit, peeling off non-upright
//!   planes such as the ground, until an upright one is found
//! - [`filter_frontal_plane`] - Drops sparse clutter from the accepted plane
//!   using a coarse in-plane density grid
//!
//! # Randomness
//!
//! Every function that samples takes the random source as an argument. Pass a
//! seeded generator such as [`rand::rngs::StdRng`] for reproducible results.
//!
//! # Example
//!
//! ```
//! use facade_detect::{extract_upright_plane, filter_frontal_plane, DensityParams, ExtractionConfig};
//! use facade_types::{CloudPoint, PointCloud};
//! use rand::SeedableRng;
//!
//! // A 20x20 wall on x = 0, Y up.
//! let cloud: PointCloud = (0..400)
//!     .map(|i| CloudPoint::from_coords(0.0, f64::from(i / 20), f64::from(i % 20)))
//!     .collect();
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let config = ExtractionConfig::default();
//! let extraction = extract_upright_plane(&cloud, &config, &mut rng).unwrap();
//! assert_eq!(extraction.inliers.len(), 400);
//!
//! let cleaned = filter_frontal_plane(
//!     &extraction.inliers,
//!     &extraction.plane,
//!     config.up_axis,
//!     &DensityParams::default(),
//! )
//! .unwrap();
//! assert_eq!(cleaned.total, 400);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::module_name_repetitions)]

mod density;
mod error;
mod extract;
mod ransac;

pub use density::{filter_frontal_plane, DensityFilterResult, DensityGrid, DensityParams};
pub use error::{DetectError, DetectResult};
pub use extract::{extract_upright_plane, Extraction, ExtractionConfig, RoundSummary};
pub use ransac::{count_inliers, fit_plane, PlaneFit, RansacConfig, MIN_SAMPLE_SIZE};
