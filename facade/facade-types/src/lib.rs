//! Core point cloud and plane types for facade extraction.
//!
//! This crate provides the foundational types shared by the detection
//! pipeline and the file I/O layer:
//!
//! - [`CloudPoint`] - A 3D position with trailing scalar attributes (e.g. intensity)
//! - [`PointCloud`] - An ordered collection of points
//! - [`Plane`] - An implicit plane `a·x + b·y + c·z + d = 0` with a unit normal
//! - [`UpAxis`] - Which world axis counts as "up"
//! - [`cross`], [`dot`], [`plane_from_points`], [`point_plane_distance`] - Geometry primitives
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64` in whatever
//! unit the scanner produced. Distance tolerances elsewhere in the workspace
//! are expressed in the same unit.
//!
//! # Coordinate System
//!
//! By default the **second coordinate (Y) is up**, matching the scans this
//! workspace was built for. Use [`UpAxis`] to select a different convention.
//!
//! # Example
//!
//! ```
//! use facade_types::{plane_from_points, point_plane_distance, Point3};
//!
//! let plane = plane_from_points(
//!     Point3::new(0.0, 0.0, 10.0),
//!     Point3::new(0.0, 10.0, 0.0),
//!     Point3::new(10.0, 0.0, 0.0),
//! )
//! .unwrap();
//!
//! assert!((plane.normal().norm() - 1.0).abs() < 1e-12);
//! assert!(point_plane_distance(&Point3::new(0.0, 0.0, 10.0), &plane) < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::module_name_repetitions)]

mod cloud;
mod error;
mod geometry;
mod plane;

pub use cloud::{CloudPoint, PointCloud};
pub use error::{GeometryError, GeometryResult};
pub use geometry::{cross, dot, UpAxis};
pub use plane::{plane_from_points, point_plane_distance, Plane};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
