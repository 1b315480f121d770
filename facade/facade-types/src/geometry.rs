//! Vector primitives and the world "up" convention.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cross product of two vectors.
///
/// The result is perpendicular to both `a` and `b`.
///
/// # Example
///
/// ```
/// use facade_types::{cross, Vector3};
///
/// let c = cross(&Vector3::new(0.0, 0.0, 1.0), &Vector3::new(0.0, 1.0, 0.0));
/// assert_eq!(c, Vector3::new(-1.0, 0.0, 0.0));
/// ```
#[inline]
#[must_use]
pub fn cross(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    a.cross(b)
}

/// Dot product of two vectors.
#[inline]
#[must_use]
pub fn dot(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(b)
}

/// The world axis that points "up" in a scan.
///
/// Upright planes have normals nearly perpendicular to this axis, and the
/// density filter uses the raw coordinate along it as its vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UpAxis {
    /// First coordinate is up.
    X,
    /// Second coordinate is up.
    #[default]
    Y,
    /// Third coordinate is up.
    Z,
}

impl UpAxis {
    /// Unit vector along this axis.
    #[must_use]
    pub fn vector(self) -> Vector3<f64> {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }

    /// Index of this axis in an `(x, y, z)` triple.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// The raw coordinate of `point` along this axis.
    #[must_use]
    pub fn height_of(self, point: &Point3<f64>) -> f64 {
        point[self.index()]
    }
}

impl std::fmt::Display for UpAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        };
        f.write_str(name)
    }
}
