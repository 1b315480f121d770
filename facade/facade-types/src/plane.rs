//! Implicit plane representation and point-to-plane distance.

use nalgebra::{Point3, Vector3};

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{cross, dot, UpAxis};

/// Relative tolerance below which a cross product is treated as zero.
///
/// The cross product length is compared against the product of the two edge
/// lengths, i.e. this bounds the sine of the angle between the edges.
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// A plane `a·x + b·y + c·z + d = 0` with unit normal `(a, b, c)`.
///
/// Planes are value types: two planes with equal coefficients are the same
/// plane. The normal is unit length for every constructed plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f64>,
    d: f64,
}

impl Plane {
    /// Create a plane from its four coefficients.
    ///
    /// The coefficients are scaled so that `(a, b, c)` is unit length.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroNormal`] if `(a, b, c)` is zero or any
    /// coefficient is not finite.
    ///
    /// # Example
    ///
    /// ```
    /// use facade_types::Plane;
    ///
    /// let plane = Plane::from_coefficients(0.0, 0.0, 2.0, -4.0).unwrap();
    /// assert_eq!(plane.coefficients(), [0.0, 0.0, 1.0, -2.0]);
    /// ```
    pub fn from_coefficients(a: f64, b: f64, c: f64, d: f64) -> GeometryResult<Self> {
        let normal = Vector3::new(a, b, c);
        let norm = normal.norm();
        if !norm.is_finite() || !d.is_finite() || norm < f64::EPSILON {
            return Err(GeometryError::ZeroNormal);
        }
        Ok(Self {
            normal: normal / norm,
            d: d / norm,
        })
    }

    /// Create a plane from three non-collinear points.
    ///
    /// The normal is `(p0 - p1) × (p0 - p2)`, normalized, and `d = -normal · p0`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateSample`] if the points are collinear
    /// or coincident.
    pub fn from_points(
        p0: &Point3<f64>,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
    ) -> GeometryResult<Self> {
        let va = p0 - p1;
        let vb = p0 - p2;
        let raw = cross(&va, &vb);
        let length = raw.norm();

        let scale = va.norm() * vb.norm();
        if !length.is_finite() || length <= DEGENERATE_TOLERANCE * scale {
            return Err(GeometryError::DegenerateSample {
                normal_length: length,
            });
        }

        let normal = raw / length;
        Ok(Self {
            normal,
            d: -dot(&normal, &p0.coords),
        })
    }

    /// The unit normal `(a, b, c)`.
    #[must_use]
    pub const fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    /// The coefficients as `[a, b, c, d]`.
    #[must_use]
    pub fn coefficients(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }

    /// Signed distance; positive on the side the normal points to.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        let denom = self.normal.norm();
        (dot(&self.normal, &point.coords) + self.d) / denom
    }

    /// Absolute distance from `point` to the plane.
    #[must_use]
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        point_plane_distance(point, self)
    }

    /// Whether `point` lies strictly closer than `threshold` to the plane.
    #[must_use]
    pub fn is_inlier(&self, point: &Point3<f64>, threshold: f64) -> bool {
        self.distance(point) < threshold
    }

    /// Whether the plane is upright with respect to `up`.
    ///
    /// A plane is upright when its normal is nearly perpendicular to the up
    /// axis: `|normal · up| < tolerance`.
    #[must_use]
    pub fn is_upright(&self, up: UpAxis, tolerance: f64) -> bool {
        dot(&self.normal, &up.vector()).abs() < tolerance
    }
}

impl std::fmt::Display for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.6}, {:.6}, {:.6}, {:.6}]",
            self.normal.x, self.normal.y, self.normal.z, self.d
        )
    }
}

/// Build a plane through three points.
///
/// See [`Plane::from_points`].
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateSample`] if the points are collinear
/// or coincident.
pub fn plane_from_points(
    p0: Point3<f64>,
    p1: Point3<f64>,
    p2: Point3<f64>,
) -> GeometryResult<Plane> {
    Plane::from_points(&p0, &p1, &p2)
}

/// Distance from a point to a plane.
///
/// Computes `|a·x + b·y + c·z + d| / sqrt(a² + b² + c²)`. The denominator is
/// 1 for every constructed [`Plane`], but it is evaluated anyway.
#[must_use]
pub fn point_plane_distance(point: &Point3<f64>, plane: &Plane) -> f64 {
    let [a, b, c, d] = plane.coefficients();
    let numerator = (a * point.x + b * point.y + c * point.z + d).abs();
    let denom = (a * a + b * b + c * c).sqrt();
    numerator / denom
}
