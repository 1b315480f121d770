//! Point cloud data structures.

use nalgebra::Point3;

/// A point in a point cloud.
///
/// Each point has a 3D position plus any number of trailing scalar
/// attributes (intensity, return number, ...). Attributes are carried
/// through every operation unchanged and never take part in geometry.
///
/// # Example
///
/// ```
/// use facade_types::{CloudPoint, Point3};
///
/// let p = CloudPoint::with_attributes(Point3::new(1.0, 2.0, 3.0), vec![106.0]);
/// assert_eq!(p.field_count(), 4);
/// assert_eq!(p.attributes, vec![106.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CloudPoint {
    /// The 3D position of the point.
    pub position: Point3<f64>,

    /// Trailing scalar fields, in file order.
    pub attributes: Vec<f64>,
}

impl CloudPoint {
    /// Creates a new point with no attributes.
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            attributes: Vec::new(),
        }
    }

    /// Creates a point from x, y, z coordinates.
    #[must_use]
    pub const fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Creates a point with trailing attributes.
    #[must_use]
    pub const fn with_attributes(position: Point3<f64>, attributes: Vec<f64>) -> Self {
        Self {
            position,
            attributes,
        }
    }

    /// Builds a point from a row of numeric fields.
    ///
    /// The first three values are x, y, z; the rest become attributes.
    /// Returns `None` if fewer than three values are given.
    #[must_use]
    pub fn from_fields(fields: &[f64]) -> Option<Self> {
        match fields {
            [x, y, z, rest @ ..] => Some(Self::with_attributes(
                Point3::new(*x, *y, *z),
                rest.to_vec(),
            )),
            _ => None,
        }
    }

    /// Number of numeric fields: three coordinates plus the attributes.
    #[must_use]
    pub fn field_count(&self) -> usize {
        3 + self.attributes.len()
    }

    /// All numeric fields in file order.
    pub fn fields(&self) -> impl Iterator<Item = f64> + '_ {
        [self.position.x, self.position.y, self.position.z]
            .into_iter()
            .chain(self.attributes.iter().copied())
    }
}

/// An ordered collection of [`CloudPoint`]s.
///
/// Order carries no geometric meaning, but every operation in this workspace
/// preserves it so results are reproducible row for row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    /// The points, in input order.
    pub points: Vec<CloudPoint>,
}

impl PointCloud {
    /// Creates an empty point cloud.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates an empty point cloud with room for `capacity` points.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Creates a point cloud from bare positions.
    ///
    /// # Example
    ///
    /// ```
    /// use facade_types::{PointCloud, Point3};
    ///
    /// let cloud = PointCloud::from_positions(&[
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    /// ]);
    /// assert_eq!(cloud.len(), 2);
    /// ```
    #[must_use]
    pub fn from_positions(positions: &[Point3<f64>]) -> Self {
        Self {
            points: positions.iter().copied().map(CloudPoint::new).collect(),
        }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the cloud holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends a point.
    pub fn push(&mut self, point: CloudPoint) {
        self.points.push(point);
    }

    /// Iterates over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, CloudPoint> {
        self.points.iter()
    }

    /// Copies out the positions.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Splits the cloud by a per-point mask into `(kept, rejected)`.
    ///
    /// Both halves keep input order. Points without a mask entry are rejected.
    #[must_use]
    pub fn partition(self, mask: &[bool]) -> (Self, Self) {
        let mut kept = Vec::new();
        let mut rejected = Vec::new();
        for (i, point) in self.points.into_iter().enumerate() {
            if mask.get(i).copied().unwrap_or(false) {
                kept.push(point);
            } else {
                rejected.push(point);
            }
        }
        (Self { points: kept }, Self { points: rejected })
    }
}

impl FromIterator<CloudPoint> for PointCloud {
    fn from_iter<I: IntoIterator<Item = CloudPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PointCloud {
    type Item = CloudPoint;
    type IntoIter = std::vec::IntoIter<CloudPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a CloudPoint;
    type IntoIter = std::slice::Iter<'a, CloudPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
