//! Density cleanup for an extracted frontal plane.
//!
//! The inliers of a facade plane usually include sparse clutter that happens
//! to lie within the inlier band: a lamp post, a passer-by, a stray reflection.
//! This module projects the inliers onto two in-plane axes, counts them on a
//! coarse grid, and keeps only the points whose cell holds a meaningful share
//! of the total.

use facade_types::{cross, dot, Plane, PointCloud, UpAxis, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DetectError, DetectResult};

/// Parameters for [`filter_frontal_plane`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct DensityParams {
    /// Number of bins along the in-plane horizontal axis. Default: 10.
    pub lr_bins: usize,

    /// Number of bins along the up axis. Default: 10.
    pub up_bins: usize,

    /// A cell is kept when its share of all points strictly exceeds this.
    /// Default: 0.012.
    pub min_cell_fraction: f64,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self {
            lr_bins: 10,
            up_bins: 10,
            min_cell_fraction: 0.012,
        }
    }
}

impl DensityParams {
    /// Create density parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid resolution.
    #[must_use]
    pub const fn with_bins(mut self, lr_bins: usize, up_bins: usize) -> Self {
        self.lr_bins = lr_bins;
        self.up_bins = up_bins;
        self
    }

    /// Set the minimum cell fraction.
    #[must_use]
    pub const fn with_min_cell_fraction(mut self, fraction: f64) -> Self {
        self.min_cell_fraction = fraction;
        self
    }

    /// Check that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidParameter`] if either bin count is zero
    /// or the fraction is outside `[0, 1)`.
    pub fn validate(&self) -> DetectResult<()> {
        if self.lr_bins == 0 || self.up_bins == 0 {
            return Err(DetectError::invalid_parameter(format!(
                "bin counts must be positive, got {}x{}",
                self.lr_bins, self.up_bins
            )));
        }
        if !(0.0..1.0).contains(&self.min_cell_fraction) {
            return Err(DetectError::invalid_parameter(format!(
                "min_cell_fraction must be in [0, 1), got {}",
                self.min_cell_fraction
            )));
        }
        Ok(())
    }
}

/// Point counts on the in-plane grid.
///
/// Rows run along the horizontal in-plane axis, columns along the up axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    lr_bins: usize,
    up_bins: usize,
    counts: Vec<usize>,
}

impl DensityGrid {
    fn new(lr_bins: usize, up_bins: usize) -> Self {
        Self {
            lr_bins,
            up_bins,
            counts: vec![0; lr_bins * up_bins],
        }
    }

    /// Bins along the horizontal axis.
    #[must_use]
    pub const fn lr_bins(&self) -> usize {
        self.lr_bins
    }

    /// Bins along the up axis.
    #[must_use]
    pub const fn up_bins(&self) -> usize {
        self.up_bins
    }

    /// Count in cell `(lr, up)`; zero when out of range.
    #[must_use]
    pub fn count(&self, lr: usize, up: usize) -> usize {
        if lr >= self.lr_bins || up >= self.up_bins {
            return 0;
        }
        self.counts[lr * self.up_bins + up]
    }

    /// Sum over all cells.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Whether cell `(lr, up)` passes the density threshold.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_dense(&self, lr: usize, up: usize, min_fraction: f64) -> bool {
        let total = self.total();
        total > 0 && self.count(lr, up) as f64 / total as f64 > min_fraction
    }

    /// One line per horizontal bin, `1` for a kept cell and `0` otherwise.
    #[must_use]
    pub fn occupancy_rows(&self, min_fraction: f64) -> Vec<String> {
        (0..self.lr_bins)
            .map(|lr| {
                (0..self.up_bins)
                    .map(|up| if self.is_dense(lr, up, min_fraction) { '1' } else { '0' })
                    .collect()
            })
            .collect()
    }

    fn increment(&mut self, lr: usize, up: usize) {
        self.counts[lr * self.up_bins + up] += 1;
    }
}

/// Result of [`filter_frontal_plane`].
#[derive(Debug, Clone, PartialEq)]
pub struct DensityFilterResult {
    /// Points in dense cells, in input order.
    pub cloud: PointCloud,
    /// Counts per cell over all input points.
    pub grid: DensityGrid,
    /// Number of input points.
    pub total: usize,
    /// Number of cells that passed the threshold.
    pub retained_cells: usize,
}

impl DensityFilterResult {
    /// Number of points dropped.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.total - self.cloud.len()
    }
}

impl std::fmt::Display for DensityFilterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Density filter kept {} of {} points ({} of {} cells)",
            self.cloud.len(),
            self.total,
            self.retained_cells,
            self.grid.lr_bins * self.grid.up_bins
        )
    }
}

/// Keep only the points of a plane that fall in densely populated cells.
///
/// The horizontal in-plane axis is `normal × up`. Each point is projected to
/// `(point · lr_axis, height)` and binned on a `lr_bins × up_bins` grid
/// spanning the projected extent. Bins are half-open except the last, which
/// also takes the maximum. When every point shares a coordinate, that axis
/// collapses to bin 0.
///
/// A point survives when its cell holds strictly more than
/// `min_cell_fraction` of all points. Output order follows input order.
///
/// # Errors
///
/// Returns [`DetectError::InvalidParameter`] if `params` is out of range.
///
/// # Example
///
/// ```
/// use facade_detect::{filter_frontal_plane, DensityParams};
/// use facade_types::{Plane, PointCloud, Point3, UpAxis};
///
/// let plane = Plane::from_coefficients(1.0, 0.0, 0.0, 0.0).unwrap();
/// let cloud = PointCloud::new();
/// let result = filter_frontal_plane(&cloud, &plane, UpAxis::Y, &DensityParams::default()).unwrap();
/// assert!(result.cloud.is_empty());
/// ```
pub fn filter_frontal_plane(
    inliers: &PointCloud,
    plane: &Plane,
    up: UpAxis,
    params: &DensityParams,
) -> DetectResult<DensityFilterResult> {
    params.validate()?;

    let mut grid = DensityGrid::new(params.lr_bins, params.up_bins);
    if inliers.is_empty() {
        return Ok(DensityFilterResult {
            cloud: PointCloud::new(),
            grid,
            total: 0,
            retained_cells: 0,
        });
    }

    let lr_axis: Vector3<f64> = cross(plane.normal(), &up.vector());
    let projected: Vec<(f64, f64)> = inliers
        .iter()
        .map(|p| (dot(&p.position.coords, &lr_axis), up.height_of(&p.position)))
        .collect();

    let lr_binner = Binner::spanning(projected.iter().map(|&(lr, _)| lr), params.lr_bins);
    let up_binner = Binner::spanning(projected.iter().map(|&(_, h)| h), params.up_bins);

    let cells: Vec<(usize, usize)> = projected
        .iter()
        .map(|&(lr, h)| (lr_binner.bin(lr), up_binner.bin(h)))
        .collect();
    for &(lr, up_bin) in &cells {
        grid.increment(lr, up_bin);
    }

    let total = inliers.len();
    let threshold = params.min_cell_fraction;

    let rows = grid.occupancy_rows(threshold);
    for row in &rows {
        debug!(target: "facade_detect::density", "{row}");
    }
    let retained_cells = rows
        .iter()
        .map(|row| row.chars().filter(|&c| c == '1').count())
        .sum();

    let cloud = inliers
        .iter()
        .zip(&cells)
        .filter(|(_, cell)| grid.is_dense(cell.0, cell.1, threshold))
        .map(|(p, _)| p.clone())
        .collect::<PointCloud>();

    debug!(
        kept = cloud.len(),
        total,
        retained_cells,
        "Density filter complete"
    );

    Ok(DensityFilterResult {
        cloud,
        grid,
        total,
        retained_cells,
    })
}

/// Maps a coordinate to one of `bins` equal-width bins over `[min, max]`.
struct Binner {
    min: f64,
    width: f64,
    bins: usize,
}

impl Binner {
    fn spanning(values: impl Iterator<Item = f64>, bins: usize) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        #[allow(clippy::cast_precision_loss)]
        let width = (max - min) / bins as f64;
        Self { min, width, bins }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn bin(&self, value: f64) -> usize {
        if self.width <= 0.0 || !self.width.is_finite() {
            return 0;
        }
        let index = ((value - self.min) / self.width).floor() as usize;
        index.min(self.bins - 1)
    }
}
