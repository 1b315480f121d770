//! Upright plane extraction by iterative peeling.
//!
//! Each round fits a plane to a random subsample of the points that are
//! still unclaimed, classifies every remaining point against it, and then
//! either accepts the plane (if it is upright) or removes its inliers and
//! tries again. Large horizontal structures such as the ground are peeled
//! off first so that the next dominant structure can surface.

use facade_types::{Plane, Point3, PointCloud, UpAxis};
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DetectError, DetectResult};
use crate::ransac::{fit_plane, RansacConfig, MIN_SAMPLE_SIZE};

/// Parameters for [`extract_upright_plane`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ExtractionConfig {
    /// Points drawn (without replacement) from the remaining cloud to fit
    /// each round's plane. Default: 5000.
    pub subsample_size: usize,

    /// A plane is upright when `|normal · up| < upright_tolerance`.
    /// Default: 0.15.
    pub upright_tolerance: f64,

    /// Upper bound on the number of rounds. Default: 100.
    pub max_rounds: usize,

    /// Which world axis is up. Default: Y.
    pub up_axis: UpAxis,

    /// The search stops once fewer than this many points remain. Default: 3.
    pub min_points: usize,

    /// Settings for each round's plane fit.
    pub ransac: RansacConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            subsample_size: 5000,
            upright_tolerance: 0.15,
            max_rounds: 100,
            up_axis: UpAxis::default(),
            min_points: MIN_SAMPLE_SIZE,
            ransac: RansacConfig::default(),
        }
    }
}

impl ExtractionConfig {
    /// Create a new extraction configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subsample size.
    #[must_use]
    pub const fn with_subsample_size(mut self, size: usize) -> Self {
        self.subsample_size = size;
        self
    }

    /// Set the upright tolerance.
    #[must_use]
    pub const fn with_upright_tolerance(mut self, tolerance: f64) -> Self {
        self.upright_tolerance = tolerance;
        self
    }

    /// Set the maximum number of rounds.
    #[must_use]
    pub const fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Set the up axis.
    #[must_use]
    pub const fn with_up_axis(mut self, up: UpAxis) -> Self {
        self.up_axis = up;
        self
    }

    /// Set the minimum number of remaining points.
    #[must_use]
    pub const fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    /// Set the per-round RANSAC configuration.
    #[must_use]
    pub fn with_ransac(mut self, ransac: RansacConfig) -> Self {
        self.ransac = ransac;
        self
    }

    /// Check that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidParameter`] describing the first value
    /// that is out of range.
    pub fn validate(&self) -> DetectResult<()> {
        if self.subsample_size < MIN_SAMPLE_SIZE {
            return Err(DetectError::invalid_parameter(format!(
                "subsample_size must be at least {MIN_SAMPLE_SIZE}, got {}",
                self.subsample_size
            )));
        }
        if self.min_points < MIN_SAMPLE_SIZE {
            return Err(DetectError::invalid_parameter(format!(
                "min_points must be at least {MIN_SAMPLE_SIZE}, got {}",
                self.min_points
            )));
        }
        if self.max_rounds == 0 {
            return Err(DetectError::invalid_parameter("max_rounds must be at least 1"));
        }
        if !(self.upright_tolerance.is_finite() && self.upright_tolerance > 0.0) {
            return Err(DetectError::invalid_parameter(format!(
                "upright_tolerance must be positive, got {}",
                self.upright_tolerance
            )));
        }
        self.ransac.validate()
    }
}

/// What happened in one round of the search.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    /// 1-based round number.
    pub round: usize,
    /// Plane fitted this round.
    pub plane: Plane,
    /// Remaining points classified as inliers of `plane`.
    pub inlier_count: usize,
    /// Remaining points when the round started.
    pub remaining_before: usize,
    /// Remaining points once this round's inliers were taken out.
    pub remaining_after: usize,
    /// Whether `plane` passed the upright test.
    pub upright: bool,
}

/// A successful extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The accepted upright plane.
    pub plane: Plane,
    /// Every remaining point within the inlier threshold of `plane`, in
    /// input order with attributes intact.
    pub inliers: PointCloud,
    /// One entry per round; the last one is the accepted round.
    pub rounds: Vec<RoundSummary>,
}

impl Extraction {
    /// Number of rounds it took to find the plane.
    #[must_use]
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Points that were peeled off as non-upright planes before acceptance.
    #[must_use]
    pub fn peeled_count(&self) -> usize {
        self.rounds
            .iter()
            .filter(|r| !r.upright)
            .map(|r| r.inlier_count)
            .sum()
    }
}

impl std::fmt::Display for Extraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Upright plane {} with {} inliers after {} rounds ({} points peeled)",
            self.plane,
            self.inliers.len(),
            self.round_count(),
            self.peeled_count()
        )
    }
}

/// Find the dominant upright plane in a point cloud.
///
/// Runs up to `config.max_rounds` rounds. In each round:
///
/// 1. Draw `min(subsample_size, remaining)` distinct points at random.
/// 2. Fit a plane to them with [`fit_plane`].
/// 3. Classify every remaining point against that plane.
/// 4. If the plane is upright, return it with its inliers. Otherwise drop
///    the inliers from the remaining set and start the next round.
///
/// The input cloud is never modified; the remaining set is a working copy.
///
/// # Errors
///
/// - [`DetectError::InvalidParameter`] if `config` is out of range
/// - [`DetectError::InsufficientPoints`] if the cloud starts with fewer than
///   `config.min_points` points
/// - [`DetectError::NoUprightPlane`] if the rounds run out, the remaining
///   set drops below `config.min_points`, or the remaining points no longer
///   span a plane
pub fn extract_upright_plane<R: Rng + ?Sized>(
    cloud: &PointCloud,
    config: &ExtractionConfig,
    rng: &mut R,
) -> DetectResult<Extraction> {
    config.validate()?;

    if cloud.len() < config.min_points {
        return Err(DetectError::InsufficientPoints {
            required: config.min_points,
            actual: cloud.len(),
        });
    }

    info!(
        points = cloud.len(),
        subsample = config.subsample_size,
        up = %config.up_axis,
        "Searching for upright plane"
    );

    let threshold = config.ransac.inlier_threshold;
    let mut remaining = cloud.clone();
    let mut rounds = Vec::new();

    for round in 1..=config.max_rounds {
        let remaining_before = remaining.len();
        if remaining_before < config.min_points {
            warn!(
                rounds = round - 1,
                remaining = remaining_before,
                "Too few points left to continue"
            );
            return Err(DetectError::NoUprightPlane {
                rounds: round - 1,
                remaining: remaining_before,
            });
        }

        let sample = subsample(&remaining, config.subsample_size, rng);
        let fit = match fit_plane(&sample, &config.ransac, rng) {
            Ok(fit) => fit,
            Err(DetectError::DegenerateSample { iterations }) => {
                warn!(
                    round,
                    iterations,
                    remaining = remaining_before,
                    "Remaining points do not span a plane"
                );
                return Err(DetectError::NoUprightPlane {
                    rounds: round,
                    remaining: remaining_before,
                });
            }
            Err(e) => return Err(e),
        };

        let mask = classify(&remaining, &fit.plane, threshold);
        let upright = fit.plane.is_upright(config.up_axis, config.upright_tolerance);
        let (inliers, outliers) = remaining.partition(&mask);

        let summary = RoundSummary {
            round,
            plane: fit.plane,
            inlier_count: inliers.len(),
            remaining_before,
            remaining_after: outliers.len(),
            upright,
        };
        debug!(
            round,
            plane = %summary.plane,
            inliers = summary.inlier_count,
            remaining = summary.remaining_after,
            upright,
            "Round complete"
        );
        rounds.push(summary);

        if upright {
            info!(
                round,
                plane = %fit.plane,
                inliers = inliers.len(),
                "Accepted upright plane"
            );
            return Ok(Extraction {
                plane: fit.plane,
                inliers,
                rounds,
            });
        }

        remaining = outliers;
    }

    warn!(
        rounds = config.max_rounds,
        remaining = remaining.len(),
        "Round limit reached without an upright plane"
    );
    Err(DetectError::NoUprightPlane {
        rounds: config.max_rounds,
        remaining: remaining.len(),
    })
}

/// Draw up to `size` distinct positions from `cloud` uniformly at random.
fn subsample<R: Rng + ?Sized>(cloud: &PointCloud, size: usize, rng: &mut R) -> Vec<Point3<f64>> {
    let amount = size.min(cloud.len());
    rand::seq::index::sample(rng, cloud.len(), amount)
        .into_iter()
        .map(|i| cloud.points[i].position)
        .collect()
}

/// Inlier mask of `plane` over every point of `cloud`, in cloud order.
fn classify(cloud: &PointCloud, plane: &Plane, threshold: f64) -> Vec<bool> {
    cloud
        .points
        .par_iter()
        .map(|p| plane.is_inlier(&p.position, threshold))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use facade_types::CloudPoint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn default_extraction() -> Extraction {
        Extraction {
            plane: Plane::from_coefficients(0.0, 0.0, 1.0, 0.0).unwrap_or_else(|_| unreachable!()),
            inliers: PointCloud::new(),
            rounds: Vec::new(),
        }
    }

    /// 3000 ground points on y=0 and 1500 wall points on x=0 above y=0.5.
    fn ground_and_wall(seed: u64) -> PointCloud {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut cloud = PointCloud::with_capacity(4500);
        for _ in 0..3000 {
            cloud.push(CloudPoint::from_coords(
                rng.gen_range(-5.0..5.0),
                0.0,
                rng.gen_range(-5.0..5.0),
            ));
        }
        for i in 0..1500 {
            cloud.push(CloudPoint::with_attributes(
                Point3::new(0.0, rng.gen_range(0.5..5.0), rng.gen_range(-5.0..5.0)),
                vec![f64::from(i)],
            ));
        }
        cloud
    }

    fn ground_only(seed: u64) -> PointCloud {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..500)
            .map(|_| CloudPoint::from_coords(rng.gen_range(-5.0..5.0), 0.0, rng.gen_range(-5.0..5.0)))
            .collect()
    }

    #[test]
    fn ground_is_peeled_then_wall_accepted() {
        let cloud = ground_and_wall(1);
        let mut rng = StdRng::seed_from_u64(7);

        let extraction = extract_upright_plane(&cloud, &ExtractionConfig::default(), &mut rng)
            .unwrap_or_else(|_| default_extraction());

        assert_eq!(extraction.round_count(), 2);
        assert!(!extraction.rounds[0].upright);
        assert!(extraction.rounds[0].inlier_count >= 3000);
        assert!(extraction.rounds[1].upright);
        assert_eq!(extraction.inliers.len(), 1500);
        assert!(extraction.plane.normal().x.abs() > 0.99);
        // Attributes ride along in input order.
        assert_eq!(extraction.inliers.points[0].attributes, vec![0.0]);
        assert_eq!(extraction.inliers.points[1499].attributes, vec![1499.0]);
    }

    #[test]
    fn remaining_set_shrinks_monotonically() {
        let cloud = ground_and_wall(2);
        let mut rng = StdRng::seed_from_u64(3);

        let extraction = extract_upright_plane(&cloud, &ExtractionConfig::default(), &mut rng)
            .unwrap_or_else(|_| default_extraction());

        assert!(!extraction.rounds.is_empty());
        assert_eq!(extraction.rounds[0].remaining_before, cloud.len());
        for pair in extraction.rounds.windows(2) {
            assert_eq!(pair[0].remaining_after, pair[1].remaining_before);
        }
        for round in &extraction.rounds {
            assert_eq!(round.remaining_before - round.inlier_count, round.remaining_after);
            assert!(round.inlier_count > 0);
        }
    }

    #[test]
    fn input_cloud_is_untouched() {
        let cloud = ground_and_wall(4);
        let before = cloud.clone();
        let mut rng = StdRng::seed_from_u64(4);
        let _ = extract_upright_plane(&cloud, &ExtractionConfig::default(), &mut rng);
        assert_eq!(cloud, before);
    }

    #[test]
    fn reproducible_with_seed() {
        let cloud = ground_and_wall(5);
        let config = ExtractionConfig::default();

        let mut rng1 = StdRng::seed_from_u64(2024);
        let mut rng2 = StdRng::seed_from_u64(2024);
        let a = extract_upright_plane(&cloud, &config, &mut rng1);
        let b = extract_upright_plane(&cloud, &config, &mut rng2);

        assert!(a.is_ok());
        assert_eq!(a, b);
    }

    #[test]
    fn ground_only_exhausts_points() {
        let cloud = ground_only(6);
        let mut rng = StdRng::seed_from_u64(6);

        let result = extract_upright_plane(&cloud, &ExtractionConfig::default(), &mut rng);
        assert_eq!(
            result,
            Err(DetectError::NoUprightPlane {
                rounds: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn round_limit_reported() {
        let cloud = ground_and_wall(8);
        let config = ExtractionConfig::default().with_max_rounds(1);
        let mut rng = StdRng::seed_from_u64(8);

        let result = extract_upright_plane(&cloud, &config, &mut rng);
        assert_eq!(
            result,
            Err(DetectError::NoUprightPlane {
                rounds: 1,
                remaining: 1500
            })
        );
    }

    #[test]
    fn z_up_treats_ground_as_wall() {
        // Under a Z-up convention the y=0 ground is a vertical plane.
        let cloud = ground_and_wall(9);
        let config = ExtractionConfig::default().with_up_axis(UpAxis::Z);
        let mut rng = StdRng::seed_from_u64(9);

        let extraction =
            extract_upright_plane(&cloud, &config, &mut rng).unwrap_or_else(|_| default_extraction());

        assert_eq!(extraction.round_count(), 1);
        assert!(extraction.plane.normal().y.abs() > 0.99);
    }

    #[test]
    fn too_few_points() {
        let cloud = PointCloud::from_positions(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        let mut rng = StdRng::seed_from_u64(0);

        let result = extract_upright_plane(&cloud, &ExtractionConfig::default(), &mut rng);
        assert_eq!(
            result,
            Err(DetectError::InsufficientPoints {
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn collinear_remainder_stops_search() {
        let cloud = PointCloud::from_positions(
            &(0..10)
                .map(|i| Point3::new(0.0, f64::from(i), 0.0))
                .collect::<Vec<_>>(),
        );
        let config = ExtractionConfig::default().with_ransac(
            RansacConfig::default()
                .with_max_iterations(5)
                .with_max_degenerate_redraws(2),
        );
        let mut rng = StdRng::seed_from_u64(0);

        let result = extract_upright_plane(&cloud, &config, &mut rng);
        assert_eq!(
            result,
            Err(DetectError::NoUprightPlane {
                rounds: 1,
                remaining: 10
            })
        );
    }

    #[test]
    fn invalid_config_rejected() {
        let cloud = ground_only(10);
        let mut rng = StdRng::seed_from_u64(0);

        for config in [
            ExtractionConfig::default().with_subsample_size(2),
            ExtractionConfig::default().with_min_points(1),
            ExtractionConfig::default().with_max_rounds(0),
            ExtractionConfig::default().with_upright_tolerance(f64::NAN),
        ] {
            assert!(matches!(
                extract_upright_plane(&cloud, &config, &mut rng),
                Err(DetectError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn config_builder() {
        let config = ExtractionConfig::new()
            .with_subsample_size(1000)
            .with_upright_tolerance(0.05)
            .with_max_rounds(10)
            .with_up_axis(UpAxis::Z)
            .with_min_points(50);

        assert_eq!(config.subsample_size, 1000);
        assert_eq!(config.max_rounds, 10);
        assert_eq!(config.up_axis, UpAxis::Z);
        assert_eq!(config.min_points, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn display_summarizes_result() {
        let cloud = ground_and_wall(11);
        let mut rng = StdRng::seed_from_u64(11);
        let extraction = extract_upright_plane(&cloud, &ExtractionConfig::default(), &mut rng)
            .unwrap_or_else(|_| default_extraction());

        let text = extraction.to_string();
        assert!(text.contains("1500 inliers"));
        assert!(text.contains("2 rounds"));
    }
}
