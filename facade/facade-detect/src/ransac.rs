//! RANSAC plane fitting.
//!
//! Fits a plane to noisy point data by repeatedly sampling three points,
//! building the plane through them, and keeping the hypothesis that the
//! largest number of points agree with.
//!
//! This is plain RANSAC: the iteration count is fixed and there is no early
//! termination or adaptive stopping. Hypotheses are drawn sequentially from
//! the caller's random source and then scored in parallel, so a seeded
//! generator gives the same plane no matter how many threads are available.

use facade_types::{Plane, Point3};
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DetectError, DetectResult};

/// Minimum number of points needed to define a plane.
pub const MIN_SAMPLE_SIZE: usize = 3;

/// Configuration for RANSAC plane fitting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct RansacConfig {
    /// Number of hypotheses to score. Default: 500.
    pub max_iterations: usize,

    /// Points strictly closer than this to a hypothesis count as inliers.
    /// Same unit as the point coordinates. Default: 0.1.
    pub inlier_threshold: f64,

    /// How many times a degenerate (collinear) triple is redrawn within one
    /// iteration before that iteration is given up. Default: 100.
    pub max_degenerate_redraws: usize,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            inlier_threshold: 0.1,
            max_degenerate_redraws: 100,
        }
    }
}

impl RansacConfig {
    /// Create a new RANSAC configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the inlier distance threshold.
    #[must_use]
    pub const fn with_inlier_threshold(mut self, threshold: f64) -> Self {
        self.inlier_threshold = threshold;
        self
    }

    /// Set the per-iteration redraw budget for degenerate triples.
    #[must_use]
    pub const fn with_max_degenerate_redraws(mut self, redraws: usize) -> Self {
        self.max_degenerate_redraws = redraws;
        self
    }

    /// Check that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidParameter`] if `max_iterations` is zero
    /// or `inlier_threshold` is not a positive finite number.
    pub fn validate(&self) -> DetectResult<()> {
        if self.max_iterations == 0 {
            return Err(DetectError::invalid_parameter(
                "max_iterations must be at least 1",
            ));
        }
        if !(self.inlier_threshold.is_finite() && self.inlier_threshold > 0.0) {
            return Err(DetectError::invalid_parameter(format!(
                "inlier_threshold must be positive, got {}",
                self.inlier_threshold
            )));
        }
        Ok(())
    }
}

/// Result of RANSAC plane fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneFit {
    /// The best plane found.
    pub plane: Plane,
    /// Number of sample points within the inlier threshold of `plane`.
    pub inlier_count: usize,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Number of degenerate triples that had to be redrawn.
    pub degenerate_draws: usize,
}

/// Fit a plane to a set of points using RANSAC.
///
/// Each iteration draws three distinct points uniformly at random, builds
/// the plane through them, and counts the points closer than
/// `config.inlier_threshold`. The hypothesis with the most inliers wins;
/// on a tie the earliest iteration wins.
///
/// A collinear or coincident triple does not use up an iteration: it is
/// redrawn up to `config.max_degenerate_redraws` times, after which the
/// iteration contributes no hypothesis.
///
/// # Arguments
///
/// * `points` - The sample to fit
/// * `config` - RANSAC configuration parameters
/// * `rng` - Random source for drawing triples
///
/// # Errors
///
/// Returns an error if:
/// - There are fewer than 3 points
/// - The configuration is invalid
/// - Every iteration ran out of redraws on degenerate triples
///
/// # Example
///
/// ```
/// use facade_detect::{fit_plane, RansacConfig};
/// use facade_types::Point3;
/// use rand::SeedableRng;
///
/// let points: Vec<_> = (0..10)
///     .flat_map(|i| (0..10).map(move |j| Point3::new(f64::from(i), f64::from(j), 0.0)))
///     .collect();
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
/// let fit = fit_plane(&points, &RansacConfig::default(), &mut rng).unwrap();
///
/// assert_eq!(fit.inlier_count, 100);
/// assert!(fit.plane.normal().z.abs() > 0.99);
/// ```
pub fn fit_plane<R: Rng + ?Sized>(
    points: &[Point3<f64>],
    config: &RansacConfig,
    rng: &mut R,
) -> DetectResult<PlaneFit> {
    let n = points.len();
    if n < MIN_SAMPLE_SIZE {
        return Err(DetectError::InsufficientPoints {
            required: MIN_SAMPLE_SIZE,
            actual: n,
        });
    }
    config.validate()?;

    // Draw every hypothesis up front so the random stream alone decides them.
    let mut degenerate_draws = 0;
    let candidates: Vec<Option<Plane>> = (0..config.max_iterations)
        .map(|_| draw_candidate(points, config.max_degenerate_redraws, rng, &mut degenerate_draws))
        .collect();

    let threshold = config.inlier_threshold;
    let scores: Vec<usize> = candidates
        .par_iter()
        .map(|candidate| {
            candidate
                .as_ref()
                .map_or(0, |plane| count_inliers(points, plane, threshold))
        })
        .collect();

    let mut best: Option<(Plane, usize)> = None;
    for (candidate, &score) in candidates.iter().zip(&scores) {
        let Some(plane) = candidate else {
            continue;
        };
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((*plane, score));
        }
    }

    let Some((plane, inlier_count)) = best else {
        return Err(DetectError::DegenerateSample {
            iterations: config.max_iterations,
        });
    };

    debug!(
        sample = n,
        inliers = inlier_count,
        degenerate_draws,
        plane = %plane,
        "RANSAC fit complete"
    );

    Ok(PlaneFit {
        plane,
        inlier_count,
        iterations: config.max_iterations,
        degenerate_draws,
    })
}

/// Count the points strictly closer than `threshold` to `plane`.
#[must_use]
pub fn count_inliers(points: &[Point3<f64>], plane: &Plane, threshold: f64) -> usize {
    points
        .iter()
        .filter(|p| plane.is_inlier(p, threshold))
        .count()
}

/// Draw three distinct points and build the plane through them, redrawing
/// degenerate triples up to `max_redraws` times.
fn draw_candidate<R: Rng + ?Sized>(
    points: &[Point3<f64>],
    max_redraws: usize,
    rng: &mut R,
    degenerate_draws: &mut usize,
) -> Option<Plane> {
    for _ in 0..=max_redraws {
        let triple = rand::seq::index::sample(rng, points.len(), MIN_SAMPLE_SIZE);
        let p0 = &points[triple.index(0)];
        let p1 = &points[triple.index(1)];
        let p2 = &points[triple.index(2)];
        match Plane::from_points(p0, p1, p2) {
            Ok(plane) => return Some(plane),
            Err(_) => *degenerate_draws += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use facade_types::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn default_fit() -> PlaneFit {
        PlaneFit {
            plane: Plane::from_coefficients(0.0, 0.0, 1.0, 0.0)
                .unwrap_or_else(|_| unreachable!()),
            inlier_count: 0,
            iterations: 0,
            degenerate_draws: 0,
        }
    }

    /// 1000 points on x=0 plus 250 uniform points in the unit cube.
    fn wall_with_noise(rng: &mut StdRng) -> Vec<Point3<f64>> {
        let mut points: Vec<_> = (0..1000)
            .map(|_| Point3::new(0.0, rng.gen::<f64>(), rng.gen::<f64>()))
            .collect();
        points.extend(
            (0..250).map(|_| Point3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>())),
        );
        points
    }

    #[test]
    fn converges_on_dominant_plane() {
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let points = wall_with_noise(&mut rng);

            let fit = fit_plane(&points, &RansacConfig::default(), &mut rng)
                .unwrap_or_else(|_| default_fit());

            let alignment = fit.plane.normal().dot(&Vector3::x()).abs();
            assert!(alignment > 0.95, "RANSAC did not converge (seed {seed})");
            assert!(fit.inlier_count >= 1000);
        }
    }

    #[test]
    fn insufficient_points() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(1);
        let result = fit_plane(&points, &RansacConfig::default(), &mut rng);
        assert_eq!(
            result,
            Err(DetectError::InsufficientPoints {
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn all_collinear_is_degenerate() {
        let points: Vec<_> = (0..20)
            .map(|i| Point3::new(f64::from(i), f64::from(i) * 2.0, 0.0))
            .collect();
        let config = RansacConfig::new()
            .with_max_iterations(10)
            .with_max_degenerate_redraws(5);
        let mut rng = StdRng::seed_from_u64(3);

        let result = fit_plane(&points, &config, &mut rng);
        assert_eq!(result, Err(DetectError::DegenerateSample { iterations: 10 }));
    }

    #[test]
    fn degenerate_draws_do_not_consume_iterations() {
        // Four collinear points plus one off the line: many triples are degenerate.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let config = RansacConfig::new().with_max_iterations(50);
        let mut rng = StdRng::seed_from_u64(11);

        let fit = fit_plane(&points, &config, &mut rng).unwrap_or_else(|_| default_fit());
        assert_eq!(fit.iterations, 50);
        assert!(fit.degenerate_draws > 0);
        assert_eq!(fit.inlier_count, 5);
        assert_relative_eq!(fit.plane.normal().z.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ties_keep_earliest_hypothesis() {
        // With exactly three points every hypothesis scores 3, so the first wins.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 1.0),
            Point3::new(0.0, 3.0, 2.0),
        ];
        let seed = 99;

        let mut replay = StdRng::seed_from_u64(seed);
        let mut unused = 0;
        let first = draw_candidate(&points, 100, &mut replay, &mut unused);

        let mut rng = StdRng::seed_from_u64(seed);
        let fit = fit_plane(&points, &RansacConfig::default(), &mut rng)
            .unwrap_or_else(|_| default_fit());

        assert_eq!(Some(fit.plane), first);
        assert_eq!(fit.inlier_count, 3);
    }

    #[test]
    fn reproducible_with_seed() {
        let mut gen = StdRng::seed_from_u64(5);
        let points = wall_with_noise(&mut gen);

        let mut rng1 = StdRng::seed_from_u64(12345);
        let mut rng2 = StdRng::seed_from_u64(12345);
        let r1 = fit_plane(&points, &RansacConfig::default(), &mut rng1);
        let r2 = fit_plane(&points, &RansacConfig::default(), &mut rng2);

        assert!(r1.is_ok());
        assert_eq!(r1, r2);
    }

    #[test]
    fn config_builder() {
        let config = RansacConfig::new()
            .with_max_iterations(200)
            .with_inlier_threshold(0.05)
            .with_max_degenerate_redraws(7);

        assert_eq!(config.max_iterations, 200);
        assert_relative_eq!(config.inlier_threshold, 0.05);
        assert_eq!(config.max_degenerate_redraws, 7);
    }

    #[test]
    fn invalid_config_rejected() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut rng = StdRng::seed_from_u64(0);

        let zero_iterations = RansacConfig::new().with_max_iterations(0);
        assert!(matches!(
            fit_plane(&points, &zero_iterations, &mut rng),
            Err(DetectError::InvalidParameter { .. })
        ));

        let bad_threshold = RansacConfig::new().with_inlier_threshold(-1.0);
        assert!(matches!(
            fit_plane(&points, &bad_threshold, &mut rng),
            Err(DetectError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn count_inliers_uses_strict_threshold() {
        let plane = Plane::from_coefficients(0.0, 0.0, 1.0, 0.0).unwrap_or_else(|_| unreachable!());
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.05),
            Point3::new(1.0, 1.0, 0.5),
        ];
        assert_eq!(count_inliers(&points, &plane, 0.1), 2);
    }
}
