//! The end-to-end extraction pipeline.

use std::path::Path;

use facade_detect::{
    extract_upright_plane, filter_frontal_plane, DensityFilterResult, Extraction,
};
use facade_io::{load_pcd, save_pcd};
use facade_types::{Plane, PointCloud};
use rand::Rng;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::FacadeResult;

/// Output of [`run_pipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// The plane search, including every round.
    pub extraction: Extraction,
    /// The density cleanup of the accepted plane's inliers.
    pub density: DensityFilterResult,
}

impl PipelineResult {
    /// The accepted upright plane.
    #[must_use]
    pub const fn plane(&self) -> &Plane {
        &self.extraction.plane
    }

    /// The final points: inliers of the plane that survived cleanup.
    #[must_use]
    pub const fn cloud(&self) -> &PointCloud {
        &self.density.cloud
    }
}

impl std::fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.extraction)?;
        write!(f, "{}", self.density)
    }
}

/// Find the dominant upright plane and clean up its inliers.
///
/// Runs [`extract_upright_plane`] followed by [`filter_frontal_plane`] using
/// the same up axis for both.
///
/// # Errors
///
/// Returns [`FacadeError::Detect`](crate::FacadeError::Detect) if the
/// configuration is invalid, the cloud is too small, or no upright plane
/// is found.
///
/// # Example
///
/// ```
/// use facade::{run_pipeline, PipelineConfig};
/// use facade_types::{CloudPoint, PointCloud};
///
/// let cloud: PointCloud = (0..400)
///     .map(|i| CloudPoint::from_coords(0.0, f64::from(i / 20), f64::from(i % 20)))
///     .collect();
///
/// let config = PipelineConfig::new().with_seed(1);
/// let result = run_pipeline(&cloud, &config, &mut config.rng()).unwrap();
/// assert!(result.plane().normal().x.abs() > 0.99);
/// ```
pub fn run_pipeline<R: Rng + ?Sized>(
    cloud: &PointCloud,
    config: &PipelineConfig,
    rng: &mut R,
) -> FacadeResult<PipelineResult> {
    config.validate()?;

    let extraction = extract_upright_plane(cloud, &config.extraction, rng)?;
    let density = filter_frontal_plane(
        &extraction.inliers,
        &extraction.plane,
        config.extraction.up_axis,
        &config.density,
    )?;

    info!(
        input = cloud.len(),
        inliers = extraction.inliers.len(),
        output = density.cloud.len(),
        "Pipeline complete"
    );

    Ok(PipelineResult {
        extraction,
        density,
    })
}

/// Run the pipeline on the PCD file `input` and write the result to `output`.
///
/// The output keeps the input's header lines, with `POINTS` updated to the
/// number of points written. Nothing is written if the pipeline fails.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the pipeline fails, or the
/// output cannot be written.
pub fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &PipelineConfig,
) -> FacadeResult<PipelineResult> {
    let pcd = load_pcd(input)?;
    let mut rng = config.rng();
    let result = run_pipeline(&pcd.cloud, config, &mut rng)?;
    save_pcd(output, &pcd.header, result.cloud())?;
    Ok(result)
}
