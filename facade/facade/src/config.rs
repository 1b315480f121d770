//! Pipeline configuration.
//!
//! Every field has a default, so a TOML file only needs the values it wants
//! to change:
//!
//! ```toml
//! seed = 42
//!
//! [extraction]
//! up_axis = "z"
//! upright_tolerance = 0.1
//!
//! [extraction.ransac]
//! inlier_threshold = 0.05
//!
//! [density]
//! min_cell_fraction = 0.01
//! ```

use std::fs;
use std::path::Path;

use facade_detect::{DensityParams, ExtractionConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FacadeResult};

/// Configuration for a full extraction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Seed for the random source. `None` seeds from system entropy.
    pub seed: Option<u64>,

    /// Plane search settings, including the per-round RANSAC settings.
    pub extraction: ExtractionConfig,

    /// Density cleanup settings.
    pub density: DensityParams,
}

impl PipelineConfig {
    /// Create a configuration with default values and no fixed seed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use facade::PipelineConfig;
    ///
    /// let config = PipelineConfig::from_file("facade.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on invalid TOML or unknown keys.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Fix the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the extraction settings.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }

    /// Set the density cleanup settings.
    #[must_use]
    pub fn with_density(mut self, density: DensityParams) -> Self {
        self.density = density;
        self
    }

    /// Check every nested setting.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range value as a detection error.
    pub fn validate(&self) -> FacadeResult<()> {
        self.extraction.validate()?;
        self.density.validate()?;
        Ok(())
    }

    /// A random source seeded from `seed`, or from entropy when unset.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        self.seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }
}
