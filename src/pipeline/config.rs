//! Configuration file loading for the preprocessing pipeline.
//!
//! A pipeline configuration is a JSON document with one optional section per
//! stage. Missing sections and fields fall back to the reference defaults.
//!
//! ```json
//! {
//!   "extractor": { "threshold": 40, "padding": 4 },
//!   "normalizer": { "degenerate_policy": { "mode": "epsilon", "epsilon": 1e-6 } },
//!   "parallel": { "max_threads": 4 }
//! }
//! ```

use scan_cae_core::core::{ConfigError, ConfigValidator, ParallelPolicy, ScanError, ScanResult};
use scan_cae_core::processors::{IntensityNormalizerConfig, RegionExtractorConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a [`ScanPipeline`](super::ScanPipeline).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Region extraction settings.
    #[serde(default)]
    pub extractor: RegionExtractorConfig,
    /// Normalization settings.
    #[serde(default)]
    pub normalizer: IntensityNormalizerConfig,
    /// Batch parallelism settings.
    #[serde(default)]
    pub parallel: ParallelPolicy,
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use scan_cae::pipeline::PipelineConfig;
    /// use std::path::Path;
    ///
    /// let config = PipelineConfig::from_json_file(Path::new("pipeline.json"))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_json_file(path: &Path) -> ScanResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScanError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json_str(content: &str) -> ScanResult<Self> {
        let config: Self = serde_json::from_str(content).map_err(|e| ConfigError::ParseFailed {
            message: format!("Failed to parse JSON config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> ScanResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ScanError::ConfigError {
            message: format!("Failed to serialize config: {e}"),
        })
    }
}

impl ConfigValidator for PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.extractor.validate()?;
        self.normalizer.validate()?;
        self.parallel.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
