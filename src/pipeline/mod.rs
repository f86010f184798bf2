//! The scan preprocessing pipeline.
//!
//! This module composes region extraction and intensity normalization into a
//! single per-scan transform, and provides the batch driver, run statistics
//! and JSON configuration loading.

mod batch;
mod config;
mod stats;

pub use batch::ScanOutcome;
pub use config::PipelineConfig;
pub use stats::PipelineStats;

use image::DynamicImage;
use scan_cae_core::core::{ParallelPolicy, ScanResult};
use scan_cae_core::processors::{
    IntensityNormalizer, NormalizedTensor, RegionCrop, RegionExtractor,
};
use scan_cae_core::utils::{load_image, load_image_from_bytes};
use std::path::Path;

/// A scan after region extraction and normalization.
#[derive(Debug, Clone)]
pub struct PreprocessedScan {
    /// The cropped region and where it was found.
    pub crop: RegionCrop,
    /// The model-ready `(1, 32, 32)` tensor.
    pub tensor: NormalizedTensor,
}

/// Region extraction followed by intensity normalization.
///
/// The pipeline holds no per-scan state, so one instance can be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct ScanPipeline {
    extractor: RegionExtractor,
    normalizer: IntensityNormalizer,
    parallel: ParallelPolicy,
}

impl ScanPipeline {
    /// Builds a pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::ConfigError` if any section is invalid.
    pub fn new(config: PipelineConfig) -> ScanResult<Self> {
        use scan_cae_core::core::ConfigValidator;

        config.parallel.validate()?;
        Ok(Self {
            extractor: RegionExtractor::new(config.extractor)?,
            normalizer: IntensityNormalizer::new(config.normalizer)?,
            parallel: config.parallel,
        })
    }

    /// The region extractor stage.
    pub fn extractor(&self) -> &RegionExtractor {
        &self.extractor
    }

    /// The normalization stage.
    pub fn normalizer(&self) -> &IntensityNormalizer {
        &self.normalizer
    }

    /// The batch parallelism settings.
    pub fn parallel_policy(&self) -> &ParallelPolicy {
        &self.parallel
    }

    /// Loads and preprocesses the scan at `path`.
    pub fn process(&self, path: &Path) -> ScanResult<PreprocessedScan> {
        let image = load_image(path)?;
        self.process_image(&DynamicImage::ImageRgb8(image))
    }

    /// Decodes and preprocesses an in-memory scan.
    pub fn process_bytes(&self, bytes: &[u8]) -> ScanResult<PreprocessedScan> {
        let image = load_image_from_bytes(bytes)?;
        self.process_image(&DynamicImage::ImageRgb8(image))
    }

    /// Preprocesses an already decoded scan.
    pub fn process_image(&self, image: &DynamicImage) -> ScanResult<PreprocessedScan> {
        let crop = self.extractor.extract_from_image(image)?;
        let tensor = self.normalizer.normalize_rgb(&crop.image)?;
        Ok(PreprocessedScan { crop, tensor })
    }
}
