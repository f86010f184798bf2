//! # Scan CAE
//!
//! Preprocessing of medical scans for a convolutional autoencoder: contour-based
//! region-of-interest extraction followed by per-image z-score normalization.
//!
//! ## Features
//!
//! - Deterministic cropping to the dominant bright region of a scan
//! - Fixed-size, zero-mean, unit-variance single-channel tensors
//! - Log-and-skip batch processing on rayon with per-kind failure statistics
//! - JSON pipeline configuration with validated defaults
//! - The autoencoder's layer-shape contract, and (feature `model`) a Candle
//!   implementation of the autoencoder itself
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration and constants
//! * [`processors`] - Region extraction, normalization and the shape contract
//! * [`pipeline`] - The composed per-scan pipeline and the batch driver
//! * [`utils`] - Image loading, tensor batching and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scan_cae::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = ScanPipeline::new(PipelineConfig::default())?;
//!
//! let scan = pipeline.process(Path::new("scan.png"))?;
//! println!("crop {:?} -> tensor {:?}", scan.crop.region, scan.tensor.shape());
//!
//! let outcomes = pipeline.process_batch(&["a.png", "b.png", "c.png"]);
//! println!("{}", PipelineStats::from_outcomes(&outcomes));
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod utils;

pub use scan_cae_core::{core, processors};

#[cfg(feature = "model")]
pub use scan_cae_model as model;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error Handling
    pub use scan_cae_core::core::{ErrorKind, ScanError, ScanResult};

    // Pipeline
    pub use crate::pipeline::{
        PipelineConfig, PipelineStats, PreprocessedScan, ScanOutcome, ScanPipeline,
    };

    // Processors
    pub use scan_cae_core::processors::{
        DegeneratePolicy, IntensityNormalizer, IntensityNormalizerConfig, ModelShapeContract,
        NormalizedTensor, RegionExtractor, RegionExtractorConfig,
    };

    // Image Utilities
    pub use crate::utils::{load_image, stack_tensors};
}
