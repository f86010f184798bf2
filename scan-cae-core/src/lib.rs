//! # Scan CAE Core
//!
//! Core types and image processors for preparing medical scans for a
//! convolutional autoencoder.
//!
//! This crate provides:
//! - Error handling types
//! - Configuration validation
//! - Contour-based region-of-interest extraction
//! - Per-image z-score intensity normalization
//! - The layer-shape contract of the autoencoder
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration, constants and capability traits
//! * [`processors`] - Region extraction, normalization and the shape contract
//! * [`utils`] - Image loading and tensor batching
//!
//! ## Example
//!
//! ```
//! use image::{DynamicImage, Rgb, RgbImage};
//! use scan_cae_core::prelude::*;
//!
//! // A bright disk on a dark background.
//! let scan = RgbImage::from_fn(224, 224, |x, y| {
//!     let (dx, dy) = (x as i32 - 112, y as i32 - 112);
//!     if dx * dx + dy * dy <= 2500 { Rgb([230, 230, 230]) } else { Rgb([0, 0, 0]) }
//! });
//!
//! let extractor = RegionExtractor::default();
//! let normalizer = IntensityNormalizer::default();
//!
//! let crop = extractor.extract_from_image(&DynamicImage::ImageRgb8(scan))?;
//! let tensor = normalizer.normalize_rgb(&crop.image)?;
//! assert_eq!(tensor.shape(), (1, 32, 32));
//! # Ok::<(), ScanError>(())
//! ```

pub mod core;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error Handling
    pub use crate::core::{ErrorKind, ScanError, ScanResult};

    // Configuration
    pub use crate::core::{ConfigValidator, ParallelPolicy};

    // Processors
    pub use crate::processors::{
        DegeneratePolicy, IntensityNormalizer, IntensityNormalizerConfig, ModelShapeContract,
        NormalizedTensor, RegionCrop, RegionExtractor, RegionExtractorConfig,
    };

    // Geometry types
    pub use crate::processors::{Contour, CropRegion, ExtremePoints, Point};

    // Utilities
    pub use crate::utils::{load_image, stack_tensors};
}
