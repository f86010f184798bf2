//! Image processors of the preprocessing pipeline.
//!
//! # Modules
//!
//! * `contract` - Layer-shape table of the autoencoder and the shape tracer
//! * `filter` - Gaussian smoothing applied before thresholding
//! * `geometry` - Points, contours, extreme points and crop rectangles
//! * `morphology` - The imageproc-backed mask operations
//! * `normalization` - Resize, grayscale and z-score normalization
//! * `region` - Contour-based region-of-interest extraction

pub mod contract;
pub mod filter;
mod geometry;
mod morphology;
mod normalization;
mod region;

pub use contract::{Activation, ModelShapeContract, StageKind, StageSpec};
pub use geometry::*;
pub use morphology::ImageprocMorphology;
pub use normalization::*;
pub use region::{RegionCrop, RegionExtractor, RegionExtractorConfig};
