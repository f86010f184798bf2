//! The core module of the preprocessing pipeline.
//!
//! This module contains the fundamental components shared by every stage:
//! - Configuration validation and the parallel policy
//! - Constants with the reference defaults
//! - Error handling
//! - Traits defining the capabilities the processors depend on
//!
//! It also provides re-exports of commonly used types and functions for convenience.

pub mod config;
pub mod constants;
pub mod errors;
pub mod traits;

pub use crate::utils::{dynamic_to_rgb, load_image, load_image_from_bytes};
pub use config::{ConfigError, ConfigValidator, ParallelPolicy};
pub use constants::*;
pub use errors::{ErrorKind, ProcessingStage, ScanError, ScanResult};
pub use traits::MorphologyOps;

/// A 3-dimensional tensor represented as a 3D array of f32 values.
pub type Tensor3D = ndarray::Array3<f32>;

/// A 4-dimensional tensor represented as a 4D array of f32 values.
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
