//! Utility functions for the preprocessing pipeline.
//!
//! Re-exports the image and tensor helpers of `scan-cae-core` and the logging
//! setup used by the binaries.

pub use scan_cae_core::core::init_tracing;
pub use scan_cae_core::utils::{
    dynamic_to_rgb, load_image, load_image_from_bytes, stack_tensors,
};
