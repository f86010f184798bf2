//! Utility functions for the preprocessing pipeline.
//!
//! This module provides image loading and conversion, tensor batching, and
//! (with the `visualization` feature) the region debug overlay.

pub mod image;
pub mod tensor;
#[cfg(feature = "visualization")]
pub mod visualization;

pub use image::{dynamic_to_rgb, load_image, load_image_from_bytes};
pub use tensor::stack_tensors;
