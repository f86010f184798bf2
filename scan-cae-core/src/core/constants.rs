//! Constants used throughout the preprocessing pipeline.
//!
//! The defaults reproduce the lighting assumptions of the dataset the
//! autoencoder was designed for (dark background, bright anatomy). Every one
//! of them can be overridden through the configuration structs.

/// Side length of the square working frame images are resized to before thresholding.
pub const DEFAULT_WORKING_SIZE: u32 = 224;

/// Size of the square Gaussian kernel applied before thresholding.
pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 5;

/// Gaussian sigma; zero means "derive from the kernel size".
pub const DEFAULT_BLUR_SIGMA: f64 = 0.0;

/// Intensities strictly above this value become foreground.
pub const DEFAULT_FOREGROUND_THRESHOLD: u8 = 45;

/// Number of 3x3 erosion passes applied to the binary mask.
pub const DEFAULT_ERODE_ITERATIONS: u8 = 2;

/// Number of 3x3 dilation passes applied to the eroded mask.
pub const DEFAULT_DILATE_ITERATIONS: u8 = 2;

/// Margin added on every side of the extreme-point rectangle.
pub const DEFAULT_CROP_PADDING: u32 = 0;

/// Side length of the normalized tensor.
pub const DEFAULT_TENSOR_SIZE: u32 = 32;

