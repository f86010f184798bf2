//! Per-image intensity normalization.
//!
//! A cropped region is resized to the model's input side with bilinear
//! interpolation, reduced to a single luminance channel and standardized to
//! zero mean and unit standard deviation using statistics of that image alone.

use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::DEFAULT_TENSOR_SIZE;
use crate::core::errors::{ScanError, ScanResult};
use crate::core::Tensor3D;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::{Array3, ArrayView3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to do when an image has (near) zero intensity variance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Fail with `ScanError::DegenerateImage`.
    #[default]
    Reject,
    /// Divide by `max(std, epsilon)` instead.
    Epsilon {
        /// Lower bound applied to the standard deviation.
        epsilon: f64,
    },
}

/// Configuration for [`IntensityNormalizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityNormalizerConfig {
    /// Side length of the square output (default: 32).
    #[serde(default = "IntensityNormalizerConfig::default_target_size")]
    pub target_size: u32,
    /// Handling of zero-variance images (default: reject).
    #[serde(default)]
    pub degenerate_policy: DegeneratePolicy,
}

impl IntensityNormalizerConfig {
    /// Creates a configuration with the reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output side length.
    pub fn with_target_size(mut self, size: u32) -> Self {
        self.target_size = size;
        self
    }

    /// Sets the zero-variance policy.
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    fn default_target_size() -> u32 {
        DEFAULT_TENSOR_SIZE
    }
}

impl Default for IntensityNormalizerConfig {
    fn default() -> Self {
        Self {
            target_size: Self::default_target_size(),
            degenerate_policy: DegeneratePolicy::default(),
        }
    }
}

impl ConfigValidator for IntensityNormalizerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_image_dimensions(self.target_size, self.target_size)?;
        if let DegeneratePolicy::Epsilon { epsilon } = self.degenerate_policy {
            self.validate_positive_f64(epsilon, "degenerate_policy.epsilon")?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// A standardized single-channel tensor of shape `(1, size, size)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Tensor3D,
}

impl NormalizedTensor {
    /// Borrows the underlying array.
    pub fn as_array(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// Shape as `(channels, height, width)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Consumes the wrapper and returns the array.
    pub fn into_inner(self) -> Tensor3D {
        self.data
    }

    /// Mean of all elements.
    pub fn mean(&self) -> f64 {
        let n = self.data.len() as f64;
        self.data.iter().map(|&v| v as f64).sum::<f64>() / n
    }

    /// Population standard deviation of all elements.
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let n = self.data.len() as f64;
        let var = self
            .data
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        var.sqrt()
    }
}

/// Resizes, grays and z-scores a cropped region.
#[derive(Debug, Clone, Default)]
pub struct IntensityNormalizer {
    config: IntensityNormalizerConfig,
}

impl IntensityNormalizer {
    /// Creates a normalizer.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::ConfigError` if the configuration is invalid.
    pub fn new(config: IntensityNormalizerConfig) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &IntensityNormalizerConfig {
        &self.config
    }

    /// Normalizes a decoded image of any size and color layout.
    ///
    /// The image is expanded to RGB first, so the result is identical to
    /// [`normalize_rgb`](Self::normalize_rgb) on the same pixels.
    pub fn normalize(&self, image: &DynamicImage) -> ScanResult<NormalizedTensor> {
        self.normalize_rgb(&image.to_rgb8())
    }

    /// Normalizes an RGB crop as produced by the region extractor.
    pub fn normalize_rgb(&self, image: &RgbImage) -> ScanResult<NormalizedTensor> {
        let resized = self.resize_to_target(image);
        self.standardize(&imageops::grayscale(&resized))
    }

    /// Resizes to the target side with bilinear interpolation.
    ///
    /// An image already at the target size is returned as is.
    pub fn resize_to_target(&self, image: &RgbImage) -> RgbImage {
        let size = self.config.target_size;
        if image.dimensions() == (size, size) {
            return image.clone();
        }
        imageops::resize(image, size, size, FilterType::Triangle)
    }

    fn standardize(&self, gray: &GrayImage) -> ScanResult<NormalizedTensor> {
        if gray.width() == 0 || gray.height() == 0 {
            return Err(ScanError::invalid_input("cannot normalize an empty image"));
        }

        let n = (gray.width() * gray.height()) as f64;
        let mean = gray.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
        let var = gray
            .pixels()
            .map(|p| {
                let d = p[0] as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let std_dev = var.sqrt();

        let divisor = match self.config.degenerate_policy {
            DegeneratePolicy::Reject if std_dev <= f64::EPSILON => {
                return Err(ScanError::DegenerateImage { std_dev });
            }
            DegeneratePolicy::Reject => std_dev,
            DegeneratePolicy::Epsilon { epsilon } => std_dev.max(epsilon),
        };
        debug!(mean, std_dev, divisor, "standardizing intensities");

        let (w, h) = gray.dimensions();
        let data = Array3::from_shape_fn((1, h as usize, w as usize), |(_, y, x)| {
            ((gray.get_pixel(x as u32, y as u32)[0] as f64 - mean) / divisor) as f32
        });

        Ok(NormalizedTensor { data })
    }
}
