//! Configuration error types and validation traits.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error indicating that a configuration file could not be parsed.
    #[error("failed to parse configuration: {message}")]
    ParseFailed { message: String },

    /// Error indicating that a resource limit has been exceeded.
    #[error("resource limit exceeded: {message}")]
    ResourceLimitExceeded { message: String },
}

/// A trait for validating configuration parameters.
///
/// Implemented by every configuration struct of the pipeline so that values
/// loaded from JSON are checked before any image is touched.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates image dimensions.
    ///
    /// # Arguments
    ///
    /// * `width` - The width to validate.
    /// * `height` - The height to validate.
    fn validate_image_dimensions(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            Err(ConfigError::InvalidConfig {
                message: "Image dimensions must be positive".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validates thread count.
    ///
    /// # Arguments
    ///
    /// * `thread_count` - The thread count to validate.
    fn validate_thread_count(&self, thread_count: usize) -> Result<(), ConfigError> {
        const MAX_REASONABLE_THREADS: usize = 256;

        if thread_count == 0 {
            Err(ConfigError::InvalidConfig {
                message: "Thread count must be greater than 0".to_string(),
            })
        } else if thread_count > MAX_REASONABLE_THREADS {
            Err(ConfigError::ResourceLimitExceeded {
                message: format!(
                    "Thread count {} exceeds reasonable maximum of {}",
                    thread_count, MAX_REASONABLE_THREADS
                ),
            })
        } else {
            Ok(())
        }
    }

    /// Validates a float value is finite and positive.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to validate.
    /// * `field_name` - The name of the field being validated.
    fn validate_positive_f64(&self, value: f64, field_name: &str) -> Result<(), ConfigError> {
        if !value.is_finite() || value <= 0.0 {
            Err(ConfigError::InvalidConfig {
                message: format!(
                    "{} must be a finite value greater than 0, got {}",
                    field_name, value
                ),
            })
        } else {
            Ok(())
        }
    }

    /// Validates a kernel size is odd and non-zero.
    fn validate_odd_kernel(&self, size: u32, field_name: &str) -> Result<(), ConfigError> {
        if size == 0 || size % 2 == 0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{} must be a positive odd number, got {}", field_name, size),
            })
        } else {
            Ok(())
        }
    }
}
