//! Error constructor utilities.
//!
//! Ergonomic helpers for creating [`ScanError`] instances with context and
//! error chaining, so call sites stay a single `map_err` long.
//!
//! ```rust
//! use scan_cae_core::core::ScanError;
//!
//! let error = ScanError::shape_mismatch("conv1", "32 input channels", "1 channel");
//! assert!(error.to_string().contains("conv1"));
//! ```

use super::types::{ProcessingStage, ScanError};

impl ScanError {
    #[inline]
    fn processing_with_context(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a ScanError for tensor operations.
    ///
    /// # Arguments
    ///
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::TensorOperation, context, error)
    }

    /// Creates a ScanError for batch driver failures (thread pool setup and the like).
    pub fn batch_processing(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::BatchProcessing, context, error)
    }

    /// Creates a ScanError for a failed model backend call.
    pub fn inference_error(
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a ScanError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a ScanError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a ScanError for a shape contract violation.
    pub fn shape_mismatch(
        stage: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            stage: stage.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use std::error::Error;

    #[test]
    fn test_processing_errors_keep_source() {
        let err = ScanError::batch_processing(
            "build a 4-thread pool",
            std::io::Error::other("thread spawn refused"),
        );
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.to_string().starts_with("batch processing failed"));
        assert!(err.source().is_some());

        let err = ScanError::tensor_operation("stack 2 tensors", std::io::Error::other("shape"));
        assert!(matches!(
            err,
            ScanError::Processing {
                kind: ProcessingStage::TensorOperation,
                ..
            }
        ));
    }

    #[test]
    fn test_image_io_errors_classify_as_unreadable() {
        let io = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err: ScanError = io.into();
        assert!(matches!(err, ScanError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::UnreadableImage);
    }
}
