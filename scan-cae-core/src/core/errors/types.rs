//! Error type definitions.

use thiserror::Error;

/// Enum representing different stages of processing in the pipeline.
///
/// This enum is used to identify which stage an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred during tensor operations.
    TensorOperation,
    /// Error occurred while running the batch driver.
    BatchProcessing,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::BatchProcessing => write!(f, "batch processing"),
        }
    }
}

/// Coarse classification of a [`ScanError`].
///
/// Every kind is recoverable at the batch level: the batch driver records the
/// kind and moves on to the next image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// The input could not be read or decoded.
    UnreadableImage,
    /// Thresholding and morphology left no foreground contour.
    NoRegionFound,
    /// The selected region collapsed to an empty crop.
    EmptyRegion,
    /// The normalized image has zero variance.
    DegenerateImage,
    /// A tensor does not satisfy the model's shape contract.
    ShapeMismatch,
    /// Configuration, tensor and inference failures.
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::UnreadableImage => "unreadable image",
            ErrorKind::NoRegionFound => "no region found",
            ErrorKind::EmptyRegion => "empty region",
            ErrorKind::DegenerateImage => "degenerate image",
            ErrorKind::ShapeMismatch => "shape mismatch",
            ErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Enum representing the errors that can occur while preprocessing a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The image could not be decoded.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// IO error while reading the input.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// No external contour survived thresholding and morphology.
    #[error("no foreground region found ({foreground_pixels} foreground pixels after morphology)")]
    NoRegionFound {
        /// Number of foreground pixels left in the cleaned mask.
        foreground_pixels: usize,
    },

    /// The extreme points of the selected contour describe an empty rectangle.
    #[error("selected region is empty: {width}x{height}")]
    EmptyRegion {
        /// Width of the clamped crop rectangle.
        width: u32,
        /// Height of the clamped crop rectangle.
        height: u32,
    },

    /// The image has zero intensity variance and cannot be z-score normalized.
    #[error("degenerate image: standard deviation {std_dev} is too small to normalize")]
    DegenerateImage {
        /// The measured standard deviation.
        std_dev: f64,
    },

    /// A tensor shape does not satisfy a stage of the model contract.
    #[error("shape mismatch at stage '{stage}': expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Name of the stage that rejected the shape.
        stage: String,
        /// Description of what the stage expects.
        expected: String,
        /// Description of what it received.
        actual: String,
    },

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while running the model.
    #[error("inference: {context}")]
    Inference {
        /// What the model was doing.
        context: String,
        /// The underlying backend error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),
}

impl ScanError {
    /// Classifies the error for batch statistics.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::ImageLoad(_) | ScanError::Io(_) => ErrorKind::UnreadableImage,
            ScanError::NoRegionFound { .. } => ErrorKind::NoRegionFound,
            ScanError::EmptyRegion { .. } => ErrorKind::EmptyRegion,
            ScanError::DegenerateImage { .. } => ErrorKind::DegenerateImage,
            ScanError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            ScanError::Processing { .. }
            | ScanError::Inference { .. }
            | ScanError::InvalidInput { .. }
            | ScanError::ConfigError { .. }
            | ScanError::Tensor(_) => ErrorKind::Other,
        }
    }
}

impl From<image::ImageError> for ScanError {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::IoError(io) => Self::Io(io),
            other => Self::ImageLoad(other),
        }
    }
}

impl From<crate::core::config::ConfigError> for ScanError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}
