//! Error types for the scan preprocessing pipeline.
//!
//! This module provides the error handling system for the pipeline, including
//! the per-image failure kinds (unreadable input, missing foreground region,
//! degenerate intensity statistics), helper constructors, and a coarse
//! [`ErrorKind`] classification used by batch statistics.
//!
//! # Usage
//!
//! ```rust
//! use scan_cae_core::core::errors::{ErrorKind, ScanError};
//!
//! let error = ScanError::NoRegionFound {
//!     foreground_pixels: 0,
//! };
//! assert_eq!(error.kind(), ErrorKind::NoRegionFound);
//!
//! let config_error = ScanError::config_error("blur kernel size must be odd");
//! assert_eq!(config_error.kind(), ErrorKind::Other);
//! ```

pub mod constructors;
pub mod types;

pub use types::{ErrorKind, ProcessingStage, ScanError};

/// Convenient result alias for preprocessing operations.
pub type ScanResult<T> = Result<T, ScanError>;
