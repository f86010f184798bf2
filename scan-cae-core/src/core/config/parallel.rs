//! Shared parallel processing configuration types.

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigValidator};

/// Configuration for parallel processing of image batches.
///
/// Images are independent of each other, so the only knobs are when to switch
/// from a sequential loop to rayon and how many worker threads to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of threads to use for parallel processing.
    /// If None, rayon will use the global thread pool (typically number of CPU cores).
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Number of images processed sequentially (<= this uses sequential).
    /// Default: 1 (process single images sequentially, use parallel for multiple images)
    #[serde(default = "ParallelPolicy::default_image_threshold")]
    pub image_threshold: usize,
}

impl ParallelPolicy {
    /// Create a new ParallelPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the image processing threshold.
    pub fn with_image_threshold(mut self, threshold: usize) -> Self {
        self.image_threshold = threshold;
        self
    }

    /// Returns true when a batch of `len` images should be processed in parallel.
    pub fn should_parallelize(&self, len: usize) -> bool {
        len > self.image_threshold
    }

    fn default_image_threshold() -> usize {
        1
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            image_threshold: Self::default_image_threshold(),
        }
    }
}

impl ConfigValidator for ParallelPolicy {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threads) = self.max_threads {
            self.validate_thread_count(threads)?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parallelize() {
        let policy = ParallelPolicy::default();
        assert!(!policy.should_parallelize(0));
        assert!(!policy.should_parallelize(1));
        assert!(policy.should_parallelize(2));

        let policy = policy.with_image_threshold(8);
        assert!(!policy.should_parallelize(8));
        assert!(policy.should_parallelize(9));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let policy: ParallelPolicy = serde_json::from_str(r#"{"max_threads": 4}"#).unwrap();
        assert_eq!(policy.max_threads, Some(4));
        assert_eq!(policy.image_threshold, 1);
        assert!(policy.validate().is_ok());

        let policy = ParallelPolicy::default().with_max_threads(Some(0));
        assert!(policy.validate().is_err());
    }
}
