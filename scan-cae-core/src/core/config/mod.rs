//! Configuration types and validation for the preprocessing pipeline.

pub mod errors;
pub mod parallel;

pub use errors::{ConfigError, ConfigValidator};
pub use parallel::ParallelPolicy;
