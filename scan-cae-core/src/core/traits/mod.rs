//! Traits at the seams of the preprocessing pipeline.

pub mod morphology;

pub use morphology::MorphologyOps;
