//! # Scan CAE Model
//!
//! Candle implementation of the convolutional autoencoder that consumes the
//! normalized scan tensors produced by `scan-cae-core`.
//!
//! ## Modules
//!
//! * [`cae`] - The autoencoder assembled from a `ModelShapeContract`
//! * [`utils`] - Device parsing, error conversion and ndarray/Candle bridging
//!
//! ## Example
//!
//! ```
//! use candle_core::{DType, Device};
//! use candle_nn::VarBuilder;
//! use scan_cae_core::processors::ModelShapeContract;
//! use scan_cae_model::Cae;
//!
//! let device = Device::Cpu;
//! let vb = VarBuilder::zeros(DType::F32, &device);
//! let model = Cae::load(&ModelShapeContract::reference(), vb).unwrap();
//! assert_eq!(model.contract().stages().len(), 9);
//! ```

pub mod cae;
pub mod utils;

pub use cae::Cae;
pub use utils::parse_device;
