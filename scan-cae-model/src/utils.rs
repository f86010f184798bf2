//! Utility functions for running the autoencoder with Candle.
//!
//! This module provides:
//! - Device configuration for Candle-based models
//! - Candle error conversion into [`ScanError`]
//! - Conversion between ndarray batches and Candle tensors

use candle_core::{Device, Tensor};
use scan_cae_core::core::errors::ProcessingStage;
use scan_cae_core::core::{ScanError, Tensor4D};

/// Parses a device string and creates a Candle [`Device`].
///
/// # Supported formats
///
/// - `"cpu"` → CPU device
/// - `"cuda"` or `"gpu"` → CUDA device 0
/// - `"cuda:N"` → CUDA device N (e.g., `"cuda:1"`)
///
/// # Errors
///
/// Returns an error if:
/// - The device string is invalid
/// - CUDA is requested but the `cuda` feature is not enabled
/// - CUDA device creation fails
///
/// # Examples
///
/// ```
/// use scan_cae_model::utils::parse_device;
///
/// let cpu = parse_device("cpu").unwrap();
/// assert!(cpu.is_cpu());
/// assert!(parse_device("tpu").is_err());
/// ```
pub fn parse_device(device_str: &str) -> Result<Device, ScanError> {
    let device_str = device_str.to_lowercase();
    match device_str.as_str() {
        "cpu" => Ok(Device::Cpu),
        "cuda" | "gpu" => cuda_device(0),
        s if s.starts_with("cuda:") => {
            let ordinal: usize = s["cuda:".len()..].parse().map_err(|_| {
                ScanError::config_error(format!("Invalid CUDA device ordinal in '{s}'"))
            })?;
            cuda_device(ordinal)
        }
        _ => Err(ScanError::config_error(format!(
            "Unknown device: '{device_str}'. Use 'cpu', 'cuda', or 'cuda:N'"
        ))),
    }
}

#[cfg(feature = "cuda")]
fn cuda_device(ordinal: usize) -> Result<Device, ScanError> {
    Device::new_cuda(ordinal).map_err(|e| {
        ScanError::config_error(format!("Failed to create CUDA device {ordinal}: {e}"))
    })
}

#[cfg(not(feature = "cuda"))]
fn cuda_device(_ordinal: usize) -> Result<Device, ScanError> {
    Err(ScanError::config_error(
        "CUDA support not enabled. Compile with --features cuda",
    ))
}

/// Convert Candle error to ScanError for inference operations.
pub fn candle_to_scan_inference(context: impl Into<String>, err: candle_core::Error) -> ScanError {
    ScanError::inference_error(context, err)
}

/// Convert Candle error to ScanError for tensor operations.
pub fn candle_to_scan_processing(context: impl Into<String>, err: candle_core::Error) -> ScanError {
    ScanError::Processing {
        kind: ProcessingStage::TensorOperation,
        context: context.into(),
        source: Box::new(err),
    }
}

/// Copies an `(N, C, H, W)` ndarray batch onto `device`.
pub fn array_to_tensor(batch: &Tensor4D, device: &Device) -> Result<Tensor, ScanError> {
    let shape = batch.dim();
    let data: Vec<f32> = batch.iter().copied().collect();
    Tensor::from_vec(data, shape, device)
        .map_err(|e| candle_to_scan_processing("copy batch to device", e))
}

/// Copies a rank-4 f32 Candle tensor back into an ndarray batch.
pub fn tensor_to_array(tensor: &Tensor) -> Result<Tensor4D, ScanError> {
    let (n, c, h, w) = tensor
        .dims4()
        .map_err(|e| candle_to_scan_processing("read output dims", e))?;
    let data = tensor
        .flatten_all()
        .and_then(|t| t.to_vec1::<f32>())
        .map_err(|e| candle_to_scan_processing("read output values", e))?;
    Ok(Tensor4D::from_shape_vec((n, c, h, w), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_parse_device() {
        assert!(parse_device("CPU").unwrap().is_cpu());
        assert!(parse_device("cuda:x").is_err());
        assert!(parse_device("vulkan").is_err());
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_cuda_without_feature() {
        let err = parse_device("cuda:0").unwrap_err();
        assert!(err.to_string().contains("not enabled"));
    }

    #[test]
    fn test_array_roundtrip_preserves_layout() {
        let batch = Array4::from_shape_fn((2, 1, 3, 4), |(n, _, y, x)| (n * 100 + y * 10 + x) as f32);
        let tensor = array_to_tensor(&batch, &Device::Cpu).unwrap();
        assert_eq!(tensor.dims(), &[2, 1, 3, 4]);
        let back = tensor_to_array(&tensor).unwrap();
        assert_eq!(back, batch);
        assert_eq!(back[[1, 0, 2, 3]], 123.0);
    }
}
