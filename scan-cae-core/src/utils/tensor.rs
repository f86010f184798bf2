//! Tensor helpers for feeding normalized scans to the model.

use crate::core::Tensor4D;
use crate::core::errors::{ScanError, ScanResult};
use crate::processors::NormalizedTensor;
use ndarray::Axis;

/// Stacks normalized single-sample tensors into an `(N, C, H, W)` batch.
///
/// # Errors
///
/// Returns `ScanError::InvalidInput` for an empty slice or tensors of
/// different shapes.
///
/// # Examples
///
/// ```
/// use image::{DynamicImage, GrayImage, Luma};
/// use scan_cae_core::processors::IntensityNormalizer;
/// use scan_cae_core::utils::stack_tensors;
///
/// let image = GrayImage::from_fn(40, 40, |x, y| Luma([((x + y) * 3) as u8]));
/// let tensor = IntensityNormalizer::default()
///     .normalize(&DynamicImage::ImageLuma8(image))
///     .unwrap();
/// let batch = stack_tensors(&[tensor.clone(), tensor]).unwrap();
/// assert_eq!(batch.dim(), (2, 1, 32, 32));
/// ```
pub fn stack_tensors(tensors: &[NormalizedTensor]) -> ScanResult<Tensor4D> {
    let first = tensors
        .first()
        .ok_or_else(|| ScanError::invalid_input("No tensors to stack"))?;
    let first_shape = first.shape();

    for (i, tensor) in tensors.iter().enumerate().skip(1) {
        if tensor.shape() != first_shape {
            return Err(ScanError::invalid_input(format!(
                "Tensor shape mismatch during stacking at index {i}: expected {first_shape:?}, got {:?}",
                tensor.shape()
            )));
        }
    }

    let views: Vec<_> = tensors.iter().map(|t| t.as_array()).collect();
    ndarray::stack(Axis(0), &views)
        .map_err(|e| ScanError::tensor_operation(&format!("stack {} tensors", tensors.len()), e))
}
