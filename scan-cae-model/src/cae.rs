//! Convolutional autoencoder built from a [`ModelShapeContract`].
//!
//! Each stage of the contract becomes one convolution (or transposed
//! convolution) whose weights live under the stage name, followed by the
//! stage's activation and, where the table says so, a parameter-free batch
//! normalization over the batch and spatial axes.

use crate::utils::{candle_to_scan_inference, candle_to_scan_processing};
use candle_core::{D, Tensor};
use candle_nn::{
    Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig, Module, VarBuilder,
};
use scan_cae_core::core::ScanError;
use scan_cae_core::processors::{Activation, ModelShapeContract, StageKind, StageSpec};
use tracing::debug;

const LEAKY_RELU_SLOPE: f64 = 0.01;
const BATCH_NORM_EPS: f64 = 1e-5;

#[derive(Debug, Clone)]
enum StageLayer {
    Conv(Conv2d),
    Transposed(ConvTranspose2d),
}

#[derive(Debug, Clone)]
struct CaeStage {
    spec: StageSpec,
    layer: StageLayer,
}

impl CaeStage {
    fn load(spec: &StageSpec, vb: VarBuilder) -> Result<Self, ScanError> {
        let vb = vb.pp(&spec.name);
        let layer = match spec.kind {
            StageKind::Conv => {
                let cfg = Conv2dConfig {
                    stride: spec.stride,
                    ..Default::default()
                };
                candle_nn::conv2d(spec.in_channels, spec.out_channels, spec.kernel, cfg, vb)
                    .map(StageLayer::Conv)
            }
            StageKind::Transposed => {
                let cfg = ConvTranspose2dConfig {
                    stride: spec.stride,
                    ..Default::default()
                };
                candle_nn::conv_transpose2d(
                    spec.in_channels,
                    spec.out_channels,
                    spec.kernel,
                    cfg,
                    vb,
                )
                .map(StageLayer::Transposed)
            }
        }
        .map_err(|e| candle_to_scan_inference(format!("load {}", spec.name), e))?;

        Ok(Self {
            spec: spec.clone(),
            layer,
        })
    }

    fn forward(&self, xs: &Tensor) -> Result<Tensor, ScanError> {
        let name = &self.spec.name;
        let ys = match &self.layer {
            StageLayer::Conv(conv) => conv.forward(xs),
            StageLayer::Transposed(conv) => conv.forward(xs),
        }
        .map_err(|e| candle_to_scan_inference(format!("{name} forward"), e))?;

        let ys = match self.spec.activation {
            Activation::Relu => ys.relu(),
            Activation::LeakyRelu => candle_nn::ops::leaky_relu(&ys, LEAKY_RELU_SLOPE),
            Activation::Tanh => ys.tanh(),
        }
        .map_err(|e| candle_to_scan_processing(format!("{name} activation"), e))?;

        if self.spec.norm_after {
            batch_norm(&ys).map_err(|e| candle_to_scan_processing(format!("{name} norm"), e))
        } else {
            Ok(ys)
        }
    }
}

/// Normalizes each channel of an `(N, C, H, W)` tensor to zero mean and unit
/// variance over the batch and spatial axes.
fn batch_norm(xs: &Tensor) -> candle_core::Result<Tensor> {
    let mean = xs.mean_keepdim(0)?.mean_keepdim(2)?.mean_keepdim(D::Minus1)?;
    let centered = xs.broadcast_sub(&mean)?;
    let var = centered
        .sqr()?
        .mean_keepdim(0)?
        .mean_keepdim(2)?
        .mean_keepdim(D::Minus1)?;
    let std = var.affine(1.0, BATCH_NORM_EPS)?.sqrt()?;
    centered.broadcast_div(&std)
}

/// The autoencoder.
///
/// Constructed explicitly from a contract and a weight source; nothing is
/// instantiated globally.
#[derive(Debug, Clone)]
pub struct Cae {
    contract: ModelShapeContract,
    stages: Vec<CaeStage>,
}

impl Cae {
    /// Builds every stage of `contract` from `vb`.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Inference` if a weight is missing or has the wrong shape.
    pub fn load(contract: &ModelShapeContract, vb: VarBuilder) -> Result<Self, ScanError> {
        let stages = contract
            .stages()
            .iter()
            .map(|spec| CaeStage::load(spec, vb.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(stages = stages.len(), "loaded autoencoder");

        Ok(Self {
            contract: contract.clone(),
            stages,
        })
    }

    /// The contract the model was built from.
    pub fn contract(&self) -> &ModelShapeContract {
        &self.contract
    }

    /// Runs an `(N, C, H, W)` batch through every stage.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::ShapeMismatch` before touching the backend if the
    /// per-sample shape cannot pass through the contract.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor, ScanError> {
        let (_, c, h, w) = xs
            .dims4()
            .map_err(|e| candle_to_scan_processing("read input dims", e))?;
        let shapes = self.contract.trace((c, h, w))?;
        debug!(input = ?(c, h, w), output = ?shapes.last(), "running autoencoder");

        let mut current = xs.clone();
        for stage in &self.stages {
            current = stage.forward(&current)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{array_to_tensor, tensor_to_array};
    use candle_core::{DType, Device};
    use ndarray::Array4;
    use scan_cae_core::core::errors::ErrorKind;

    fn small_contract() -> ModelShapeContract {
        use Activation::*;
        use StageKind::*;
        ModelShapeContract::new(vec![
            StageSpec::new("conv1", Conv, 1, 4, 3, 2, Relu, false),
            StageSpec::new("conv2", Conv, 4, 8, 3, 2, Relu, true),
            StageSpec::new("t_conv1", Transposed, 8, 4, 3, 2, LeakyRelu, true),
            StageSpec::new("t_conv2", Transposed, 4, 1, 4, 2, Tanh, false),
        ])
        .unwrap()
    }

    #[test]
    fn test_forward_shape_with_zero_weights() {
        let device = Device::Cpu;
        let vb = VarBuilder::zeros(DType::F32, &device);
        let model = Cae::load(&small_contract(), vb).unwrap();

        let batch = Array4::from_shape_fn((2, 1, 32, 32), |(_, _, y, x)| (x + y) as f32 / 64.0);
        let input = array_to_tensor(&batch, &device).unwrap();
        let output = tensor_to_array(&model.forward(&input).unwrap()).unwrap();

        assert_eq!(output.dim(), (2, 1, 32, 32));
        assert!(output.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_reference_contract_rejects_normalized_tensor() {
        let device = Device::Cpu;
        let vb = VarBuilder::zeros(DType::F32, &device);
        let model = Cae::load(&ModelShapeContract::reference(), vb).unwrap();
        assert_eq!(model.contract().stages().len(), 9);

        let input = Tensor::zeros((1, 1, 32, 32), DType::F32, &device).unwrap();
        let err = model.forward(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_batch_norm_standardizes_channels() {
        let device = Device::Cpu;
        let data: Vec<f32> = (0..2 * 2 * 3 * 3).map(|v| v as f32).collect();
        let xs = Tensor::from_vec(data, (2, 2, 3, 3), &device).unwrap();
        let ys = batch_norm(&xs).unwrap();

        let mean = ys
            .mean_keepdim(0)
            .and_then(|t| t.mean_keepdim(2))
            .and_then(|t| t.mean_keepdim(3))
            .and_then(|t| t.flatten_all())
            .and_then(|t| t.to_vec1::<f32>())
            .unwrap();
        assert!(mean.iter().all(|m| m.abs() < 1e-4));
    }

    #[test]
    fn test_leaky_relu_keeps_negative_slope() {
        let device = Device::Cpu;
        let xs = Tensor::new(&[-2.0f32, 3.0], &device).unwrap();
        let ys = candle_nn::ops::leaky_relu(&xs, LEAKY_RELU_SLOPE)
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();
        assert!((ys[0] + 0.02).abs() < 1e-6);
        assert_eq!(ys[1], 3.0);
    }
}
