//! Layer-shape contract of the convolutional autoencoder.
//!
//! The table below is the architecture the normalized tensor is fed into.
//! Weight files are keyed by the stage names, so the table is reproduced as
//! declared, including channel counts that do not chain from one stage to the
//! next. [`ModelShapeContract::trace`] walks a `(channels, height, width)`
//! shape through the stages and reports the first one that cannot accept it.

use crate::core::errors::{ScanError, ScanResult};
use ndarray::ArrayView3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Convolution direction of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Strided 2D convolution (encoder).
    Conv,
    /// Strided 2D transposed convolution (decoder).
    Transposed,
}

/// Nonlinearity applied after a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Rectified linear unit.
    Relu,
    /// Leaky ReLU with a 0.01 negative slope.
    LeakyRelu,
    /// Hyperbolic tangent, used on the reconstruction.
    Tanh,
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Relu => write!(f, "relu"),
            Activation::LeakyRelu => write!(f, "leaky_relu"),
            Activation::Tanh => write!(f, "tanh"),
        }
    }
}

/// One row of the architecture table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Stage name, also the weight prefix.
    pub name: String,
    /// Convolution or transposed convolution.
    pub kind: StageKind,
    /// Channels the stage expects on its input.
    pub in_channels: usize,
    /// Channels the stage produces.
    pub out_channels: usize,
    /// Side of the square kernel.
    pub kernel: usize,
    /// Stride along both spatial axes; no padding is applied.
    pub stride: usize,
    /// Nonlinearity applied to the stage output.
    pub activation: Activation,
    /// Whether batch normalization follows the activation.
    pub norm_after: bool,
}

impl StageSpec {
    /// Creates a stage description.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        kind: StageKind,
        in_channels: usize,
        out_channels: usize,
        kernel: usize,
        stride: usize,
        activation: Activation,
        norm_after: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            in_channels,
            out_channels,
            kernel,
            stride,
            activation,
            norm_after,
        }
    }

    /// Spatial output size for an input side of `n`, or `None` if the kernel
    /// does not fit.
    pub fn output_size(&self, n: usize) -> Option<usize> {
        match self.kind {
            StageKind::Conv => {
                if n < self.kernel || self.stride == 0 {
                    None
                } else {
                    Some((n - self.kernel) / self.stride + 1)
                }
            }
            StageKind::Transposed => {
                if n == 0 {
                    None
                } else {
                    Some((n - 1) * self.stride + self.kernel)
                }
            }
        }
    }

    /// Applies the stage to a `(channels, height, width)` shape.
    pub fn apply(&self, shape: (usize, usize, usize)) -> ScanResult<(usize, usize, usize)> {
        let (c, h, w) = shape;
        if c != self.in_channels {
            return Err(ScanError::shape_mismatch(
                &self.name,
                format!("{} input channels", self.in_channels),
                format!("{c} channels in shape {shape:?}"),
            ));
        }
        match (self.output_size(h), self.output_size(w)) {
            (Some(oh), Some(ow)) => Ok((self.out_channels, oh, ow)),
            _ => Err(ScanError::shape_mismatch(
                &self.name,
                format!("spatial size >= kernel {}", self.kernel),
                format!("{h}x{w}"),
            )),
        }
    }
}

/// Ordered stage table of the autoencoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelShapeContract {
    stages: Vec<StageSpec>,
}

impl ModelShapeContract {
    /// Builds a contract from an explicit stage list.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::InvalidInput` for an empty table or a stage with a
    /// zero kernel, stride or channel count.
    pub fn new(stages: Vec<StageSpec>) -> ScanResult<Self> {
        if stages.is_empty() {
            return Err(ScanError::invalid_input("model contract has no stages"));
        }
        if let Some(bad) = stages.iter().find(|s| {
            s.kernel == 0 || s.stride == 0 || s.in_channels == 0 || s.out_channels == 0
        }) {
            return Err(ScanError::invalid_input(format!(
                "stage '{}' has a zero kernel, stride or channel count",
                bad.name
            )));
        }
        Ok(Self { stages })
    }

    /// The architecture the pretrained weights were produced with.
    pub fn reference() -> Self {
        use Activation::{LeakyRelu, Relu, Tanh};
        use StageKind::{Conv, Transposed};

        let stages = vec![
            StageSpec::new("conv1", Conv, 32, 64, 3, 2, Relu, false),
            StageSpec::new("conv2", Conv, 64, 128, 3, 2, Relu, true),
            StageSpec::new("conv3", Conv, 128, 192, 3, 2, Relu, true),
            StageSpec::new("conv4", Conv, 192, 64, 4, 1, Relu, true),
            StageSpec::new("conv5", Conv, 64, 128, 1, 1, Relu, true),
            StageSpec::new("t_conv1", Transposed, 128, 64, 4, 1, LeakyRelu, true),
            StageSpec::new("t_conv2", Transposed, 64, 64, 3, 2, LeakyRelu, true),
            StageSpec::new("t_conv3", Transposed, 64, 64, 3, 2, LeakyRelu, true),
            StageSpec::new("t_conv4", Transposed, 32, 64, 3, 2, Tanh, false),
        ];
        Self { stages }
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Channel count the first stage expects.
    pub fn input_channels(&self) -> usize {
        self.stages.first().map_or(0, |s| s.in_channels)
    }

    /// Walks `shape` through every stage.
    ///
    /// Returns the shape after each stage, or `ScanError::ShapeMismatch`
    /// naming the first stage that rejects its input.
    pub fn trace(&self, shape: (usize, usize, usize)) -> ScanResult<Vec<(usize, usize, usize)>> {
        let mut shapes = Vec::with_capacity(self.stages.len());
        let mut current = shape;
        for stage in &self.stages {
            current = stage.apply(current)?;
            shapes.push(current);
        }
        Ok(shapes)
    }

    /// Checks a single-sample tensor against the contract and returns the
    /// final output shape.
    pub fn check_tensor(&self, tensor: ArrayView3<'_, f32>) -> ScanResult<(usize, usize, usize)> {
        let shapes = self.trace(tensor.dim())?;
        shapes
            .last()
            .copied()
            .ok_or_else(|| ScanError::invalid_input("model contract has no stages"))
    }
}

impl Default for ModelShapeContract {
    fn default() -> Self {
        Self::reference()
    }
}
