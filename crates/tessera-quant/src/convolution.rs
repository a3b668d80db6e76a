//! Quantized Convolution
//!
//! Only the fused convolution-plus-ReLU entry point exists, and it fails
//! immediately until a kernel is written for it.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use tessera_tensor::Tensor;

use crate::error::QuantResult;

/// Quantized 2D convolution followed by ReLU over a float NCHW input and an
/// `[C_out, C_in / groups, KH, KW]` weight.
///
/// # Panics
/// Always; not implemented yet.
#[allow(clippy::too_many_arguments)]
pub fn quantized_conv_relu2d(
    _input: &Tensor<f32>,
    _weight: &Tensor<f32>,
    _bias: Option<&Tensor<f32>>,
    _stride: &[usize],
    _padding: &[usize],
    _dilation: &[usize],
    _groups: usize,
) -> QuantResult<Tensor<f32>> {
    unimplemented!("quantized_conv_relu2d is not implemented yet")
}
