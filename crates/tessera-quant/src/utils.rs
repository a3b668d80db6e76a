//! Quantization Utilities
//!
//! Output-size arithmetic for pooling and convolution, and the float to
//! quantized tensor conversions used at kernel boundaries.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use tessera_tensor::Tensor;
use tracing::debug;

use crate::config::QuantConfig;
use crate::error::{QuantError, QuantResult};
use crate::params::{choose_quantization_params, find_min_max, QuantizationParams};

// =============================================================================
// Output Sizes
// =============================================================================

/// Computes the output extent of one pooled dimension.
///
/// `floor_or_ceil((input + 2 * padding - dilation * (kernel - 1) - 1) / stride) + 1`.
/// In ceil mode the last window must start inside the input or the left
/// padding; otherwise it is dropped.
pub fn pooling_output_shape(
    input: usize,
    kernel: usize,
    padding: usize,
    stride: usize,
    dilation: usize,
    ceil_mode: bool,
) -> QuantResult<usize> {
    if stride == 0 {
        return Err(QuantError::invalid_argument("stride", "must be positive"));
    }
    if kernel == 0 || dilation == 0 {
        return Err(QuantError::invalid_argument(
            "kernel_size",
            "kernel size and dilation must be positive",
        ));
    }
    let (input_i, kernel_i, padding_i) = (input as i64, kernel as i64, padding as i64);
    let (stride_i, dilation_i) = (stride as i64, dilation as i64);

    let numerator = input_i + 2 * padding_i - dilation_i * (kernel_i - 1) - 1
        + if ceil_mode { stride_i - 1 } else { 0 };
    let mut output = numerator.div_euclid(stride_i) + 1;

    if ceil_mode && (output - 1) * stride_i >= input_i + padding_i {
        output -= 1;
    }

    if output <= 0 {
        return Err(QuantError::EmptyOutput { input, output });
    }
    Ok(output as usize)
}

/// Output `[N, H, W, C]` of a 2D pooling over an NHWC input.
pub fn pool_output_sizes(
    input_size: &[usize],
    kernel: [usize; 2],
    stride: [usize; 2],
    padding: [usize; 2],
    dilation: [usize; 2],
    ceil_mode: bool,
) -> QuantResult<Vec<usize>> {
    let &[batch, height, width, channels] = input_size else {
        return Err(QuantError::invalid_argument(
            "input_size",
            format!("expected NHWC sizes, got {input_size:?}"),
        ));
    };
    let out_h = pooling_output_shape(height, kernel[0], padding[0], stride[0], dilation[0], ceil_mode)?;
    let out_w = pooling_output_shape(width, kernel[1], padding[1], stride[1], dilation[1], ceil_mode)?;
    Ok(vec![batch, out_h, out_w, channels])
}

/// Output `[N, H, W, C_out]` of a 2D convolution over an NHWC input with an
/// `[C_out, KH, KW, C_in]` weight.
pub fn conv_output_sizes(
    input_size: &[usize],
    weight_size: &[usize],
    stride: [usize; 2],
    padding: [usize; 2],
    dilation: [usize; 2],
) -> QuantResult<Vec<usize>> {
    let &[batch, height, width, _] = input_size else {
        return Err(QuantError::invalid_argument(
            "input_size",
            format!("expected NHWC sizes, got {input_size:?}"),
        ));
    };
    let &[out_channels, kernel_h, kernel_w, _] = weight_size else {
        return Err(QuantError::invalid_argument(
            "weight_size",
            format!("expected [C_out, KH, KW, C_in] sizes, got {weight_size:?}"),
        ));
    };
    let out_h = pooling_output_shape(height, kernel_h, padding[0], stride[0], dilation[0], false)?;
    let out_w = pooling_output_shape(width, kernel_w, padding[1], stride[1], dilation[1], false)?;
    Ok(vec![batch, out_h, out_w, out_channels])
}

// =============================================================================
// Tensor Conversion
// =============================================================================

/// Quantizes `tensor` with parameters spanning its observed range.
pub fn quantize_tensor(
    tensor: &Tensor<f32>,
    config: &QuantConfig,
) -> QuantResult<(Tensor<u8>, QuantizationParams)> {
    config.validate()?;
    let (qmin, qmax) = config.qrange();

    let data = tensor.to_vec();
    let (min, max) = find_min_max(&data);
    let (scale, zero_point) = choose_quantization_params(min, max, qmin, qmax, config.preserve_sparsity);
    let params = QuantizationParams {
        scale,
        zero_point,
        precision: config.precision,
        signed: config.signed,
    };
    debug!(min, max, scale, zero_point, "Chose quantization parameters");

    let quantized: Vec<u8> = data.iter().map(|&x| params.quantize(x) as u8).collect();
    Ok((Tensor::from_vec(quantized, tensor.shape())?, params))
}

/// Maps a quantized tensor back to floats.
pub fn dequantize_tensor(tensor: &Tensor<u8>, params: &QuantizationParams) -> Tensor<f32> {
    tensor.map(|q| params.dequantize(i32::from(q)))
}

// =============================================================================
// Tests
// =============================================================================
