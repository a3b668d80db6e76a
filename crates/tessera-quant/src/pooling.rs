//! Quantized Pooling - 8-bit Average and Max Pooling
//!
//! The 2D kernels take a float NCHW tensor, permute it to NHWC, quantize it
//! with parameters spanning the observed range, pool every window of every
//! channel in the quantized domain and dequantize the result back to NCHW
//! with the same parameters. Images in a batch are pooled in parallel.
//!
//! Argument lists follow the usual pooling conventions: a single value
//! applies to both spatial dimensions and an empty stride means "same as the
//! kernel".
//!
//! # Example
//!
//! ```rust
//! use tessera_quant::quantized_max_pool2d;
//! use tessera_tensor::Tensor;
//!
//! let input = Tensor::from_vec((0..16).map(|v| v as f32).collect(), &[1, 1, 4, 4]).unwrap();
//! let output = quantized_max_pool2d(&input, &[2], &[], &[0], &[1], false).unwrap();
//! assert_eq!(output.shape(), &[1, 1, 2, 2]);
//! ```
//!
//! @version 0.1.0
//! @author Tessera Development Team

use rayon::prelude::*;
use tessera_tensor::Tensor;
use tracing::debug;

use crate::backend::{require_supported, PoolGeometry};
use crate::config::QuantConfig;
use crate::error::{QuantError, QuantResult};
use crate::params::QuantizationParams;
use crate::utils::{dequantize_tensor, pooling_output_shape, quantize_tensor};

const NCHW_TO_NHWC: [usize; 4] = [0, 2, 3, 1];
const NHWC_TO_NCHW: [usize; 4] = [0, 3, 1, 2];

// =============================================================================
// Argument Handling
// =============================================================================

/// Expands a one- or two-element list to `[h, w]`.
///
/// An empty list yields `default` when one is given.
fn expand_param(name: &'static str, values: &[usize], default: Option<[usize; 2]>) -> QuantResult<[usize; 2]> {
    match (values, default) {
        ([], Some(default)) => Ok(default),
        (&[v], _) => Ok([v, v]),
        (&[h, w], _) => Ok([h, w]),
        _ => Err(QuantError::invalid_argument(
            name,
            format!("expected one or two values, got {}", values.len()),
        )),
    }
}

fn require_positive(name: &'static str, values: [usize; 2]) -> QuantResult<[usize; 2]> {
    if values.contains(&0) {
        return Err(QuantError::invalid_argument(name, "must be positive"));
    }
    Ok(values)
}

fn require_rank4(op: &str, input: &Tensor<f32>) {
    assert_eq!(
        input.ndim(),
        4,
        "{op} expects a 4D NCHW input, got shape {:?}",
        input.shape()
    );
}

/// Resolves the pooling geometry of an NCHW input.
fn resolve_geometry(
    input: &Tensor<f32>,
    kernel: [usize; 2],
    stride: [usize; 2],
    padding: [usize; 2],
    dilation: [usize; 2],
    ceil_mode: bool,
) -> QuantResult<PoolGeometry> {
    let (channels, input_h, input_w) = (input.size(1), input.size(2), input.size(3));
    if input_h == 0 || input_w == 0 {
        return Err(QuantError::invalid_argument(
            "input",
            format!("spatial dimensions must be non-empty, got {:?}", input.shape()),
        ));
    }
    for axis in 0..2 {
        if padding[axis] > kernel[axis] / 2 {
            return Err(QuantError::invalid_argument(
                "padding",
                format!(
                    "padding {} must be at most half of kernel size {}",
                    padding[axis], kernel[axis]
                ),
            ));
        }
    }

    let output_h = pooling_output_shape(input_h, kernel[0], padding[0], stride[0], dilation[0], ceil_mode)?;
    let output_w = pooling_output_shape(input_w, kernel[1], padding[1], stride[1], dilation[1], ceil_mode)?;

    Ok(PoolGeometry {
        channels,
        input_h,
        input_w,
        output_h,
        output_w,
        kernel,
        stride,
        padding,
        dilation,
    })
}

// =============================================================================
// Shared Pipeline
// =============================================================================

/// Quantizes `input` as NHWC, runs `pool_image` on every image in parallel
/// and dequantizes the result back to NCHW.
fn pool2d<F>(
    input: &Tensor<f32>,
    geometry: &PoolGeometry,
    config: &QuantConfig,
    pool_image: F,
) -> QuantResult<Tensor<f32>>
where
    F: Fn(&[u8], &mut [u8], &QuantizationParams) -> QuantResult<()> + Sync,
{
    let batch = input.size(0);
    let nhwc = input.permute(&NCHW_TO_NHWC)?.contiguous();
    let (quantized, params) = quantize_tensor(&nhwc, config)?;

    let mut output = vec![0u8; batch * geometry.output_len()];
    if geometry.output_len() > 0 {
        let input_data = quantized.to_vec();
        output
            .par_chunks_mut(geometry.output_len())
            .zip(input_data.par_chunks(geometry.input_len()))
            .try_for_each(|(out, image)| pool_image(image, out, &params))?;
    }

    let pooled = Tensor::from_vec(
        output,
        &[batch, geometry.output_h, geometry.output_w, geometry.channels],
    )?;
    let result = dequantize_tensor(&pooled, &params)
        .permute(&NHWC_TO_NCHW)?
        .contiguous();
    debug!(
        input = ?input.shape(),
        output = ?result.shape(),
        scale = params.scale,
        zero_point = params.zero_point,
        "Quantized pooling"
    );
    Ok(result)
}

// =============================================================================
// Average Pooling
// =============================================================================

/// Average-pools one quantized NHWC image.
///
/// Each output is the mean over the part of its window that lies inside the
/// input; padded positions are never counted.
fn avg_pool_image(
    input: &[u8],
    output: &mut [u8],
    geometry: &PoolGeometry,
    params: &QuantizationParams,
) -> QuantResult<()> {
    let channels = geometry.channels;
    let zero_point = params.zero_point;
    let qmax = params.qmax() as f32;
    let mut acc = vec![0i32; channels];

    for oh in 0..geometry.output_h {
        let (h_start, h_end) = avg_window(geometry, 0, oh, geometry.input_h);
        for ow in 0..geometry.output_w {
            let (w_start, w_end) = avg_window(geometry, 1, ow, geometry.input_w);

            let count = (h_end - h_start) * (w_end - w_start);
            if count == 0 {
                return Err(QuantError::EmptyWindow { row: oh, col: ow });
            }
            let multiplier = 1.0 / count as f32;

            acc.fill(0);
            for ih in h_start..h_end {
                for iw in w_start..w_end {
                    let pixel = &input[(ih * geometry.input_w + iw) * channels..][..channels];
                    for (a, &q) in acc.iter_mut().zip(pixel) {
                        *a += i32::from(q);
                    }
                }
            }

            let out = &mut output[(oh * geometry.output_w + ow) * channels..][..channels];
            for (o, &sum) in out.iter_mut().zip(&acc) {
                let centered = sum - zero_point * count as i32;
                let value = (centered as f32 * multiplier + zero_point as f32).round_ties_even();
                *o = value.clamp(0.0, qmax) as u8;
            }
        }
    }
    Ok(())
}

/// Returns the window `[start, end)` of output `out` along `axis`, clipped
/// to the input.
fn avg_window(geometry: &PoolGeometry, axis: usize, out: usize, extent: usize) -> (usize, usize) {
    let padding = geometry.padding[axis] as isize;
    let start = (out * geometry.stride[axis]) as isize - padding;
    let end = (start + geometry.kernel[axis] as isize).min(extent as isize + padding);

    let clipped_start = start.max(0) as usize;
    let clipped_end = (end.min(extent as isize).max(0) as usize).max(clipped_start);
    (clipped_start, clipped_end)
}

/// Quantized 2D average pooling over a float NCHW tensor.
///
/// Border windows average only the elements inside the input.
/// `count_include_pad` is accepted for signature compatibility and does not
/// change the result.
///
/// # Panics
/// Panics if `input` is not 4-dimensional.
pub fn quantized_avg_pool2d(
    input: &Tensor<f32>,
    kernel_size: &[usize],
    stride: &[usize],
    padding: &[usize],
    ceil_mode: bool,
    count_include_pad: bool,
) -> QuantResult<Tensor<f32>> {
    quantized_avg_pool2d_with_config(
        input,
        kernel_size,
        stride,
        padding,
        ceil_mode,
        count_include_pad,
        &QuantConfig::default(),
    )
}

/// [`quantized_avg_pool2d`] with explicit quantization settings.
#[allow(clippy::too_many_arguments)]
pub fn quantized_avg_pool2d_with_config(
    input: &Tensor<f32>,
    kernel_size: &[usize],
    stride: &[usize],
    padding: &[usize],
    ceil_mode: bool,
    _count_include_pad: bool,
    config: &QuantConfig,
) -> QuantResult<Tensor<f32>> {
    require_rank4("quantized_avg_pool2d", input);

    let kernel = require_positive("kernel_size", expand_param("kernel_size", kernel_size, None)?)?;
    let stride = require_positive("stride", expand_param("stride", stride, Some(kernel))?)?;
    let padding = expand_param("padding", padding, None)?;
    let geometry = resolve_geometry(input, kernel, stride, padding, [1, 1], ceil_mode)?;

    pool2d(input, &geometry, config, |image, out, params| {
        avg_pool_image(image, out, &geometry, params)
    })
}

// =============================================================================
// Max Pooling
// =============================================================================

/// Quantized 2D max pooling over a float NCHW tensor.
///
/// # Panics
/// Panics if `input` is not 4-dimensional.
pub fn quantized_max_pool2d(
    input: &Tensor<f32>,
    kernel_size: &[usize],
    stride: &[usize],
    padding: &[usize],
    dilation: &[usize],
    ceil_mode: bool,
) -> QuantResult<Tensor<f32>> {
    quantized_max_pool2d_with_config(
        input,
        kernel_size,
        stride,
        padding,
        dilation,
        ceil_mode,
        &QuantConfig::default(),
    )
}

/// [`quantized_max_pool2d`] with explicit quantization settings.
///
/// # Panics
/// Panics if `input` is not 4-dimensional or the configured backend is
/// unsupported.
#[allow(clippy::too_many_arguments)]
pub fn quantized_max_pool2d_with_config(
    input: &Tensor<f32>,
    kernel_size: &[usize],
    stride: &[usize],
    padding: &[usize],
    dilation: &[usize],
    ceil_mode: bool,
    config: &QuantConfig,
) -> QuantResult<Tensor<f32>> {
    require_rank4("quantized_max_pool2d", input);
    let backend = config.backend.instance();
    require_supported(backend, "quantized max pooling");

    let kernel = require_positive("kernel_size", expand_param("kernel_size", kernel_size, None)?)?;
    let stride = require_positive("stride", expand_param("stride", stride, Some(kernel))?)?;
    let padding = expand_param("padding", padding, None)?;
    let dilation = require_positive("dilation", expand_param("dilation", dilation, Some([1, 1]))?)?;
    let geometry = resolve_geometry(input, kernel, stride, padding, dilation, ceil_mode)?;

    pool2d(input, &geometry, config, |image, out, _params| {
        backend.max_pool_image(image, out, &geometry)
    })
}

// =============================================================================
// Unimplemented Variants
// =============================================================================

/// Quantized 1D average pooling.
///
/// # Panics
/// Always; not implemented yet.
pub fn quantized_avg_pool1d(
    _input: &Tensor<f32>,
    _kernel_size: &[usize],
    _stride: &[usize],
    _padding: &[usize],
    _ceil_mode: bool,
    _count_include_pad: bool,
) -> QuantResult<Tensor<f32>> {
    unimplemented!("quantized_avg_pool1d is not implemented yet")
}

/// Quantized 3D average pooling.
///
/// # Panics
/// Always; not implemented yet.
pub fn quantized_avg_pool3d(
    _input: &Tensor<f32>,
    _kernel_size: &[usize],
    _stride: &[usize],
    _padding: &[usize],
    _ceil_mode: bool,
    _count_include_pad: bool,
) -> QuantResult<Tensor<f32>> {
    unimplemented!("quantized_avg_pool3d is not implemented yet")
}

/// Quantized 1D max pooling.
///
/// # Panics
/// Always; not implemented yet.
pub fn quantized_max_pool1d(
    _input: &Tensor<f32>,
    _kernel_size: &[usize],
    _stride: &[usize],
    _padding: &[usize],
    _dilation: &[usize],
    _ceil_mode: bool,
) -> QuantResult<Tensor<f32>> {
    unimplemented!("quantized_max_pool1d is not implemented yet")
}

/// Quantized 3D max pooling.
///
/// # Panics
/// Always; not implemented yet.
pub fn quantized_max_pool3d(
    _input: &Tensor<f32>,
    _kernel_size: &[usize],
    _stride: &[usize],
    _padding: &[usize],
    _dilation: &[usize],
    _ceil_mode: bool,
) -> QuantResult<Tensor<f32>> {
    unimplemented!("quantized_max_pool3d is not implemented yet")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;

    fn ramp(shape: &[usize]) -> Tensor<f32> {
        let n: usize = shape.iter().product();
        Tensor::from_vec((0..n).map(|v| v as f32).collect(), shape).unwrap()
    }

    fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() <= tolerance, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_expand_param() {
        assert_eq!(expand_param("k", &[3], None).unwrap(), [3, 3]);
        assert_eq!(expand_param("k", &[3, 2], None).unwrap(), [3, 2]);
        assert_eq!(expand_param("s", &[], Some([2, 2])).unwrap(), [2, 2]);
        assert!(expand_param("k", &[], None).is_err());
        assert!(expand_param("k", &[1, 2, 3], None).is_err());
    }

    #[test]
    fn test_avg_pool_blocks() {
        let input = ramp(&[1, 1, 4, 4]);
        let output = quantized_avg_pool2d(&input, &[2, 2], &[2, 2], &[0, 0], false, false).unwrap();

        assert_eq!(output.shape(), &[1, 1, 2, 2]);
        // One quantization step of the [0, 15] range.
        assert_close(&output.to_vec(), &[2.5, 4.5, 10.5, 12.5], 15.0 / 255.0);
    }

    #[test]
    fn test_max_pool_blocks() {
        let input = ramp(&[1, 1, 4, 4]);
        let output = quantized_max_pool2d(&input, &[2, 2], &[2, 2], &[0, 0], &[1, 1], false).unwrap();

        assert_eq!(output.shape(), &[1, 1, 2, 2]);
        assert_close(&output.to_vec(), &[5.0, 7.0, 13.0, 15.0], 15.0 / 255.0);
    }

    #[test]
    fn test_pooling_keeps_channels_apart() {
        // Channel 1 holds the negated ramp of channel 0.
        let mut data: Vec<f32> = (0..16).map(|v| v as f32).collect();
        data.extend((0..16).map(|v| -(v as f32)));
        let input = Tensor::from_vec(data, &[1, 2, 4, 4]).unwrap();

        let output = quantized_max_pool2d(&input, &[2], &[], &[0], &[1], false).unwrap();
        assert_eq!(output.shape(), &[1, 2, 2, 2]);
        assert_close(&output.to_vec(), &[5.0, 7.0, 13.0, 15.0, 0.0, -2.0, -8.0, -10.0], 30.0 / 255.0);
    }

    #[test]
    fn test_batch_images_pooled_independently() {
        let input = ramp(&[3, 1, 4, 4]);
        let output = quantized_max_pool2d(&input, &[4], &[4], &[0], &[1], false).unwrap();

        assert_eq!(output.shape(), &[3, 1, 1, 1]);
        assert_close(&output.to_vec(), &[15.0, 31.0, 47.0], 47.0 / 255.0);
    }

    #[test]
    fn test_avg_pool_padding_counts() {
        let input = Tensor::from_vec(vec![4.0; 4], &[1, 1, 2, 2]).unwrap();

        // Corner window covers one padded row and column.
        let excluded = quantized_avg_pool2d(&input, &[2], &[1], &[1], false, false).unwrap();
        assert_eq!(excluded.shape(), &[1, 1, 3, 3]);
        assert_close(&excluded.to_vec(), &[4.0; 9], 4.0 / 255.0);

        // Padding never enters the divisor, whatever the flag says.
        let included = quantized_avg_pool2d(&input, &[2], &[1], &[1], false, true).unwrap();
        assert_close(&included.to_vec(), &[4.0; 9], 4.0 / 255.0);
    }

    #[test]
    fn test_empty_spatial_input_rejected() {
        let input = Tensor::from_vec(Vec::new(), &[1, 1, 0, 4]).unwrap();
        assert!(matches!(
            quantized_max_pool2d(&input, &[2], &[1], &[1], &[1], false),
            Err(QuantError::InvalidArgument { name: "input", .. })
        ));
        assert!(matches!(
            quantized_avg_pool2d(&input, &[2], &[1], &[1], false, true),
            Err(QuantError::InvalidArgument { name: "input", .. })
        ));
    }

    #[test]
    fn test_ceil_mode_output_shape() {
        let input = ramp(&[1, 1, 10, 10]);
        let floor = quantized_avg_pool2d(&input, &[3], &[2], &[1], false, true).unwrap();
        let ceil = quantized_avg_pool2d(&input, &[3], &[2], &[1], true, true).unwrap();

        assert_eq!(floor.shape(), &[1, 1, 5, 5]);
        assert_eq!(ceil.shape(), &[1, 1, 6, 6]);
    }

    #[test]
    fn test_max_pool_dilation() {
        let input = ramp(&[1, 1, 5, 5]);
        let output = quantized_max_pool2d(&input, &[2], &[1], &[0], &[2], false).unwrap();

        assert_eq!(output.shape(), &[1, 1, 3, 3]);
        assert_close(
            &output.to_vec(),
            &[12.0, 13.0, 14.0, 17.0, 18.0, 19.0, 22.0, 23.0, 24.0],
            24.0 / 255.0,
        );
    }

    #[test]
    fn test_invalid_arguments() {
        let input = ramp(&[1, 1, 4, 4]);
        assert!(matches!(
            quantized_avg_pool2d(&input, &[0], &[], &[0], false, false),
            Err(QuantError::InvalidArgument { name: "kernel_size", .. })
        ));
        assert!(quantized_avg_pool2d(&input, &[2], &[0], &[0], false, false).is_err());
        assert!(quantized_avg_pool2d(&input, &[2], &[], &[2], false, false).is_err());
        assert!(quantized_max_pool2d(&input, &[2, 2, 2], &[], &[0], &[1], false).is_err());
        assert!(quantized_max_pool2d(&input, &[8], &[], &[0], &[1], false).is_err());
    }

    #[test]
    fn test_signed_config_rejected() {
        let input = ramp(&[1, 1, 4, 4]);
        let config = QuantConfig::new().signed(true);
        assert!(quantized_avg_pool2d_with_config(&input, &[2], &[], &[0], false, false, &config).is_err());
    }

    #[test]
    #[should_panic(expected = "expects a 4D NCHW input")]
    fn test_rank_mismatch_panics() {
        let input = ramp(&[4, 4]);
        let _ = quantized_avg_pool2d(&input, &[2], &[], &[0], false, false);
    }

    #[test]
    #[should_panic(expected = "backend does not support quantized max pooling")]
    fn test_unavailable_backend_panics() {
        let input = ramp(&[1, 1, 4, 4]);
        let config = QuantConfig::new().backend(BackendKind::Unavailable);
        let _ = quantized_max_pool2d_with_config(&input, &[2], &[], &[0], &[1], false, &config);
    }

    #[test]
    #[should_panic(expected = "quantized_avg_pool1d is not implemented yet")]
    fn test_avg_pool1d_unimplemented() {
        let _ = quantized_avg_pool1d(&ramp(&[1, 1, 4]), &[2], &[], &[0], false, false);
    }

    #[test]
    #[should_panic(expected = "quantized_avg_pool3d is not implemented yet")]
    fn test_avg_pool3d_unimplemented() {
        let _ = quantized_avg_pool3d(&ramp(&[1, 1, 2, 2, 2]), &[2], &[], &[0], false, false);
    }

    #[test]
    #[should_panic(expected = "quantized_max_pool1d is not implemented yet")]
    fn test_max_pool1d_unimplemented() {
        let _ = quantized_max_pool1d(&ramp(&[1, 1, 4]), &[2], &[], &[0], &[1], false);
    }

    #[test]
    #[should_panic(expected = "quantized_max_pool3d is not implemented yet")]
    fn test_max_pool3d_unimplemented() {
        let _ = quantized_max_pool3d(&ramp(&[1, 1, 2, 2, 2]), &[2], &[], &[0], &[1], false);
    }
}
