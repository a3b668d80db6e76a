//! Quantization Backend - Pluggable Kernel Providers
//!
//! A backend supplies the innermost quantized reductions and reports whether
//! it can run on this machine. Callers check support up front; an unsupported
//! backend is a hard failure rather than a silent fallback.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use core::fmt;

use tessera_tensor::Tensor;

use crate::error::{QuantError, QuantResult};

// =============================================================================
// Pool Geometry
// =============================================================================

/// Geometry of a 2D pooling pass over one NHWC image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolGeometry {
    /// Number of channels (innermost dimension).
    pub channels: usize,
    /// Input height.
    pub input_h: usize,
    /// Input width.
    pub input_w: usize,
    /// Output height.
    pub output_h: usize,
    /// Output width.
    pub output_w: usize,
    /// Kernel height and width.
    pub kernel: [usize; 2],
    /// Stride along height and width.
    pub stride: [usize; 2],
    /// Implicit zero padding along height and width.
    pub padding: [usize; 2],
    /// Spacing between kernel taps along height and width.
    pub dilation: [usize; 2],
}

impl PoolGeometry {
    /// Number of input elements in one image.
    pub fn input_len(&self) -> usize {
        self.input_h * self.input_w * self.channels
    }

    /// Number of output elements in one image.
    pub fn output_len(&self) -> usize {
        self.output_h * self.output_w * self.channels
    }

    /// Returns the valid input rows or columns tapped by output position
    /// `out` along `axis` (0 = height, 1 = width).
    pub(crate) fn taps(&self, axis: usize, out: usize, extent: usize) -> impl Iterator<Item = usize> {
        let dilation = self.dilation[axis];
        let start = (out * self.stride[axis]) as isize - self.padding[axis] as isize;
        let span = (self.kernel[axis] - 1) * dilation + 1;
        let end = (start + span as isize).min(extent as isize);

        // Skip taps that fall in the leading padding, keeping dilation phase.
        let mut first = start;
        while first < 0 {
            first += dilation as isize;
        }
        (first..end.max(first)).step_by(dilation).map(|i| i as usize)
    }
}

// =============================================================================
// Backend Trait
// =============================================================================

/// Provider of quantized kernels.
pub trait QuantBackend: fmt::Debug + Send + Sync {
    /// Returns the backend's name.
    fn name(&self) -> &'static str;

    /// Returns whether the backend can run on this machine.
    fn is_supported(&self) -> bool;

    /// Max-pools one quantized NHWC image into `output`.
    fn max_pool_image(&self, input: &[u8], output: &mut [u8], geometry: &PoolGeometry) -> QuantResult<()>;
}

/// Panics unless `backend` is supported.
///
/// # Panics
/// Panics with "`<backend>` backend does not support `<operation>`".
pub fn require_supported(backend: &dyn QuantBackend, operation: &str) {
    assert!(
        backend.is_supported(),
        "{} backend does not support {operation}",
        backend.name()
    );
}

// =============================================================================
// Reference Backend
// =============================================================================

/// Portable scalar kernels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBackend;

impl QuantBackend for ReferenceBackend {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn max_pool_image(&self, input: &[u8], output: &mut [u8], geometry: &PoolGeometry) -> QuantResult<()> {
        debug_assert_eq!(input.len(), geometry.input_len());
        debug_assert_eq!(output.len(), geometry.output_len());
        let channels = geometry.channels;

        for oh in 0..geometry.output_h {
            for ow in 0..geometry.output_w {
                let out = &mut output[(oh * geometry.output_w + ow) * channels..][..channels];
                out.fill(u8::MIN);

                let mut taps = 0usize;
                for ih in geometry.taps(0, oh, geometry.input_h) {
                    for iw in geometry.taps(1, ow, geometry.input_w) {
                        let pixel = &input[(ih * geometry.input_w + iw) * channels..][..channels];
                        for (o, &v) in out.iter_mut().zip(pixel) {
                            *o = (*o).max(v);
                        }
                        taps += 1;
                    }
                }

                if taps == 0 {
                    return Err(QuantError::EmptyWindow { row: oh, col: ow });
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unavailable Backend
// =============================================================================

/// Backend that is never supported; every kernel fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBackend;

impl QuantBackend for UnavailableBackend {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_supported(&self) -> bool {
        false
    }

    fn max_pool_image(&self, _input: &[u8], _output: &mut [u8], _geometry: &PoolGeometry) -> QuantResult<()> {
        require_supported(self, "quantized max pooling");
        Ok(())
    }
}

// =============================================================================
// Matrix Packing
// =============================================================================

/// An `[N, K]` int8 weight matrix stored K-major for the quantized GEMM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedMatrix {
    data: Vec<i8>,
    rows: usize,
    cols: usize,
}

impl PackedMatrix {
    /// Number of output rows (`N`).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Reduction length (`K`).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Packed values, `K` blocks of `N`.
    pub fn data(&self) -> &[i8] {
        &self.data
    }

    /// Returns the original element `[n, k]`.
    pub fn get(&self, n: usize, k: usize) -> Option<i8> {
        if n < self.rows && k < self.cols {
            Some(self.data[k * self.rows + n])
        } else {
            None
        }
    }
}

/// Packs a quantized `[N, K]` weight for `backend`.
///
/// # Panics
/// Panics if `backend` is unsupported.
pub fn pack_quantized_matrix(weight: &Tensor<i8>, backend: &dyn QuantBackend) -> QuantResult<PackedMatrix> {
    require_supported(backend, "quantized matrix packing");

    if weight.ndim() != 2 {
        return Err(QuantError::invalid_argument(
            "weight",
            format!("expected a 2D [N, K] matrix, got shape {:?}", weight.shape()),
        ));
    }
    let (rows, cols) = (weight.size(0), weight.size(1));

    // A transposed view is exactly the K-major order.
    let data = weight.permute(&[1, 0])?.to_vec();
    Ok(PackedMatrix { data, rows, cols })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(h: usize, w: usize, kernel: usize, stride: usize, padding: usize, dilation: usize) -> PoolGeometry {
        let out = |n: usize| (n + 2 * padding - dilation * (kernel - 1) - 1) / stride + 1;
        PoolGeometry {
            channels: 1,
            input_h: h,
            input_w: w,
            output_h: out(h),
            output_w: out(w),
            kernel: [kernel; 2],
            stride: [stride; 2],
            padding: [padding; 2],
            dilation: [dilation; 2],
        }
    }

    #[test]
    fn test_taps_skip_padding() {
        let g = geometry(4, 4, 3, 1, 1, 1);
        assert_eq!(g.taps(0, 0, 4).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(g.taps(0, 3, 4).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_taps_with_dilation() {
        let g = geometry(7, 7, 3, 1, 0, 2);
        assert_eq!(g.taps(1, 0, 7).collect::<Vec<_>>(), vec![0, 2, 4]);

        let g = geometry(7, 7, 3, 1, 1, 2);
        // Window starts at -1: taps -1, 1, 3 with -1 in padding.
        assert_eq!(g.taps(1, 0, 7).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_reference_max_pool() {
        let input: Vec<u8> = (0..16).collect();
        let g = geometry(4, 4, 2, 2, 0, 1);
        let mut output = vec![0u8; g.output_len()];

        ReferenceBackend.max_pool_image(&input, &mut output, &g).unwrap();
        assert_eq!(output, vec![5, 7, 13, 15]);
    }

    #[test]
    fn test_reference_max_pool_channels() {
        // 2x2 image with two interleaved channels.
        let input = vec![1u8, 9, 2, 8, 3, 7, 4, 6];
        let g = PoolGeometry {
            channels: 2,
            ..geometry(2, 2, 2, 1, 0, 1)
        };
        let mut output = vec![0u8; g.output_len()];

        ReferenceBackend.max_pool_image(&input, &mut output, &g).unwrap();
        assert_eq!(output, vec![4, 9]);
    }

    #[test]
    #[should_panic(expected = "unavailable backend does not support quantized max pooling")]
    fn test_unavailable_max_pool_panics() {
        let g = geometry(2, 2, 1, 1, 0, 1);
        let mut output = vec![0u8; 4];
        let _ = UnavailableBackend.max_pool_image(&[0; 4], &mut output, &g);
    }

    #[test]
    fn test_pack_is_k_major() {
        let weight = Tensor::from_vec(vec![1i8, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let packed = pack_quantized_matrix(&weight, &ReferenceBackend).unwrap();

        assert_eq!((packed.rows(), packed.cols()), (2, 3));
        assert_eq!(packed.data(), &[1, 4, 2, 5, 3, 6]);
        assert_eq!(packed.get(1, 2), Some(6));
        assert_eq!(packed.get(2, 0), None);
    }

    #[test]
    fn test_pack_rejects_non_matrix() {
        let weight = Tensor::from_vec(vec![1i8, 2, 3], &[3]).unwrap();
        assert!(pack_quantized_matrix(&weight, &ReferenceBackend).is_err());
    }

    #[test]
    #[should_panic(expected = "backend does not support quantized matrix packing")]
    fn test_pack_on_unavailable_backend_panics() {
        let weight = Tensor::from_vec(vec![1i8; 4], &[2, 2]).unwrap();
        let _ = pack_quantized_matrix(&weight, &UnavailableBackend);
    }
}
