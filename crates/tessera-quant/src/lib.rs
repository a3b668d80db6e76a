//! Tessera Quant - 8-bit Quantized Kernels
//!
//! Affine 8-bit quantization and the kernels that run on it. Float tensors
//! enter and leave through `quantize_tensor` / `dequantize_tensor`; the 2D
//! pooling kernels do that conversion internally so callers stay in `f32`.
//!
//! - **Parameters** - scale/zero-point selection spanning an observed range
//! - **Pooling** - 2D average and max pooling over NCHW input
//! - **Backends** - pluggable, capability-checked kernel providers
//! - **Placeholders** - 1D/3D pooling and fused conv-relu fail fast
//!
//! # Example
//! ```rust
//! use tessera_quant::quantized_avg_pool2d;
//! use tessera_tensor::Tensor;
//!
//! let input = Tensor::from_vec((0..16).map(|v| v as f32).collect(), &[1, 1, 4, 4]).unwrap();
//! let output = quantized_avg_pool2d(&input, &[2, 2], &[2, 2], &[0, 0], false, false).unwrap();
//! assert_eq!(output.shape(), &[1, 1, 2, 2]);
//! ```
//!
//! @version 0.1.0
//! @author Tessera Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::should_implement_trait)]

pub mod backend;
pub mod config;
pub mod convolution;
pub mod error;
pub mod params;
pub mod pooling;
pub mod relu;
pub mod utils;

pub use backend::{
    pack_quantized_matrix, require_supported, PackedMatrix, PoolGeometry, QuantBackend,
    ReferenceBackend, UnavailableBackend,
};
pub use config::{BackendKind, QuantConfig, BACKEND_ENV_VAR};
pub use convolution::quantized_conv_relu2d;
pub use error::{QuantError, QuantResult};
pub use params::{choose_quantization_params, find_min_max, qrange, QuantizationParams};
pub use pooling::{
    quantized_avg_pool1d, quantized_avg_pool2d, quantized_avg_pool2d_with_config,
    quantized_avg_pool3d, quantized_max_pool1d, quantized_max_pool2d,
    quantized_max_pool2d_with_config, quantized_max_pool3d,
};
pub use relu::{quantized_relu, quantized_relu_with_config};
pub use utils::{
    conv_output_sizes, dequantize_tensor, pool_output_sizes, pooling_output_shape,
    quantize_tensor,
};

// =============================================================================
// Constants
// =============================================================================

/// Default bit width of quantized values.
pub const DEFAULT_PRECISION: u8 = 8;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_precision() {
        assert_eq!(QuantConfig::default().precision, DEFAULT_PRECISION);
        assert_eq!(qrange(DEFAULT_PRECISION, false), (0, 255));
    }
}
