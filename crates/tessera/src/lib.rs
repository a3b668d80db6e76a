//! # Tessera - Graph Teardown and Quantized Pooling
//!
//! Tessera bundles two independent pieces of a tensor framework's runtime:
//!
//! - **Autograd teardown**: computation graphs of any depth are freed with a
//!   heap work list, never by recursion, whether they are held through
//!   `Arc<Node>` edges or in an index-based `NodeArena`.
//! - **Quantized kernels**: 8-bit affine quantization with 2D average and
//!   max pooling over float NCHW tensors, behind a capability-checked backend.
//!
//! A small JIT IR with a primitive-op listing pass and an operator registry
//! ties the quantized ReLU into the operator namespace.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera::prelude::*;
//!
//! // A long history is released without growing the stack.
//! let mut head = Arc::new(Node::new(GraphRoot, Vec::new()));
//! for _ in 0..10_000 {
//!     head = Arc::new(Node::new(GraphRoot, vec![Edge::new(head, 0)]));
//! }
//! assert_eq!(destroy(head), 10_001);
//!
//! // Pool in the quantized domain.
//! let input = Tensor::from_vec((0..16).map(|v| v as f32).collect(), &[1, 1, 4, 4]).unwrap();
//! let pooled = quantized_max_pool2d(&input, &[2], &[2], &[0], &[1], false).unwrap();
//! assert_eq!(pooled.shape(), &[1, 1, 2, 2]);
//! ```
//!
//! # Feature Flags
//!
//! - `full` (default): all features enabled
//! - `autograd`: computation nodes and teardown
//! - `quant`: quantization utilities and kernels
//! - `jit`: IR, `list_prim_ops` and the operator registry
//!
//! @version 0.1.0
//! @author Tessera Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// Core Re-exports
// =============================================================================

pub use tessera_core as core;

pub use tessera_tensor as tensor;

#[cfg(feature = "autograd")]
pub use tessera_autograd as autograd;

// =============================================================================
// Kernel Re-exports
// =============================================================================

#[cfg(feature = "quant")]
pub use tessera_quant as quant;

#[cfg(feature = "jit")]
pub use tessera_jit as jit;

// =============================================================================
// Built-in Operators
// =============================================================================

#[cfg(all(feature = "quant", feature = "jit"))]
mod operators;

#[cfg(all(feature = "quant", feature = "jit"))]
pub use operators::{builtin_operators, register_builtin_operators, QRELU};

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for working with Tessera.
///
/// ```rust
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use tessera_core::{DType, Element, Error, Result};
    pub use tessera_tensor::Tensor;

    #[cfg(feature = "autograd")]
    pub use tessera_autograd::{
        destroy, AnomalyMetadata, Edge, GraphRoot, Node, NodeArena, NodeFunction, NodeHandle,
        SavedTensors,
    };

    #[cfg(feature = "quant")]
    pub use tessera_quant::{
        dequantize_tensor, quantize_tensor, quantized_avg_pool2d, quantized_max_pool2d,
        quantized_relu, BackendKind, QuantConfig, QuantError, QuantResult, QuantizationParams,
    };

    #[cfg(feature = "jit")]
    pub use tessera_jit::{list_prim_ops, Graph as IrGraph, OperatorRegistry, Symbol};
}

// =============================================================================
// Version Information
// =============================================================================

/// Returns the version of Tessera.
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns a string describing the enabled features.
#[must_use]
pub fn features() -> String {
    let mut features = vec!["core"];

    #[cfg(feature = "autograd")]
    features.push("autograd");

    #[cfg(feature = "quant")]
    features.push("quant");

    #[cfg(feature = "jit")]
    features.push("jit");

    features.join(", ")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }

    #[test]
    fn test_features() {
        let f = features();
        assert!(f.starts_with("core"));
        #[cfg(feature = "quant")]
        assert!(f.contains("quant"));
    }
}
