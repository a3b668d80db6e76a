//! Tessera Tensor - Dense Arrays for Tessera Kernels
//!
//! Provides the `Tensor` type consumed by the quantization kernels and the
//! operator registry. Tensors are dense, strided, and share storage between
//! permuted views.
//!
//! # Example
//! ```rust
//! use tessera_tensor::Tensor;
//!
//! let nchw = Tensor::<f32>::from_vec((0..16).map(|x| x as f32).collect(), &[1, 1, 4, 4]).unwrap();
//! let nhwc = nchw.permute(&[0, 2, 3, 1]).unwrap().contiguous();
//! assert_eq!(nhwc.shape(), &[1, 4, 4, 1]);
//! ```
//!
//! @version 0.1.0
//! @author Tessera Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

// =============================================================================
// Modules
// =============================================================================

pub mod shape;
pub mod tensor;

// =============================================================================
// Re-exports
// =============================================================================

pub use shape::{Shape, Strides};
pub use tensor::Tensor;
pub use tessera_core::{DType, Element, Error, Result};
