//! Tessera Core - Shared Types for the Tessera Workspace
//!
//! Provides the pieces every other Tessera crate builds on: the unified
//! error type and the element-type traits tensors are generic over.
//!
//! # Key Features
//! - Unified `Error`/`Result` for tensor construction and layout operations
//! - `DType` runtime tags for the element types Tessera stores
//! - `Element` trait bounding tensor element types
//!
//! @version 0.1.0
//! @author Tessera Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

// =============================================================================
// Modules
// =============================================================================

pub mod dtype;
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

pub use dtype::{DType, Element};
pub use error::{Error, Result};

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        assert_eq!(<f32 as Element>::DTYPE, DType::F32);
        let err = Error::invalid_operation("bad");
        assert!(err.to_string().contains("bad"));
    }
}
