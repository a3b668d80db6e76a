//! Error Types - Tessera Core Error Handling
//!
//! Provides the error type shared by tensor construction and layout
//! operations across the Tessera workspace.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// The main error type for Tessera tensor operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Shape does not match the amount of data supplied.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// The expected shape.
        expected: Vec<usize>,
        /// The actual shape.
        actual: Vec<usize>,
    },

    /// Invalid dimension index.
    #[error("Invalid dimension: index {index} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid dimension index.
        index: usize,
        /// Number of dimensions in the tensor.
        ndim: usize,
    },

    /// Invalid operation for the given tensor.
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

// =============================================================================
// Result Type
// =============================================================================

/// A specialized Result type for Tessera operations.
pub type Result<T> = core::result::Result<T, Error>;

// =============================================================================
// Helper Functions
// =============================================================================

impl Error {
    /// Creates a new shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Creates a new invalid operation error.
    #[must_use]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::shape_mismatch(&[16], &[2, 4]);
        assert!(err.to_string().contains("Shape mismatch"));

        let err = Error::InvalidDimension { index: 5, ndim: 4 };
        assert_eq!(
            err.to_string(),
            "Invalid dimension: index 5 for tensor with 4 dimensions"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            Error::invalid_operation("permute"),
            Error::invalid_operation("permute")
        );
    }
}
