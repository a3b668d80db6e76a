//! Quantization Error Types
//!
//! Recoverable errors of the quantized kernels. Conditions the kernels treat
//! as programming errors (wrong input rank, unimplemented variants, missing
//! backend support) panic instead.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use thiserror::Error;

/// Result type for quantization operations.
pub type QuantResult<T> = Result<T, QuantError>;

/// Errors that can occur in quantization and quantized kernels.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantError {
    /// A pooling or convolution argument is malformed.
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The quantization configuration cannot be honoured.
    #[error("Invalid quantization config: {0}")]
    InvalidConfig(String),

    /// Computed output size is not positive.
    #[error("Output size for input {input} would be {output}; kernel too large for padded input")]
    EmptyOutput {
        /// Input extent along the dimension.
        input: usize,
        /// Computed output extent.
        output: i64,
    },

    /// A pooling window contains no valid input element.
    #[error("Pooling window at output ({row}, {col}) covers no input element")]
    EmptyWindow {
        /// Output row.
        row: usize,
        /// Output column.
        col: usize,
    },

    /// Underlying tensor operation failed.
    #[error(transparent)]
    Tensor(#[from] tessera_core::Error),
}

impl QuantError {
    /// Creates an invalid-argument error.
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuantError::invalid_argument("stride", "must be positive");
        assert_eq!(err.to_string(), "Invalid argument `stride`: must be positive");

        let err = QuantError::EmptyOutput { input: 2, output: 0 };
        assert!(err.to_string().contains("kernel too large"));
    }

    #[test]
    fn test_from_tensor_error() {
        let err: QuantError = tessera_core::Error::invalid_operation("permute").into();
        assert!(matches!(err, QuantError::Tensor(_)));
        assert!(err.to_string().contains("permute"));
    }
}
