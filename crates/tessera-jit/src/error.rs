//! JIT Error Types
//!
//! Error handling for IR construction and operator registration.

use std::fmt;

/// Result type for JIT operations.
pub type JitResult<T> = Result<T, JitError>;

/// JIT errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JitError {
    /// Operator name is not of the form `namespace::name`.
    InvalidSymbol(String),
    /// An operator with this qualified name is already registered.
    DuplicateOperator(String),
    /// No operator with this qualified name is registered.
    UnknownOperator(String),
    /// A registered kernel failed while running.
    KernelFailed {
        /// Qualified operator name.
        op: String,
        /// Failure description.
        message: String,
    },
}

impl fmt::Display for JitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSymbol(s) => write!(f, "Invalid operator symbol: {s:?}"),
            Self::DuplicateOperator(op) => write!(f, "Operator already registered: {op}"),
            Self::UnknownOperator(op) => write!(f, "Unknown operator: {op}"),
            Self::KernelFailed { op, message } => write!(f, "Operator {op} failed: {message}"),
        }
    }
}

impl std::error::Error for JitError {}
