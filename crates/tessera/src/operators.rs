//! Built-in Operators
//!
//! Registers the kernels Tessera implements outside the IR under the
//! external operator namespace.

use std::sync::OnceLock;

use tessera_jit::{JitError, JitResult, OperatorRegistry, Symbol};
use tessera_quant::quantized_relu;
use tessera_tensor::Tensor;
use tracing::debug;

/// Unqualified name of the quantized ReLU operator.
pub const QRELU: &str = "QRelu";

fn qrelu_kernel(inputs: &[Tensor<f32>]) -> JitResult<Tensor<f32>> {
    let op = || format!("{}::{QRELU}", tessera_jit::EXTERNAL_NAMESPACE);
    let [input] = inputs else {
        return Err(JitError::KernelFailed {
            op: op(),
            message: format!("expected 1 input, got {}", inputs.len()),
        });
    };
    quantized_relu(input).map_err(|e| JitError::KernelFailed {
        op: op(),
        message: e.to_string(),
    })
}

/// Registers every built-in operator in `registry`, returning their symbols.
pub fn register_builtin_operators(registry: &OperatorRegistry) -> JitResult<Vec<Symbol>> {
    let symbols = vec![registry.register_external(QRELU, qrelu_kernel)?];
    debug!(count = symbols.len(), "Registered built-in operators");
    Ok(symbols)
}

/// Returns the global registry with the built-in operators registered.
///
/// Registration happens once per process.
pub fn builtin_operators() -> &'static OperatorRegistry {
    static REGISTERED: OnceLock<()> = OnceLock::new();
    let registry = OperatorRegistry::global();
    REGISTERED.get_or_init(|| {
        if let Err(err) = register_builtin_operators(registry) {
            // Another caller registered them directly.
            debug!(%err, "Built-in operators already present");
        }
    });
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_qrelu() {
        let registry = OperatorRegistry::new();
        let symbols = register_builtin_operators(&registry).unwrap();

        assert_eq!(symbols, vec![Symbol::new("_caffe2", "QRelu")]);
        assert!(register_builtin_operators(&registry).is_err());
    }

    #[test]
    fn test_qrelu_kernel_checks_arity() {
        assert!(matches!(qrelu_kernel(&[]), Err(JitError::KernelFailed { .. })));
    }

    #[test]
    fn test_builtin_operators_idempotent() {
        let first = builtin_operators();
        let second = builtin_operators();
        assert!(std::ptr::eq(first, second));
        assert!(first.contains(&Symbol::new("_caffe2", QRELU)));
    }
}
