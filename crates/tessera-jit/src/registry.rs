//! Operator Registry
//!
//! Maps qualified operator symbols to kernels. Operators implemented outside
//! the IR's own namespaces are registered under `_caffe2::`.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tessera_tensor::Tensor;
use tracing::debug;

use crate::error::{JitError, JitResult};
use crate::ir::Symbol;

/// Namespace for externally implemented operators.
pub const EXTERNAL_NAMESPACE: &str = "_caffe2";

/// A registered operator implementation.
pub type Kernel = Arc<dyn Fn(&[Tensor<f32>]) -> JitResult<Tensor<f32>> + Send + Sync>;

/// Thread-safe table of operator kernels.
#[derive(Default)]
pub struct OperatorRegistry {
    ops: RwLock<FxHashMap<Symbol, Kernel>>,
}

impl OperatorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static OperatorRegistry {
        static GLOBAL: OnceLock<OperatorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(OperatorRegistry::new)
    }

    /// Registers `kernel` as `symbol`.
    pub fn register<F>(&self, symbol: Symbol, kernel: F) -> JitResult<()>
    where
        F: Fn(&[Tensor<f32>]) -> JitResult<Tensor<f32>> + Send + Sync + 'static,
    {
        let mut ops = self.ops.write();
        if ops.contains_key(&symbol) {
            return Err(JitError::DuplicateOperator(symbol.to_string()));
        }
        debug!(op = %symbol, "Registered operator");
        ops.insert(symbol, Arc::new(kernel));
        Ok(())
    }

    /// Registers an externally implemented operator as `_caffe2::<name>`.
    pub fn register_external<F>(&self, name: &str, kernel: F) -> JitResult<Symbol>
    where
        F: Fn(&[Tensor<f32>]) -> JitResult<Tensor<f32>> + Send + Sync + 'static,
    {
        let symbol = Symbol::new(EXTERNAL_NAMESPACE, name);
        self.register(symbol.clone(), kernel)?;
        Ok(symbol)
    }

    /// Returns the kernel registered as `symbol`.
    pub fn get(&self, symbol: &Symbol) -> Option<Kernel> {
        self.ops.read().get(symbol).cloned()
    }

    /// Returns whether `symbol` is registered.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.ops.read().contains_key(symbol)
    }

    /// Runs the operator registered as `symbol`.
    pub fn call(&self, symbol: &Symbol, inputs: &[Tensor<f32>]) -> JitResult<Tensor<f32>> {
        // Clone the kernel out so it runs without the lock held.
        let kernel = self
            .get(symbol)
            .ok_or_else(|| JitError::UnknownOperator(symbol.to_string()))?;
        kernel(inputs)
    }

    /// Returns the registered symbols, sorted.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.ops.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Returns the number of registered operators.
    pub fn len(&self) -> usize {
        self.ops.read().len()
    }

    /// Returns whether no operator is registered.
    pub fn is_empty(&self) -> bool {
        self.ops.read().is_empty()
    }
}

impl std::fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("ops", &self.symbols())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(inputs: &[Tensor<f32>]) -> JitResult<Tensor<f32>> {
        inputs.first().cloned().ok_or_else(|| JitError::KernelFailed {
            op: "test::identity".to_string(),
            message: "expected one input".to_string(),
        })
    }

    #[test]
    fn test_register_external() {
        let registry = OperatorRegistry::new();
        let symbol = registry.register_external("Identity", identity).unwrap();

        assert_eq!(symbol.to_string(), "_caffe2::Identity");
        assert!(registry.contains(&symbol));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = OperatorRegistry::new();
        registry.register_external("Identity", identity).unwrap();

        let err = registry.register_external("Identity", identity).unwrap_err();
        assert_eq!(err, JitError::DuplicateOperator("_caffe2::Identity".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_call() {
        let registry = OperatorRegistry::new();
        let symbol = registry.register_external("Identity", identity).unwrap();
        let input = Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();

        let output = registry.call(&symbol, &[input]).unwrap();
        assert_eq!(output.to_vec(), vec![1.0, 2.0]);

        assert!(matches!(
            registry.call(&symbol, &[]),
            Err(JitError::KernelFailed { .. })
        ));
        assert!(matches!(
            registry.call(&Symbol::new("aten", "missing"), &[]),
            Err(JitError::UnknownOperator(_))
        ));
    }

    #[test]
    fn test_symbols_sorted() {
        let registry = OperatorRegistry::new();
        registry.register(Symbol::new("b", "op"), identity).unwrap();
        registry.register(Symbol::new("a", "op"), identity).unwrap();

        let names: Vec<String> = registry.symbols().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["a::op", "b::op"]);
    }
}
