//! Tessera JIT - Graph IR and Operator Registry
//!
//! A deliberately small IR for inspecting traced programs:
//!
//! - Graphs of blocks and nodes, with nested sub-blocks for control flow
//! - The `list_prim_ops` pass counting interpreter primitives
//! - A thread-safe registry for externally implemented operators
//!
//! # Example
//!
//! ```rust
//! use tessera_jit::{list_prim_ops, Graph, Symbol};
//!
//! let mut graph = Graph::new();
//! graph.block_mut().append(Symbol::prim("Constant"));
//! graph
//!     .block_mut()
//!     .append(Symbol::prim("If"))
//!     .add_block()
//!     .append(Symbol::prim("Constant"));
//!
//! let counts = list_prim_ops(&graph);
//! assert_eq!(counts[&Symbol::prim("Constant")], 2);
//! ```
//!
//! @version 0.1.0
//! @author Tessera Development Team

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod ir;
pub mod passes;
pub mod registry;

pub use error::{JitError, JitResult};
pub use ir::{AllNodes, Block, Graph, Node, Symbol, PRIM_NAMESPACE};
pub use passes::list_prim_ops;
pub use registry::{Kernel, OperatorRegistry, EXTERNAL_NAMESPACE};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_ignores_registered_ops() {
        let registry = OperatorRegistry::new();
        let symbol = registry
            .register_external("Echo", |inputs| {
                inputs
                    .first()
                    .cloned()
                    .ok_or_else(|| JitError::UnknownOperator("_caffe2::Echo".to_string()))
            })
            .unwrap();

        let mut graph = Graph::new();
        graph.block_mut().append(symbol.clone());
        graph.block_mut().append(Symbol::prim("Return"));

        let counts = list_prim_ops(&graph);
        assert_eq!(counts.len(), 1);
        assert!(!counts.contains_key(&symbol));
    }
}
