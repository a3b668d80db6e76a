//! Graph Passes
//!
//! Read-only analyses over the IR.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ir::{Graph, Symbol};

/// Counts every `prim::` node in `graph`, including nodes inside nested
/// sub-blocks at any depth.
pub fn list_prim_ops(graph: &Graph) -> FxHashMap<Symbol, i64> {
    let mut counts: FxHashMap<Symbol, i64> = FxHashMap::default();
    for node in graph.all_nodes().filter(|n| n.kind().is_prim()) {
        *counts.entry(node.kind().clone()).or_insert(0) += 1;
    }
    debug!(distinct = counts.len(), "Listed primitive ops");
    counts
}
