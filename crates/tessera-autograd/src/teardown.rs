//! Graph Teardown - Iterative Destruction of Deep Computation Graphs
//!
//! Each `Arc<Node>` owns edges, and each edge owns an `Arc<Node>`. Dropping
//! the head of a long chain would therefore recurse once per link and
//! overflow the stack for histories hundreds of thousands of nodes deep:
//!
//! ```text
//! Arc<Node> -> Edge -> Arc<Node> -> Edge -> ... -> Arc<Node>
//! ```
//!
//! Instead, when a node is dropped its edges are drained first. Every child
//! the edge owned exclusively is moved onto a heap work list rather than
//! dropped in place; shared children just lose one reference. The node
//! itself is then freed with no edges left to recurse into, and the work list
//! is drained the same way. Stack usage stays constant in the graph depth.
//!
//! Ownership cycles are a precondition violation: the nodes on a cycle are
//! never released.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use std::sync::Arc;

use tracing::trace;

use crate::node::Node;

/// Releases `node`'s saved data and detaches its edges.
///
/// Children whose only owner was the edge are moved onto `stack`; all other
/// edge references are released in place.
fn gather_functions(node: &mut Node, stack: &mut Vec<Node>) {
    node.release_variables();

    for edge in node.next_edges.drain(..) {
        let Some(function) = edge.function else {
            continue;
        };
        // `try_unwrap` checks for sole ownership and takes it in one atomic step.
        match Arc::try_unwrap(function) {
            Ok(child) => stack.push(child),
            Err(shared) => drop(shared),
        }
    }
}

/// Tears down `root` and every node it solely owns, returning how many
/// nodes were processed (including `root`).
///
/// Nodes popped from the work list have already been gathered when they go
/// out of scope, so their own `Drop` finds nothing left to do.
fn delete_node(root: &mut Node) -> usize {
    if root.variables_released && root.next_edges.is_empty() {
        return 0;
    }

    let mut stack = Vec::new();
    gather_functions(root, &mut stack);

    let mut freed = 1;
    while let Some(mut node) = stack.pop() {
        gather_functions(&mut node, &mut stack);
        freed += 1;
    }
    freed
}

impl Drop for Node {
    fn drop(&mut self) {
        let freed = delete_node(self);
        if freed > 1 {
            trace!(root = self.name(), freed, "Tore down computation graph");
        }
    }
}

/// Releases one reference to `root`, tearing the graph down iteratively if
/// it was the last one.
///
/// Returns the number of nodes freed, which is zero when other owners keep
/// `root` alive.
pub fn destroy(root: Arc<Node>) -> usize {
    match Arc::try_unwrap(root) {
        Ok(mut node) => delete_node(&mut node),
        Err(_shared) => 0,
    }
}

// =============================================================================
// Tests
// =============================================================================
