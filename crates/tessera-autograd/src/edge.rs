//! Edges - Shared-Ownership Links Between Computation Nodes
//!
//! @version 0.1.0
//! @author Tessera Development Team

use std::sync::Arc;

use crate::node::Node;

/// A dependency of a node: the node producing one of its inputs, and which of
/// that node's outputs is consumed.
///
/// The edge owns one strong reference to its target.
#[derive(Debug, Clone, Default)]
pub struct Edge {
    /// Target node, or `None` for an input that is not tracked.
    pub(crate) function: Option<Arc<Node>>,
    /// Output slot of the target node this edge reads.
    pub(crate) input_nr: u32,
}

impl Edge {
    /// Creates an edge to output `input_nr` of `function`.
    pub fn new(function: Arc<Node>, input_nr: u32) -> Self {
        Self {
            function: Some(function),
            input_nr,
        }
    }

    /// Creates an edge that points nowhere.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Returns true if the edge has a target.
    pub fn is_valid(&self) -> bool {
        self.function.is_some()
    }

    /// Returns the target node.
    pub fn function(&self) -> Option<&Arc<Node>> {
        self.function.as_ref()
    }

    /// Returns the output slot of the target node.
    pub fn input_nr(&self) -> u32 {
        self.input_nr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::GraphRoot;

    #[test]
    fn test_edge_holds_reference() {
        let leaf = Arc::new(Node::new(GraphRoot, Vec::new()));
        let edge = Edge::new(Arc::clone(&leaf), 1);

        assert!(edge.is_valid());
        assert_eq!(edge.input_nr(), 1);
        assert_eq!(Arc::strong_count(&leaf), 2);

        drop(edge);
        assert_eq!(Arc::strong_count(&leaf), 1);
    }

    #[test]
    fn test_invalid_edge() {
        let edge = Edge::invalid();
        assert!(!edge.is_valid());
        assert!(edge.function().is_none());
    }
}
