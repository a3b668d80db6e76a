//! Computation Nodes - One Step of a Computation History
//!
//! A `Node` owns its function and an ordered list of edges to the nodes that
//! produced its inputs. Nodes are shared through `Arc<Node>`; dropping the
//! last reference tears the node and every node it solely owns down without
//! recursion (see [`crate::teardown`]).
//!
//! @version 0.1.0
//! @author Tessera Development Team

use std::fmt;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::anomaly::AnomalyMetadata;
use crate::edge::Edge;
use crate::function::NodeFunction;
use crate::sequence::next_sequence_nr;

// =============================================================================
// Node
// =============================================================================

/// A node in the computation graph.
pub struct Node {
    /// Creation order on the creating thread.
    sequence_nr: u64,
    /// Behaviour and saved data of this node.
    pub(crate) function: Box<dyn NodeFunction>,
    /// Edges to the nodes producing this node's inputs.
    pub(crate) next_edges: Vec<Edge>,
    /// Set once `release_variables` has run.
    pub(crate) variables_released: bool,
    anomaly: Mutex<Option<AnomalyMetadata>>,
}

impl Node {
    /// Creates a node numbered from the current thread's sequence counter.
    pub fn new<F: NodeFunction + 'static>(function: F, next_edges: Vec<Edge>) -> Self {
        Self::with_sequence_nr(function, next_edges, next_sequence_nr())
    }

    /// Creates a node with an explicit sequence number.
    pub fn with_sequence_nr<F: NodeFunction + 'static>(
        function: F,
        next_edges: Vec<Edge>,
        sequence_nr: u64,
    ) -> Self {
        Self {
            sequence_nr,
            function: Box::new(function),
            next_edges,
            variables_released: false,
            anomaly: Mutex::new(None),
        }
    }

    /// Returns the name of the node's function.
    pub fn name(&self) -> &'static str {
        self.function.name()
    }

    /// Returns the node's sequence number.
    pub fn sequence_nr(&self) -> u64 {
        self.sequence_nr
    }

    /// Returns the node's function.
    pub fn function(&self) -> &dyn NodeFunction {
        self.function.as_ref()
    }

    /// Returns the edges to this node's inputs.
    pub fn next_edges(&self) -> &[Edge] {
        &self.next_edges
    }

    /// Returns the edge for input `index`.
    pub fn next_edge(&self, index: usize) -> Option<&Edge> {
        self.next_edges.get(index)
    }

    /// Returns the number of input edges.
    pub fn num_inputs(&self) -> usize {
        self.next_edges.len()
    }

    /// Appends an edge. Only possible while the node is not yet shared.
    pub fn add_next_edge(&mut self, edge: Edge) {
        self.next_edges.push(edge);
    }

    /// Runs the function's `release_variables` hook if it has not run yet.
    pub fn release_variables(&mut self) {
        if !self.variables_released {
            self.function.release_variables();
            self.variables_released = true;
        }
    }

    /// Returns the node's anomaly metadata, creating it on first access.
    pub fn metadata(&self) -> MappedMutexGuard<'_, AnomalyMetadata> {
        let name = self.name();
        let sequence_nr = self.sequence_nr;
        MutexGuard::map(self.anomaly.lock(), |slot| {
            slot.get_or_insert_with(|| AnomalyMetadata::new(name, sequence_nr))
        })
    }

    /// Returns true if metadata has been created for this node.
    pub fn has_metadata(&self) -> bool {
        self.anomaly.lock().is_some()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name())
            .field("sequence_nr", &self.sequence_nr)
            .field("num_inputs", &self.next_edges.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{GraphRoot, SavedTensors};
    use std::sync::Arc;
    use tessera_tensor::Tensor;

    #[test]
    fn test_node_edges() {
        let a = Arc::new(Node::new(GraphRoot, Vec::new()));
        let b = Arc::new(Node::new(GraphRoot, Vec::new()));
        let mut add = Node::new(SavedTensors::new("AddBackward", Vec::new()), Vec::new());
        add.add_next_edge(Edge::new(Arc::clone(&a), 0));
        add.add_next_edge(Edge::new(b, 0));
        add.add_next_edge(Edge::invalid());

        assert_eq!(add.name(), "AddBackward");
        assert_eq!(add.num_inputs(), 3);
        assert!(Arc::ptr_eq(add.next_edge(0).unwrap().function().unwrap(), &a));
        assert!(!add.next_edge(2).unwrap().is_valid());
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let first = Node::new(GraphRoot, Vec::new());
        let second = Node::new(GraphRoot, Vec::new());
        assert!(second.sequence_nr() > first.sequence_nr());
    }

    #[test]
    fn test_release_variables_runs_once() {
        let t = Tensor::<f32>::zeros(&[4]);
        let mut node = Node::new(SavedTensors::new("ExpBackward", vec![t]), Vec::new());
        node.release_variables();
        node.release_variables();

        let saved = node
            .function()
            .as_any()
            .downcast_ref::<SavedTensors>()
            .unwrap();
        assert!(saved.saved().is_empty());
    }

    #[test]
    fn test_metadata_is_lazy() {
        let node = Node::with_sequence_nr(GraphRoot, Vec::new(), 7);
        assert!(!node.has_metadata());

        node.metadata().record("traceback", "train.rs:3");
        assert!(node.has_metadata());

        let meta = node.metadata();
        assert_eq!(meta.node_name(), "GraphRoot");
        assert_eq!(meta.sequence_nr(), 7);
        assert_eq!(meta.get("traceback"), Some("train.rs:3"));
    }
}
