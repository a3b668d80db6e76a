//! Node Functions - Per-Node Behaviour in the Computation Graph
//!
//! Every computation node wraps a `NodeFunction`. Teardown only needs two
//! things from it: a name for diagnostics and the `release_variables` hook,
//! which drops saved data eagerly before the node's edges are inspected.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use std::any::Any;
use std::fmt::Debug;

use tessera_tensor::Tensor;

// =============================================================================
// Node Function Trait
// =============================================================================

/// Behaviour attached to a computation node.
pub trait NodeFunction: Debug + Send + Sync {
    /// Returns the name of this function for debugging.
    fn name(&self) -> &'static str;

    /// Drops auxiliary data (saved tensors) held by this function.
    ///
    /// Called exactly once per node during teardown, before its edges are
    /// released.
    fn release_variables(&mut self) {}

    /// Allows downcasting to concrete types.
    fn as_any(&self) -> &dyn Any;
}

// =============================================================================
// Graph Root - Leaf Function
// =============================================================================

/// Function for nodes that hold no saved data, such as gradient accumulators
/// at the leaves of the graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphRoot;

impl NodeFunction for GraphRoot {
    fn name(&self) -> &'static str {
        "GraphRoot"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Saved Tensors - Function Holding Forward Activations
// =============================================================================

/// Function that keeps forward-pass tensors alive for its backward step.
#[derive(Debug)]
pub struct SavedTensors {
    name: &'static str,
    saved: Vec<Tensor<f32>>,
}

impl SavedTensors {
    /// Creates a function saving the given tensors.
    pub fn new(name: &'static str, saved: Vec<Tensor<f32>>) -> Self {
        Self { name, saved }
    }

    /// Returns the tensors still held.
    pub fn saved(&self) -> &[Tensor<f32>] {
        &self.saved
    }
}

impl NodeFunction for SavedTensors {
    fn name(&self) -> &'static str {
        self.name
    }

    fn release_variables(&mut self) {
        self.saved = Vec::new();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_root() {
        let root = GraphRoot;
        assert_eq!(root.name(), "GraphRoot");
        assert!(root.as_any().downcast_ref::<GraphRoot>().is_some());
    }

    #[test]
    fn test_saved_tensors_release() {
        let t = Tensor::<f32>::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let mut func = SavedTensors::new("MulBackward", vec![t.clone(), t]);
        assert_eq!(func.name(), "MulBackward");
        assert_eq!(func.saved().len(), 2);

        func.release_variables();
        assert!(func.saved().is_empty());
    }
}
