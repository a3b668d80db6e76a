//! Tessera Autograd - Computation Graph Ownership and Teardown
//!
//! Provides the computation-graph nodes recorded during a forward pass and
//! the machinery that frees them. Nodes share ownership of their inputs
//! through edges; releasing the last reference to a graph of any depth tears
//! it down with a heap work list instead of recursion.
//!
//! # Key Features
//!
//! - **Arc-shared nodes** - `Node` with `Edge`s, iterative `Drop`
//! - **Arena graph** - index-based `NodeArena` with explicit reference counts
//! - **Sequence numbers** - per-thread counters seeded from a shared generator
//! - **Anomaly metadata** - lazily created diagnostic context per node
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera_autograd::{destroy, Edge, GraphRoot, Node};
//!
//! let mut head = Arc::new(Node::new(GraphRoot, Vec::new()));
//! for _ in 0..100_000 {
//!     head = Arc::new(Node::new(GraphRoot, vec![Edge::new(head, 0)]));
//! }
//! assert_eq!(destroy(head), 100_001);
//! ```
//!
//! @version 0.1.0
//! @author Tessera Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::new_without_default)]

// =============================================================================
// Modules
// =============================================================================

pub mod anomaly;
pub mod arena;
pub mod edge;
pub mod function;
pub mod node;
pub mod sequence;
pub mod teardown;

// =============================================================================
// Re-exports
// =============================================================================

pub use anomaly::AnomalyMetadata;
pub use arena::{ArenaEdge, NodeArena, NodeHandle};
pub use edge::Edge;
pub use function::{GraphRoot, NodeFunction, SavedTensors};
pub use node::Node;
pub use sequence::{
    global_generator, install_thread_counter, next_sequence_nr, peek_next_sequence_nr,
    SequenceCounter, SequenceGenerator,
};
pub use teardown::destroy;

// =============================================================================
// Prelude
// =============================================================================

/// Convenient imports for building and releasing graphs.
pub mod prelude {
    pub use crate::arena::{ArenaEdge, NodeArena, NodeHandle};
    pub use crate::edge::Edge;
    pub use crate::function::NodeFunction;
    pub use crate::node::Node;
    pub use crate::teardown::destroy;
}
