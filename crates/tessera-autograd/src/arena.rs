//! Node Arena - Index-Based Computation Graph
//!
//! Stores nodes in a central table and references them by handle. Each slot
//! carries an explicit reference count: one for every edge pointing at the
//! node plus one for every handle the caller retains. Releasing the last
//! reference frees the node through the same work-list teardown the
//! `Arc`-based graph uses, so depth never turns into recursion.
//!
//! Freed slots are recycled; handles carry a generation so a stale handle
//! never aliases a newer node.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use tracing::{trace, warn};

use crate::function::NodeFunction;
use crate::sequence::next_sequence_nr;

// =============================================================================
// Handles
// =============================================================================

/// Reference to a node stored in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    /// Returns the slot index of the handle.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Edge between arena nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaEdge {
    /// Node producing the input.
    pub target: NodeHandle,
    /// Output slot of the target.
    pub input_nr: u32,
}

impl ArenaEdge {
    /// Creates an edge to output `input_nr` of `target`.
    pub fn new(target: NodeHandle, input_nr: u32) -> Self {
        Self { target, input_nr }
    }
}

// =============================================================================
// Slots
// =============================================================================

#[derive(Debug)]
struct ArenaNode {
    function: Box<dyn NodeFunction>,
    edges: Vec<ArenaEdge>,
    sequence_nr: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    ref_count: usize,
    node: Option<ArenaNode>,
}

// =============================================================================
// Node Arena
// =============================================================================

/// Central table of computation nodes with explicit reference counts.
#[derive(Debug, Default)]
pub struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl NodeArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty arena with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Inserts a node and returns the caller's handle to it.
    ///
    /// The new node starts with one reference (the returned handle) and
    /// takes one reference on every edge target.
    ///
    /// # Panics
    /// Panics if an edge targets a node that is no longer in the arena.
    pub fn insert<F: NodeFunction + 'static>(&mut self, function: F, edges: Vec<ArenaEdge>) -> NodeHandle {
        // Validate every edge before taking any reference.
        for edge in &edges {
            assert!(
                self.contains(edge.target),
                "edge targets freed node {:?}",
                edge.target
            );
        }
        for edge in &edges {
            self.slots[edge.target.index()].ref_count += 1;
        }

        let node = ArenaNode {
            function: Box::new(function),
            edges,
            sequence_nr: next_sequence_nr(),
        };
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.ref_count = 1;
            slot.node = Some(node);
            return NodeHandle {
                index,
                generation: slot.generation,
            };
        }

        assert!(self.slots.len() < u32::MAX as usize, "arena is full");
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            ref_count: 1,
            node: Some(node),
        });
        NodeHandle {
            index,
            generation: 0,
        }
    }

    /// Returns true if `handle` refers to a live node.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// Returns the reference count of a live node.
    pub fn ref_count(&self, handle: NodeHandle) -> Option<usize> {
        self.slot(handle).map(|s| s.ref_count)
    }

    /// Returns the function name of a live node.
    pub fn name(&self, handle: NodeHandle) -> Option<&'static str> {
        self.slot(handle)
            .and_then(|s| s.node.as_ref())
            .map(|n| n.function.name())
    }

    /// Returns the sequence number of a live node.
    pub fn sequence_nr(&self, handle: NodeHandle) -> Option<u64> {
        self.slot(handle)
            .and_then(|s| s.node.as_ref())
            .map(|n| n.sequence_nr)
    }

    /// Returns the edges of a live node.
    pub fn edges(&self, handle: NodeHandle) -> Option<&[ArenaEdge]> {
        self.slot(handle)
            .and_then(|s| s.node.as_ref())
            .map(|n| n.edges.as_slice())
    }

    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if no node is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Takes an additional reference to a live node.
    ///
    /// # Panics
    /// Panics if `handle` is stale.
    pub fn retain(&mut self, handle: NodeHandle) -> NodeHandle {
        let slot = self
            .slot_mut(handle)
            .unwrap_or_else(|| panic!("retain of freed node {handle:?}"));
        slot.ref_count += 1;
        handle
    }

    /// Releases one reference, tearing down every node that becomes
    /// unreferenced as a result.
    ///
    /// Returns the number of nodes freed. A stale handle frees nothing.
    pub fn release(&mut self, handle: NodeHandle) -> usize {
        let Some(slot) = self.slot_mut(handle) else {
            warn!(?handle, "Release of freed node ignored");
            return 0;
        };

        slot.ref_count -= 1;
        if slot.ref_count > 0 {
            return 0;
        }

        let mut stack = vec![handle.index];
        let mut freed = 0;
        while let Some(index) = stack.pop() {
            self.free_slot(index, &mut stack);
            freed += 1;
        }

        if freed > 1 {
            trace!(freed, live = self.live, "Tore down arena graph");
        }
        freed
    }

    /// Frees an unreferenced slot, queueing edge targets that drop to zero.
    fn free_slot(&mut self, index: u32, stack: &mut Vec<u32>) {
        let slot = &mut self.slots[index as usize];
        let Some(mut node) = slot.node.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.live -= 1;

        node.function.release_variables();

        for edge in node.edges.drain(..) {
            let target = &mut self.slots[edge.target.index()];
            target.ref_count -= 1;
            if target.ref_count == 0 {
                stack.push(edge.target.index);
            }
        }
    }

    fn slot(&self, handle: NodeHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index())
            .filter(|s| s.generation == handle.generation && s.node.is_some())
    }

    fn slot_mut(&mut self, handle: NodeHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index())
            .filter(|s| s.generation == handle.generation && s.node.is_some())
    }
}

// =============================================================================
// Tests
// =============================================================================
