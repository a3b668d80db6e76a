//! Intermediate Representation
//!
//! A graph owns a root block; blocks hold nodes in program order and a node
//! may own nested sub-blocks (the bodies of `prim::If` / `prim::Loop`).
//! Node kinds are namespaced operator symbols such as `prim::Constant` or
//! `aten::add`.

use std::fmt;

use crate::error::{JitError, JitResult};

/// Namespace of interpreter primitives.
pub const PRIM_NAMESPACE: &str = "prim";

// =============================================================================
// Symbol
// =============================================================================

/// Namespaced operator name, written `namespace::name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    namespace: String,
    name: String,
}

impl Symbol {
    /// Creates a symbol from its parts.
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Creates a `prim::` symbol.
    pub fn prim(name: &str) -> Self {
        Self::new(PRIM_NAMESPACE, name)
    }

    /// Parses `namespace::name`.
    pub fn parse(qualified: &str) -> JitResult<Self> {
        match qualified.split_once("::") {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() && !name.contains("::") => {
                Ok(Self::new(ns, name))
            }
            _ => Err(JitError::InvalidSymbol(qualified.to_string())),
        }
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the unqualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for interpreter primitives.
    pub fn is_prim(&self) -> bool {
        self.namespace == PRIM_NAMESPACE
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.namespace, self.name)
    }
}

// =============================================================================
// Nodes and Blocks
// =============================================================================

/// A node in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: Symbol,
    blocks: Vec<Block>,
}

impl Node {
    /// Creates a node with no sub-blocks.
    pub fn new(kind: Symbol) -> Self {
        Self {
            kind,
            blocks: Vec::new(),
        }
    }

    /// Returns the operator symbol.
    pub fn kind(&self) -> &Symbol {
        &self.kind
    }

    /// Returns the nested sub-blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Appends an empty sub-block and returns it.
    pub fn add_block(&mut self) -> &mut Block {
        self.blocks.push(Block::new());
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }
}

/// Ordered list of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    nodes: Vec<Node>,
}

impl Block {
    /// Creates an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node of `kind` and returns it.
    pub fn append(&mut self, kind: Symbol) -> &mut Node {
        self.nodes.push(Node::new(kind));
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    /// Returns the nodes in program order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the number of nodes directly in this block.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the block has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // Flatten nested blocks onto a work list so deep nesting costs heap.
        let mut pending = std::mem::take(&mut self.nodes);
        while let Some(mut node) = pending.pop() {
            for mut block in node.blocks.drain(..) {
                pending.append(&mut block.nodes);
            }
        }
    }
}

// =============================================================================
// Graph
// =============================================================================

/// IR graph rooted at a single block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    block: Block,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the root block.
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Returns the root block mutably.
    pub fn block_mut(&mut self) -> &mut Block {
        &mut self.block
    }

    /// Iterates over every node, including those in nested sub-blocks.
    pub fn all_nodes(&self) -> AllNodes<'_> {
        AllNodes {
            stack: vec![self.block.nodes.iter()],
        }
    }

    /// Returns the total number of nodes at any depth.
    pub fn node_count(&self) -> usize {
        self.all_nodes().count()
    }
}

/// Pre-order walk over a graph's nodes at every depth.
///
/// Keeps one iterator per open block so nesting depth costs heap, not stack.
pub struct AllNodes<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for AllNodes<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => {
                    for block in node.blocks.iter().rev() {
                        self.stack.push(block.nodes.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_parse() {
        let sym = Symbol::parse("prim::Constant").unwrap();
        assert_eq!(sym.namespace(), "prim");
        assert_eq!(sym.name(), "Constant");
        assert!(sym.is_prim());
        assert_eq!(sym.to_string(), "prim::Constant");

        assert!(!Symbol::parse("aten::add").unwrap().is_prim());
    }

    #[test]
    fn test_symbol_parse_rejects_malformed() {
        for bad in ["Constant", "::x", "prim::", "a::b::c", ""] {
            assert!(matches!(Symbol::parse(bad), Err(JitError::InvalidSymbol(_))), "{bad}");
        }
    }

    #[test]
    fn test_graph_building() {
        let mut graph = Graph::new();
        graph.block_mut().append(Symbol::prim("Constant"));
        let if_node = graph.block_mut().append(Symbol::prim("If"));
        if_node.add_block().append(Symbol::new("aten", "relu"));
        if_node.add_block().append(Symbol::prim("Constant"));

        assert_eq!(graph.block().len(), 2);
        assert_eq!(graph.block().nodes()[1].blocks().len(), 2);
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_all_nodes_preorder() {
        let mut graph = Graph::new();
        let outer = graph.block_mut().append(Symbol::prim("Loop"));
        let body = outer.add_block();
        body.append(Symbol::new("aten", "mul"));
        body.append(Symbol::prim("If")).add_block().append(Symbol::new("aten", "add"));
        graph.block_mut().append(Symbol::prim("Return"));

        let names: Vec<String> = graph.all_nodes().map(|n| n.kind().to_string()).collect();
        assert_eq!(
            names,
            vec!["prim::Loop", "aten::mul", "prim::If", "aten::add", "prim::Return"]
        );
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::new();
        assert!(graph.block().is_empty());
        assert_eq!(graph.node_count(), 0);
    }
}
