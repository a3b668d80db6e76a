//! Anomaly Metadata - Diagnostic Context for Computation Nodes
//!
//! Created lazily the first time a node's metadata is requested, so graphs
//! built without anomaly detection pay nothing for it.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use std::fmt;

/// Diagnostic context recorded for one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnomalyMetadata {
    node_name: String,
    sequence_nr: u64,
    entries: Vec<(String, String)>,
}

impl AnomalyMetadata {
    /// Creates metadata for the node with the given name and sequence number.
    pub fn new(node_name: impl Into<String>, sequence_nr: u64) -> Self {
        Self {
            node_name: node_name.into(),
            sequence_nr,
            entries: Vec::new(),
        }
    }

    /// Returns the name of the node this metadata belongs to.
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Returns the sequence number of the node.
    pub fn sequence_nr(&self) -> u64 {
        self.sequence_nr
    }

    /// Records a key/value pair, such as the forward call site.
    pub fn record(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Returns the first value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all recorded entries in insertion order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

impl fmt::Display for AnomalyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (sequence_nr={})", self.node_name, self.sequence_nr)?;
        for (key, value) in &self.entries {
            write!(f, "\n  {key}: {value}")?;
        }
        Ok(())
    }
}
