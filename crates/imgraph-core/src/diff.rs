//! Reconciliation deltas between the model and a presentation

use serde::{Deserialize, Serialize};

use crate::model::EdgeKey;

/// The add/remove sets needed to bring a presentation in line with the model.
///
/// All four lists are sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDiff {
    /// Reconciliation pass this diff belongs to.
    pub sequence: u64,
    /// Vertices in the model that are not displayed yet.
    pub added_vertices: Vec<String>,
    /// Displayed vertices no longer backed by the model.
    pub removed_vertices: Vec<String>,
    /// Edges in the model that are not displayed yet.
    pub added_edges: Vec<EdgeKey>,
    /// Displayed edges no longer backed by the model.
    pub removed_edges: Vec<EdgeKey>,
}

impl GraphDiff {
    /// Create an empty diff with given sequence number.
    pub fn new(sequence: u64) -> Self {
        GraphDiff {
            sequence,
            ..Default::default()
        }
    }

    /// Check if this diff is empty (no changes).
    pub fn is_empty(&self) -> bool {
        self.added_vertices.is_empty()
            && self.removed_vertices.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
    }

    /// Total number of entities created or torn down.
    pub fn change_count(&self) -> usize {
        self.added_vertices.len()
            + self.removed_vertices.len()
            + self.added_edges.len()
            + self.removed_edges.len()
    }

    pub(crate) fn sort(&mut self) {
        self.added_vertices.sort();
        self.removed_vertices.sort();
        self.added_edges.sort();
        self.removed_edges.sort();
    }
}
