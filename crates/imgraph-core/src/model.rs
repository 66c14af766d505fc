//! Core records for the graph model: handles, keys, vertices and edges

use std::fmt;

use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};

/// Opaque handle to a vertex, issued only by [`GraphModel`](crate::GraphModel).
///
/// The generation makes a handle single-use across removals: once the vertex
/// is removed the handle never validates again, even if its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId {
    pub(crate) index: NodeIndex,
    pub(crate) generation: u64,
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}#{}", self.index.index(), self.generation)
    }
}

/// Opaque handle to an edge, issued only by [`GraphModel`](crate::GraphModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    pub(crate) index: EdgeIndex,
    pub(crate) generation: u64,
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}#{}", self.index.index(), self.generation)
    }
}

/// Identity of an edge: the ordered pair of its endpoint vertex keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub start: String,
    pub end: String,
}

impl EdgeKey {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        EdgeKey {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The same pair with endpoints swapped.
    pub fn reversed(&self) -> Self {
        EdgeKey {
            start: self.end.clone(),
            end: self.start.clone(),
        }
    }

    /// True if either endpoint is `vertex_key`.
    pub fn touches(&self, vertex_key: &str) -> bool {
        self.start == vertex_key || self.end == vertex_key
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.start, self.end)
    }
}

/// A vertex record: the element it carries and the key derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex<V> {
    pub(crate) element: V,
    pub(crate) key: String,
    pub(crate) generation: u64,
}

impl<V> Vertex<V> {
    pub fn element(&self) -> &V {
        &self.element
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn into_element(self) -> V {
        self.element
    }
}

/// An edge record. Endpoints are handles to vertices owned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<W> {
    pub(crate) start: VertexId,
    pub(crate) end: VertexId,
    pub(crate) weight: W,
    pub(crate) key: EdgeKey,
    pub(crate) generation: u64,
}

impl<W> Edge<W> {
    pub fn start(&self) -> VertexId {
        self.start
    }

    pub fn end(&self) -> VertexId {
        self.end
    }

    pub fn weight(&self) -> &W {
        &self.weight
    }

    pub fn key(&self) -> &EdgeKey {
        &self.key
    }

    /// True if `vertex` is either endpoint.
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.start == vertex || self.end == vertex
    }

    pub fn is_loop(&self) -> bool {
        self.start == self.end
    }

    pub fn into_weight(self) -> W {
        self.weight
    }
}
