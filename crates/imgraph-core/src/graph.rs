//! Keyed graph model backed by petgraph::StableDiGraph
//!
//! Vertices and edges live in a stable graph; two key indices map derived
//! identities back to graph slots. All validation goes through those indices,
//! so a handle belongs to the model only while its key still resolves to it.

use std::collections::HashMap;
use std::fmt;

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::error::{EntityKind, GraphError, Result};
use crate::keys::KeyDerivation;
use crate::model::*;

/// The authoritative vertex/edge store.
///
/// Directed and simple: at most one edge per ordered endpoint pair, so
/// `(a, b)` and `(b, a)` are distinct edges. Both endpoints of an edge must be
/// registered vertices.
pub struct GraphModel<V, W, K> {
    inner: StableDiGraph<Vertex<V>, Edge<W>>,
    vertex_keys: HashMap<String, NodeIndex>,
    edge_keys: HashMap<EdgeKey, EdgeIndex>,
    key_fn: K,
    generation: u64,
}

impl<V, W, K> fmt::Debug for GraphModel<V, W, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphModel")
            .field("vertex_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl<V, W, K: KeyDerivation<V>> GraphModel<V, W, K> {
    /// Create an empty model deriving vertex identity with `key_fn`.
    pub fn new(key_fn: K) -> Self {
        GraphModel {
            inner: StableDiGraph::new(),
            vertex_keys: HashMap::new(),
            edge_keys: HashMap::new(),
            key_fn,
            generation: 0,
        }
    }

    /// Derive the key `element` would have in this model.
    pub fn key_of(&self, element: &V) -> String {
        self.key_fn.key(element)
    }

    /// Insert a vertex for `element`. Fails with `DuplicateKey` if its key is taken.
    pub fn add_vertex(&mut self, element: V) -> Result<VertexId> {
        let key = self.key_fn.key(&element);
        if self.vertex_keys.contains_key(&key) {
            return Err(GraphError::duplicate(EntityKind::Vertex, key));
        }

        let generation = self.next_generation();
        let index = self.inner.add_node(Vertex {
            element,
            key: key.clone(),
            generation,
        });
        debug!("Vertex added: {}", key);
        self.vertex_keys.insert(key, index);

        Ok(VertexId { index, generation })
    }

    /// Insert an edge from the vertex holding `start` to the vertex holding `end`.
    ///
    /// The edge key is derived from the two elements. Fails with `DuplicateKey`
    /// if that ordered pair already has an edge, or `NotFound` if either
    /// element has no vertex in the model.
    pub fn add_edge(&mut self, start: &V, end: &V, weight: W) -> Result<EdgeId> {
        let key = EdgeKey::new(self.key_fn.key(start), self.key_fn.key(end));
        if self.edge_keys.contains_key(&key) {
            return Err(GraphError::duplicate(EntityKind::Edge, key));
        }

        let start = self.lookup_vertex(&key.start)?;
        let end = self.lookup_vertex(&key.end)?;

        let generation = self.next_generation();
        let index = self.inner.add_edge(
            start.index,
            end.index,
            Edge {
                start,
                end,
                weight,
                key: key.clone(),
                generation,
            },
        );
        debug!("Edge added: {}", key);
        self.edge_keys.insert(key, index);

        Ok(EdgeId { index, generation })
    }

    /// Remove a vertex and every edge incident to it, in either direction.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<Vertex<V>> {
        self.resolve_vertex(id)?;

        for edge_index in self.incident_edge_indices(id.index) {
            if let Some(edge) = self.inner.remove_edge(edge_index) {
                debug!("Edge removed with vertex: {}", edge.key);
                self.edge_keys.remove(&edge.key);
            }
        }

        let vertex = self
            .inner
            .remove_node(id.index)
            .ok_or_else(|| GraphError::not_found(EntityKind::Vertex, id))?;
        self.vertex_keys.remove(&vertex.key);
        debug!("Vertex removed: {}", vertex.key);

        Ok(vertex)
    }

    /// Remove a single edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge<W>> {
        self.resolve_edge(id)?;

        let edge = self
            .inner
            .remove_edge(id.index)
            .ok_or_else(|| GraphError::not_found(EntityKind::Edge, id))?;
        self.edge_keys.remove(&edge.key);
        debug!("Edge removed: {}", edge.key);

        Ok(edge)
    }

    /// True if an edge joins `a` and `b` in either direction.
    pub fn adjacent(&self, a: VertexId, b: VertexId) -> Result<bool> {
        self.resolve_vertex(a)?;
        self.resolve_vertex(b)?;
        Ok(self.inner.find_edge(a.index, b.index).is_some()
            || self.inner.find_edge(b.index, a.index).is_some())
    }

    /// True if an edge runs from `start` to `end`.
    pub fn has_edge(&self, start: VertexId, end: VertexId) -> Result<bool> {
        self.resolve_vertex(start)?;
        self.resolve_vertex(end)?;
        Ok(self.inner.find_edge(start.index, end.index).is_some())
    }

    /// The endpoint of `edge` opposite to `vertex`.
    ///
    /// For a self-loop the vertex is its own opposite. Fails with `NotMember`
    /// if `vertex` is not an endpoint of `edge`.
    pub fn opposite_vertex(&self, vertex: VertexId, edge: EdgeId) -> Result<VertexId> {
        let v = self.resolve_vertex(vertex)?;
        let e = self.resolve_edge(edge)?;

        if e.start == vertex {
            Ok(e.end)
        } else if e.end == vertex {
            Ok(e.start)
        } else {
            Err(GraphError::NotMember {
                vertex: v.key.clone(),
                edge: e.key.to_string(),
            })
        }
    }

    /// Swap the element of `id` in place and return the previous one.
    ///
    /// The handle stays valid; the vertex key and the keys of its incident
    /// edges are re-derived. Fails with `DuplicateKey` if the new key belongs
    /// to another vertex.
    pub fn replace_vertex(&mut self, id: VertexId, element: V) -> Result<V> {
        let old_key = self.resolve_vertex(id)?.key.clone();
        let new_key = self.key_fn.key(&element);
        if new_key != old_key && self.vertex_keys.contains_key(&new_key) {
            return Err(GraphError::duplicate(EntityKind::Vertex, new_key));
        }

        let vertex = self
            .inner
            .node_weight_mut(id.index)
            .ok_or_else(|| GraphError::not_found(EntityKind::Vertex, id))?;
        let old_element = std::mem::replace(&mut vertex.element, element);
        vertex.key = new_key.clone();

        if new_key != old_key {
            self.vertex_keys.remove(&old_key);
            self.vertex_keys.insert(new_key.clone(), id.index);
            self.rekey_incident_edges(id, &new_key);
            debug!("Vertex re-keyed: {} -> {}", old_key, new_key);
        }

        Ok(old_element)
    }

    /// Swap the weight of `id` in place and return the previous one.
    pub fn replace_edge(&mut self, id: EdgeId, weight: W) -> Result<W> {
        self.resolve_edge(id)?;

        let edge = self
            .inner
            .edge_weight_mut(id.index)
            .ok_or_else(|| GraphError::not_found(EntityKind::Edge, id))?;
        Ok(std::mem::replace(&mut edge.weight, weight))
    }

    /// All edges having `id` as an endpoint. Empty if `id` does not belong to the model.
    pub fn edges_incident_to(&self, id: VertexId) -> Vec<EdgeId> {
        if self.resolve_vertex(id).is_err() {
            return Vec::new();
        }
        self.incident_edge_indices(id.index)
            .into_iter()
            .filter_map(|idx| self.edge_id_at(idx))
            .collect()
    }

    /// Both endpoints of an edge, start first.
    pub fn endpoints(&self, id: EdgeId) -> Result<(VertexId, VertexId)> {
        let edge = self.resolve_edge(id)?;
        Ok((edge.start, edge.end))
    }

    pub fn vertex_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Snapshot of every vertex handle.
    pub fn vertices(&self) -> Vec<VertexId> {
        self.inner
            .node_indices()
            .filter_map(|idx| self.vertex_id_at(idx))
            .collect()
    }

    /// Snapshot of every edge handle.
    pub fn edges(&self) -> Vec<EdgeId> {
        self.inner
            .edge_indices()
            .filter_map(|idx| self.edge_id_at(idx))
            .collect()
    }

    /// Get a vertex by handle.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex<V>> {
        self.resolve_vertex(id).ok()
    }

    /// Get an edge by handle.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge<W>> {
        self.resolve_edge(id).ok()
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.resolve_vertex(id).is_ok()
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.resolve_edge(id).is_ok()
    }

    pub fn vertex_by_key(&self, key: &str) -> Option<VertexId> {
        self.vertex_keys
            .get(key)
            .and_then(|&idx| self.vertex_id_at(idx))
    }

    /// Find the vertex holding an element with the same key as `element`.
    pub fn vertex_by_element(&self, element: &V) -> Option<VertexId> {
        self.vertex_by_key(&self.key_fn.key(element))
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<EdgeId> {
        self.edge_keys.get(key).and_then(|&idx| self.edge_id_at(idx))
    }

    /// Find the edge from the vertex holding `start` to the vertex holding `end`.
    pub fn edge_between(&self, start: &V, end: &V) -> Option<EdgeId> {
        let key = EdgeKey::new(self.key_fn.key(start), self.key_fn.key(end));
        self.edge_by_key(&key)
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn lookup_vertex(&self, key: &str) -> Result<VertexId> {
        self.vertex_by_key(key)
            .ok_or_else(|| GraphError::not_found(EntityKind::Vertex, key))
    }

    fn resolve_vertex(&self, id: VertexId) -> Result<&Vertex<V>> {
        self.inner
            .node_weight(id.index)
            .filter(|v| v.generation == id.generation)
            .filter(|v| self.vertex_keys.get(&v.key) == Some(&id.index))
            .ok_or_else(|| GraphError::not_found(EntityKind::Vertex, id))
    }

    fn resolve_edge(&self, id: EdgeId) -> Result<&Edge<W>> {
        self.inner
            .edge_weight(id.index)
            .filter(|e| e.generation == id.generation)
            .filter(|e| self.edge_keys.get(&e.key) == Some(&id.index))
            .ok_or_else(|| GraphError::not_found(EntityKind::Edge, id))
    }

    fn vertex_id_at(&self, index: NodeIndex) -> Option<VertexId> {
        self.inner.node_weight(index).map(|v| VertexId {
            index,
            generation: v.generation,
        })
    }

    fn edge_id_at(&self, index: EdgeIndex) -> Option<EdgeId> {
        self.inner.edge_weight(index).map(|e| EdgeId {
            index,
            generation: e.generation,
        })
    }

    /// Outgoing and incoming edges of a node; a self-loop appears once.
    fn incident_edge_indices(&self, index: NodeIndex) -> Vec<EdgeIndex> {
        let mut edges: Vec<EdgeIndex> = self
            .inner
            .edges_directed(index, Direction::Outgoing)
            .chain(self.inner.edges_directed(index, Direction::Incoming))
            .map(|edge_ref| edge_ref.id())
            .collect();
        edges.sort();
        edges.dedup();
        edges
    }

    fn rekey_incident_edges(&mut self, id: VertexId, new_key: &str) {
        let mut rekeyed = Vec::new();
        for edge_index in self.incident_edge_indices(id.index) {
            if let Some(edge) = self.inner.edge_weight_mut(edge_index) {
                self.edge_keys.remove(&edge.key);
                if edge.start == id {
                    edge.key.start = new_key.to_string();
                }
                if edge.end == id {
                    edge.key.end = new_key.to_string();
                }
                rekeyed.push((edge.key.clone(), edge_index));
            }
        }
        self.edge_keys.extend(rekeyed);
    }
}

impl<V, W, K: KeyDerivation<V> + Default> Default for GraphModel<V, W, K> {
    fn default() -> Self {
        Self::new(K::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::DisplayKey;

    fn model() -> GraphModel<&'static str, f64, DisplayKey> {
        GraphModel::new(DisplayKey)
    }

    #[test]
    fn test_handle_from_removed_vertex_never_validates() {
        let mut g = model();
        let a = g.add_vertex("a").unwrap();
        g.remove_vertex(a).unwrap();

        // The freed slot is reused by the next insert.
        let b = g.add_vertex("a").unwrap();
        assert_eq!(a.index, b.index);
        assert_ne!(a, b);
        assert!(!g.contains_vertex(a));
        assert!(g.contains_vertex(b));
        assert!(g.remove_vertex(a).unwrap_err().is_not_found());
    }

    #[test]
    fn test_self_loop_removed_once() {
        let mut g = model();
        let a = g.add_vertex("a").unwrap();
        g.add_edge(&"a", &"a", 1.0).unwrap();
        assert_eq!(g.edges_incident_to(a).len(), 1);

        g.remove_vertex(a).unwrap();
        assert_eq!(g.edge_count(), 0);
        assert!(g.edge_by_key(&EdgeKey::new("a", "a")).is_none());
    }

    #[test]
    fn test_rekey_keeps_index_consistent() {
        let mut g = model();
        let a = g.add_vertex("a").unwrap();
        g.add_vertex("b").unwrap();
        let ab = g.add_edge(&"a", &"b", 1.0).unwrap();
        let ba = g.add_edge(&"b", &"a", 2.0).unwrap();

        g.replace_vertex(a, "z").unwrap();

        assert_eq!(g.edge_by_key(&EdgeKey::new("z", "b")), Some(ab));
        assert_eq!(g.edge_by_key(&EdgeKey::new("b", "z")), Some(ba));
        assert!(g.edge_by_key(&EdgeKey::new("a", "b")).is_none());
        assert_eq!(g.edge(ab).unwrap().key().to_string(), "z | b");
        assert!(g.contains_edge(ab));
        assert!(g.contains_edge(ba));
    }
}
