//! Reconciliation of a presentation layer against the graph model
//!
//! The [`Reconciler`] keeps the bookkeeping of what is currently displayed
//! (visual handle per vertex key and per edge key, plus the endpoint pair each
//! visual edge was created for). Each pass diffs that bookkeeping against the
//! model by key and drives the [`Presentation`] hooks until both agree.
//!
//! Teardown always runs edges before vertices: removing a visual edge is what
//! releases the adjacency link between its two endpoint visuals.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::diff::GraphDiff;
use crate::graph::GraphModel;
use crate::keys::KeyDerivation;
use crate::model::{Edge, EdgeId, EdgeKey, Vertex, VertexId};
use crate::placement::{Bounds, Placement, Point};

/// Teardown and adjacency hooks of a visual layer driven by a [`Reconciler`].
pub trait Presentation {
    type VertexHandle;
    type EdgeHandle;

    /// Remove a visual node and any label attached to it.
    fn remove_visual_vertex(&mut self, handle: &Self::VertexHandle);

    /// Remove a visual edge and any label attached to it.
    fn remove_visual_edge(&mut self, handle: &Self::EdgeHandle);

    /// Record that `a` and `b` are joined, on both nodes.
    fn link_adjacent(&mut self, a: &Self::VertexHandle, b: &Self::VertexHandle);

    /// Drop one adjacency link between `a` and `b`, on both nodes.
    fn unlink_adjacent(&mut self, a: &Self::VertexHandle, b: &Self::VertexHandle);
}

/// Creation hooks for a presentation of a `GraphModel<V, W, _>`.
pub trait CreateVisuals<V, W>: Presentation {
    /// Create a visual node for `vertex` centred at `at`.
    fn create_visual_vertex(&mut self, vertex: &Vertex<V>, at: Point) -> Self::VertexHandle;

    /// Create a visual edge bound to two existing visual nodes.
    fn create_visual_edge(
        &mut self,
        start: &Self::VertexHandle,
        end: &Self::VertexHandle,
        edge: &Edge<W>,
    ) -> Self::EdgeHandle;
}

struct DisplayedVertex<H> {
    vertex: VertexId,
    handle: H,
}

struct DisplayedEdge<H> {
    edge: EdgeId,
    handle: H,
    endpoints: EdgeKey,
}

/// Diffs the model against what a presentation displays and converges them.
///
/// Not re-entrant: a pass must finish before the next starts, and the
/// presentation must not be mutated by anything else during a pass.
pub struct Reconciler<VH, EH> {
    vertices: HashMap<String, DisplayedVertex<VH>>,
    edges: HashMap<EdgeKey, DisplayedEdge<EH>>,
    placement: Box<dyn Placement>,
    bounds: Bounds,
    sequence: u64,
}

impl<VH, EH> fmt::Debug for Reconciler<VH, EH> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("displayed_vertices", &self.vertices.len())
            .field("displayed_edges", &self.edges.len())
            .field("bounds", &self.bounds)
            .field("sequence", &self.sequence)
            .finish()
    }
}

impl<VH, EH> Reconciler<VH, EH> {
    /// New vertices are positioned by `placement` inside `bounds`.
    pub fn new(placement: impl Placement + 'static, bounds: Bounds) -> Self {
        Reconciler {
            vertices: HashMap::new(),
            edges: HashMap::new(),
            placement: Box::new(placement),
            bounds,
            sequence: 0,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn set_placement(&mut self, placement: impl Placement + 'static) {
        self.placement = Box::new(placement);
    }

    /// Number of completed reconciliation passes.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Keys of the vertices currently displayed.
    pub fn displayed_vertices(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.vertices.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Keys of the edges currently displayed.
    pub fn displayed_edges(&self) -> Vec<&EdgeKey> {
        let mut keys: Vec<&EdgeKey> = self.edges.keys().collect();
        keys.sort_unstable();
        keys
    }

    pub fn vertex_handle(&self, key: &str) -> Option<&VH> {
        self.vertices.get(key).map(|d| &d.handle)
    }

    pub fn edge_handle(&self, key: &EdgeKey) -> Option<&EH> {
        self.edges.get(key).map(|d| &d.handle)
    }

    /// Compute what a pass would do, without touching anything.
    ///
    /// An entity is stale if its key no longer resolves in the model or
    /// resolves to a different handle (removed and re-added since display).
    pub fn plan<V, W, K: KeyDerivation<V>>(&self, model: &GraphModel<V, W, K>) -> GraphDiff {
        let mut diff = GraphDiff::new(self.sequence);

        for id in model.vertices() {
            if let Some(vertex) = model.vertex(id) {
                let shown = self.vertices.get(vertex.key());
                if shown.is_none_or(|d| d.vertex != id) {
                    diff.added_vertices.push(vertex.key().to_string());
                }
            }
        }
        for (key, shown) in &self.vertices {
            if model.vertex_by_key(key) != Some(shown.vertex) {
                diff.removed_vertices.push(key.clone());
            }
        }

        for id in model.edges() {
            if let Some(edge) = model.edge(id) {
                let shown = self.edges.get(edge.key());
                if shown.is_none_or(|d| d.edge != id) {
                    diff.added_edges.push(edge.key().clone());
                }
            }
        }
        for (key, shown) in &self.edges {
            if model.edge_by_key(key) != Some(shown.edge) {
                diff.removed_edges.push(key.clone());
            }
        }

        diff.sort();
        diff
    }

    /// Run one pass: tear down stale edges, then stale vertices, then create
    /// missing vertices, then missing edges. Returns what was applied.
    pub fn reconcile<V, W, K, P>(
        &mut self,
        model: &GraphModel<V, W, K>,
        presentation: &mut P,
    ) -> GraphDiff
    where
        K: KeyDerivation<V>,
        P: CreateVisuals<V, W, VertexHandle = VH, EdgeHandle = EH>,
    {
        let diff = self.plan(model);
        self.apply(diff, model, presentation)
    }

    /// Apply a planned diff. Entries that turn out not to be applicable are
    /// skipped and left out of the returned diff.
    fn apply<V, W, K, P>(
        &mut self,
        mut diff: GraphDiff,
        model: &GraphModel<V, W, K>,
        presentation: &mut P,
    ) -> GraphDiff
    where
        K: KeyDerivation<V>,
        P: CreateVisuals<V, W, VertexHandle = VH, EdgeHandle = EH>,
    {
        for key in &diff.removed_edges {
            self.teardown_edge(key, presentation);
        }
        for key in &diff.removed_vertices {
            self.teardown_vertex(key, presentation);
        }

        let mut skipped_vertices = Vec::new();
        for key in &diff.added_vertices {
            let Some((id, vertex)) = model
                .vertex_by_key(key)
                .and_then(|id| model.vertex(id).map(|v| (id, v)))
            else {
                skipped_vertices.push(key.clone());
                continue;
            };
            let at = self.placement.place(key, self.bounds);
            let handle = presentation.create_visual_vertex(vertex, at);
            debug!("Visual vertex created: {} at ({:.1}, {:.1})", key, at.x, at.y);
            self.vertices.insert(key.clone(), DisplayedVertex { vertex: id, handle });
        }

        let mut skipped_edges = Vec::new();
        for key in &diff.added_edges {
            let Some((id, edge)) = model
                .edge_by_key(key)
                .and_then(|id| model.edge(id).map(|e| (id, e)))
            else {
                skipped_edges.push(key.clone());
                continue;
            };
            let (Some(start), Some(end)) = (self.vertices.get(&key.start), self.vertices.get(&key.end))
            else {
                warn!("Edge {} has an endpoint that is not displayed; skipped", key);
                skipped_edges.push(key.clone());
                continue;
            };
            let handle = presentation.create_visual_edge(&start.handle, &end.handle, edge);
            presentation.link_adjacent(&start.handle, &end.handle);
            debug!("Visual edge created: {}", key);
            self.edges.insert(
                key.clone(),
                DisplayedEdge {
                    edge: id,
                    handle,
                    endpoints: key.clone(),
                },
            );
        }

        diff.added_vertices.retain(|key| !skipped_vertices.contains(key));
        diff.added_edges.retain(|key| !skipped_edges.contains(key));

        self.sequence += 1;
        diff.sequence = self.sequence;
        diff
    }

    /// Tear down everything displayed, edges first.
    pub fn clear<P>(&mut self, presentation: &mut P) -> GraphDiff
    where
        P: Presentation<VertexHandle = VH, EdgeHandle = EH>,
    {
        let mut diff = GraphDiff::new(self.sequence);
        diff.removed_edges = self.edges.keys().cloned().collect();
        diff.removed_vertices = self.vertices.keys().cloned().collect();
        diff.sort();

        for key in &diff.removed_edges {
            self.teardown_edge(key, presentation);
        }
        for key in &diff.removed_vertices {
            self.teardown_vertex(key, presentation);
        }

        self.sequence += 1;
        diff.sequence = self.sequence;
        diff
    }

    fn teardown_edge<P>(&mut self, key: &EdgeKey, presentation: &mut P)
    where
        P: Presentation<VertexHandle = VH, EdgeHandle = EH>,
    {
        let Some(shown) = self.edges.get(key) else {
            return;
        };
        presentation.remove_visual_edge(&shown.handle);

        let start = self.vertices.get(&shown.endpoints.start);
        let end = self.vertices.get(&shown.endpoints.end);
        match (start, end) {
            (Some(start), Some(end)) => presentation.unlink_adjacent(&start.handle, &end.handle),
            _ => warn!("Edge {} lost an endpoint visual before teardown", key),
        }

        self.edges.remove(key);
        debug!("Visual edge removed: {}", key);
    }

    fn teardown_vertex<P>(&mut self, key: &str, presentation: &mut P)
    where
        P: Presentation<VertexHandle = VH, EdgeHandle = EH>,
    {
        if let Some(shown) = self.vertices.remove(key) {
            presentation.remove_visual_vertex(&shown.handle);
            debug!("Visual vertex removed: {}", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::DisplayKey;

    /// Records every hook call in order.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Presentation for Recorder {
        type VertexHandle = String;
        type EdgeHandle = String;

        fn remove_visual_vertex(&mut self, handle: &String) {
            self.calls.push(format!("remove_vertex {}", handle));
        }

        fn remove_visual_edge(&mut self, handle: &String) {
            self.calls.push(format!("remove_edge {}", handle));
        }

        fn link_adjacent(&mut self, a: &String, b: &String) {
            self.calls.push(format!("link {} {}", a, b));
        }

        fn unlink_adjacent(&mut self, a: &String, b: &String) {
            self.calls.push(format!("unlink {} {}", a, b));
        }
    }

    impl CreateVisuals<&'static str, f64> for Recorder {
        fn create_visual_vertex(&mut self, vertex: &Vertex<&'static str>, _at: Point) -> String {
            self.calls.push(format!("create_vertex {}", vertex.key()));
            vertex.key().to_string()
        }

        fn create_visual_edge(&mut self, start: &String, end: &String, edge: &Edge<f64>) -> String {
            self.calls.push(format!("create_edge {}->{} {}", start, end, edge.weight()));
            edge.key().to_string()
        }
    }

    fn origin(_: &str, _: Bounds) -> Point {
        Point::default()
    }

    #[test]
    fn test_vertex_teardown_waits_for_edges() {
        let mut g: GraphModel<&'static str, f64, DisplayKey> = GraphModel::new(DisplayKey);
        let a = g.add_vertex("a").unwrap();
        g.add_vertex("b").unwrap();
        g.add_edge(&"a", &"b", 0.5).unwrap();

        let mut rec = Recorder::default();
        let mut reconciler = Reconciler::new(origin, Bounds::sized(100.0, 100.0));
        reconciler.reconcile(&g, &mut rec);
        rec.calls.clear();

        g.remove_vertex(a).unwrap();
        reconciler.reconcile(&g, &mut rec);

        assert_eq!(
            rec.calls,
            vec!["remove_edge a | b", "unlink a b", "remove_vertex a"]
        );
    }

    #[test]
    fn test_skipped_edge_is_left_out_of_diff() {
        let mut g: GraphModel<&'static str, f64, DisplayKey> = GraphModel::new(DisplayKey);
        g.add_vertex("a").unwrap();
        g.add_vertex("b").unwrap();
        g.add_edge(&"a", &"b", 0.5).unwrap();

        let mut rec = Recorder::default();
        let mut reconciler = Reconciler::new(origin, Bounds::sized(100.0, 100.0));

        // Plan asks for `a | b` but only `a` gets displayed.
        let mut diff = reconciler.plan(&g);
        diff.added_vertices.retain(|key| key == "a");
        let applied = reconciler.apply(diff, &g, &mut rec);

        assert_eq!(applied.added_vertices, vec!["a"]);
        assert!(applied.added_edges.is_empty());
        assert_eq!(rec.calls, vec!["create_vertex a"]);
        assert!(reconciler.displayed_edges().is_empty());

        // The next pass picks up what was skipped.
        let applied = reconciler.reconcile(&g, &mut rec);
        assert_eq!(applied.added_vertices, vec!["b"]);
        assert_eq!(applied.added_edges, vec![EdgeKey::new("a", "b")]);
    }

    #[test]
    fn test_readded_vertex_is_redisplayed() {
        let mut g: GraphModel<&'static str, f64, DisplayKey> = GraphModel::new(DisplayKey);
        let a = g.add_vertex("a").unwrap();

        let mut rec = Recorder::default();
        let mut reconciler = Reconciler::new(origin, Bounds::sized(100.0, 100.0));
        reconciler.reconcile(&g, &mut rec);

        g.remove_vertex(a).unwrap();
        g.add_vertex("a").unwrap();
        rec.calls.clear();

        let diff = reconciler.reconcile(&g, &mut rec);
        assert_eq!(diff.removed_vertices, vec!["a"]);
        assert_eq!(diff.added_vertices, vec!["a"]);
        assert_eq!(rec.calls, vec!["remove_vertex a", "create_vertex a"]);
    }
}
