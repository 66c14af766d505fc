//! Headless scene: visual vertices, visual edges, labels and adjacency links

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use imgraph_core::{Bounds, CreateVisuals, Edge, Point, Presentation, Vertex};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default radius of a vertex circle.
pub const DEFAULT_RADIUS: f64 = 50.0;

/// Handle to a visual node in a [`Scene`]. Vertices, edges and labels share one id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualId(pub u64);

impl fmt::Display for VisualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A vertex drawn as a circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneVertex {
    pub id: VisualId,
    pub center: Point,
    pub radius: f64,
    /// Neighbour -> number of visual edges joining the two.
    #[serde(skip)]
    pub adjacent: BTreeMap<VisualId, u32>,
}

/// A line between two vertex circles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEdge {
    pub id: VisualId,
    pub start: VisualId,
    pub end: VisualId,
}

/// Text attached to a vertex or an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: VisualId,
    pub owner: VisualId,
    pub text: String,
}

/// Serializable form of a [`Scene`]. Adjacency is rebuilt from the edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub canvas: Bounds,
    pub radius: f64,
    pub vertices: Vec<SceneVertex>,
    pub edges: Vec<SceneEdge>,
    pub labels: Vec<Label>,
}

/// In-memory presentation layer driven by a
/// [`Reconciler`](imgraph_core::Reconciler).
#[derive(Debug, Clone)]
pub struct Scene {
    canvas: Bounds,
    radius: f64,
    vertices: BTreeMap<VisualId, SceneVertex>,
    edges: BTreeMap<VisualId, SceneEdge>,
    labels: BTreeMap<VisualId, Label>,
    next_id: u64,
}

impl Scene {
    /// An empty scene drawing on a `width` x `height` canvas.
    pub fn new(width: f64, height: f64) -> Self {
        Scene {
            canvas: Bounds::sized(width, height),
            radius: DEFAULT_RADIUS,
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
            labels: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn canvas(&self) -> Bounds {
        self.canvas
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn vertex(&self, id: VisualId) -> Option<&SceneVertex> {
        self.vertices.get(&id)
    }

    pub fn edge(&self, id: VisualId) -> Option<&SceneEdge> {
        self.edges.get(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &SceneVertex> {
        self.vertices.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &SceneEdge> {
        self.edges.values()
    }

    /// Text of the label attached to a vertex or edge.
    pub fn label_of(&self, owner: VisualId) -> Option<&str> {
        self.labels
            .values()
            .find(|l| l.owner == owner)
            .map(|l| l.text.as_str())
    }

    /// Move a vertex. Returns false if `id` is not a vertex of this scene.
    pub fn set_vertex_position(&mut self, id: VisualId, at: Point) -> bool {
        match self.vertices.get_mut(&id) {
            Some(vertex) => {
                vertex.center = at;
                true
            }
            None => false,
        }
    }

    pub fn vertex_position(&self, id: VisualId) -> Option<Point> {
        self.vertices.get(&id).map(|v| v.center)
    }

    /// True if at least one visual edge joins `a` and `b`.
    pub fn are_adjacent(&self, a: VisualId, b: VisualId) -> bool {
        self.vertices
            .get(&a)
            .is_some_and(|v| v.adjacent.contains_key(&b))
    }

    /// Number of distinct neighbours of a vertex.
    pub fn adjacency_count(&self, id: VisualId) -> usize {
        self.vertices.get(&id).map_or(0, |v| v.adjacent.len())
    }

    /// Bounding box of all vertex centres, or the whole canvas when empty.
    pub fn plot_bounds(&self) -> Bounds {
        Bounds::enclosing(self.vertices.values().map(|v| v.center)).unwrap_or(self.canvas)
    }

    pub fn to_snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            canvas: self.canvas,
            radius: self.radius,
            vertices: self.vertices.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
            labels: self.labels.values().cloned().collect(),
        }
    }

    pub fn from_snapshot(snapshot: SceneSnapshot) -> Self {
        let next_id = snapshot
            .vertices
            .iter()
            .map(|v| v.id.0)
            .chain(snapshot.edges.iter().map(|e| e.id.0))
            .chain(snapshot.labels.iter().map(|l| l.id.0))
            .max()
            .unwrap_or(0);

        let mut scene = Scene {
            canvas: snapshot.canvas,
            radius: snapshot.radius,
            vertices: snapshot
                .vertices
                .into_iter()
                .map(|mut v| {
                    v.adjacent.clear();
                    (v.id, v)
                })
                .collect(),
            edges: BTreeMap::new(),
            labels: snapshot.labels.into_iter().map(|l| (l.id, l)).collect(),
            next_id,
        };
        for edge in snapshot.edges {
            scene.link_adjacent(&edge.start, &edge.end);
            scene.edges.insert(edge.id, edge);
        }
        scene
    }

    fn issue_id(&mut self) -> VisualId {
        self.next_id += 1;
        VisualId(self.next_id)
    }

    fn attach_label(&mut self, owner: VisualId, text: String) {
        let id = self.issue_id();
        self.labels.insert(id, Label { id, owner, text });
    }

    fn detach_labels(&mut self, owner: VisualId) {
        self.labels.retain(|_, label| label.owner != owner);
    }

    fn adjust_link(&mut self, from: VisualId, to: VisualId, linked: bool) {
        let Some(vertex) = self.vertices.get_mut(&from) else {
            return;
        };
        if linked {
            *vertex.adjacent.entry(to).or_insert(0) += 1;
        } else if let Some(count) = vertex.adjacent.get_mut(&to) {
            *count -= 1;
            if *count == 0 {
                vertex.adjacent.remove(&to);
            }
        }
    }
}

impl Presentation for Scene {
    type VertexHandle = VisualId;
    type EdgeHandle = VisualId;

    fn remove_visual_vertex(&mut self, handle: &VisualId) {
        if self.vertices.remove(handle).is_some() {
            self.detach_labels(*handle);
            debug!("Scene vertex removed: {}", handle);
        }
    }

    fn remove_visual_edge(&mut self, handle: &VisualId) {
        if self.edges.remove(handle).is_some() {
            self.detach_labels(*handle);
            debug!("Scene edge removed: {}", handle);
        }
    }

    fn link_adjacent(&mut self, a: &VisualId, b: &VisualId) {
        self.adjust_link(*a, *b, true);
        if a != b {
            self.adjust_link(*b, *a, true);
        }
    }

    fn unlink_adjacent(&mut self, a: &VisualId, b: &VisualId) {
        self.adjust_link(*a, *b, false);
        if a != b {
            self.adjust_link(*b, *a, false);
        }
    }
}

impl<V, W: Display> CreateVisuals<V, W> for Scene {
    fn create_visual_vertex(&mut self, vertex: &Vertex<V>, at: Point) -> VisualId {
        let id = self.issue_id();
        self.vertices.insert(
            id,
            SceneVertex {
                id,
                center: at,
                radius: self.radius,
                adjacent: BTreeMap::new(),
            },
        );
        self.attach_label(id, vertex.key().to_string());
        id
    }

    fn create_visual_edge(&mut self, start: &VisualId, end: &VisualId, edge: &Edge<W>) -> VisualId {
        let id = self.issue_id();
        self.edges.insert(
            id,
            SceneEdge {
                id,
                start: *start,
                end: *end,
            },
        );
        self.attach_label(id, edge.weight().to_string());
        id
    }
}
