//! Graph description file (`imgraph.toml`)

use std::path::{Path, PathBuf};

use anyhow::Context;
use imgraph_core::{Bounds, FileNameKey, GridPlacement, RandomPlacement, Reconciler};
use imgraph_scene::{Scene, VisualId};
use serde::Deserialize;

use crate::image::{ImageGraph, ImageRef};

/// Default description file name, relative to the root.
pub const DEFAULT_GRAPH_FILE: &str = "imgraph.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementKind {
    #[default]
    Random,
    Grid,
}

/// `[canvas]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    pub seed: Option<u64>,
    pub placement: PlacementKind,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            width: 800.0,
            height: 600.0,
            radius: imgraph_scene::DEFAULT_RADIUS,
            seed: None,
            placement: PlacementKind::Random,
        }
    }
}

impl CanvasConfig {
    pub fn scene(&self) -> Scene {
        Scene::new(self.width, self.height).with_radius(self.radius)
    }

    pub fn reconciler(&self) -> Reconciler<VisualId, VisualId> {
        let bounds = Bounds::sized(self.width, self.height);
        match self.placement {
            PlacementKind::Random => Reconciler::new(RandomPlacement::new(self.seed), bounds),
            PlacementKind::Grid => Reconciler::new(GridPlacement::new(self.radius * 2.0), bounds),
        }
    }
}

/// One `[[vertices]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VertexEntry {
    pub path: ImageRef,
}

/// One `[[edges]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeEntry {
    pub start: ImageRef,
    pub end: ImageRef,
    pub weight: f64,
}

/// The whole description file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub vertices: Vec<VertexEntry>,
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
}

impl GraphConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading graph file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing graph file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Build the model: every vertex first, then every edge.
    pub fn build_model(&self) -> imgraph_core::Result<ImageGraph> {
        let mut graph = ImageGraph::new(FileNameKey);
        for entry in &self.vertices {
            graph.add_vertex(entry.path.clone())?;
        }
        for entry in &self.edges {
            graph.add_edge(&entry.start, &entry.end, entry.weight)?;
        }
        Ok(graph)
    }
}

/// Resolve the description file against the root unless it is absolute.
pub fn graph_file_path(root: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgraph_core::GraphError;

    const SAMPLE: &str = r#"
[canvas]
width = 400.0
height = 300.0
seed = 7
placement = "grid"

[[vertices]]
path = "images/img1.png"

[[vertices]]
path = "images/img2.png"

[[edges]]
start = "images/img1.png"
end = "images/img2.png"
weight = 0.5
"#;

    #[test]
    fn test_parse_sample() {
        let config = GraphConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.canvas.width, 400.0);
        assert_eq!(config.canvas.radius, imgraph_scene::DEFAULT_RADIUS);
        assert_eq!(config.canvas.seed, Some(7));
        assert_eq!(config.canvas.placement, PlacementKind::Grid);
        assert_eq!(config.vertices.len(), 2);
        assert_eq!(config.edges[0].weight, 0.5);
    }

    #[test]
    fn test_defaults_for_empty_file() {
        let config = GraphConfig::parse("").unwrap();
        assert_eq!(config, GraphConfig::default());
        assert_eq!(config.canvas.placement, PlacementKind::Random);
    }

    #[test]
    fn test_build_model() {
        let graph = GraphConfig::parse(SAMPLE).unwrap().build_model().unwrap();
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let v1 = graph.vertex_by_key("img1.png").unwrap();
        let v2 = graph.vertex_by_key("img2.png").unwrap();
        assert!(graph.adjacent(v1, v2).unwrap());
    }

    #[test]
    fn test_build_model_rejects_duplicate_file_names() {
        let text = r#"
[[vertices]]
path = "a/same.png"

[[vertices]]
path = "b/same.png"
"#;
        let err = GraphConfig::parse(text).unwrap().build_model().unwrap_err();
        assert!(matches!(err, GraphError::DuplicateKey { .. }));
    }

    #[test]
    fn test_build_model_rejects_unknown_endpoint() {
        let text = r#"
[[vertices]]
path = "a.png"

[[edges]]
start = "a.png"
end = "missing.png"
weight = 1.0
"#;
        let err = GraphConfig::parse(text).unwrap().build_model().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(GraphConfig::parse("[[vertices]]\npath = 3").is_err());
    }

    #[test]
    fn test_graph_file_path() {
        let root = Path::new("/repo");
        assert_eq!(
            graph_file_path(root, Path::new("imgraph.toml")),
            PathBuf::from("/repo/imgraph.toml")
        );
        assert_eq!(
            graph_file_path(root, Path::new("/etc/g.toml")),
            PathBuf::from("/etc/g.toml")
        );
    }
}
