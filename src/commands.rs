//! CLI command implementations

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use imgraph_core::{FileNameKey, GraphDiff};
use imgraph_scene::Scene;

use crate::config::{CanvasConfig, GraphConfig, graph_file_path};
use crate::image::{ImageGraph, ImageRef, is_image};

pub fn build(root: &Path, file: &Path) -> anyhow::Result<()> {
    let path = graph_file_path(root, file);
    tracing::info!("Building graph from: {}", path.display());

    let config = GraphConfig::load(&path)?;
    let graph = config
        .build_model()
        .with_context(|| format!("building graph from {}", path.display()))?;
    tracing::info!(
        "Graph has {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    layout(root, &graph, &config.canvas)
}

pub fn scan(root: &Path) -> anyhow::Result<()> {
    tracing::info!("Scanning for images: {}", root.display());

    let mut graph = ImageGraph::new(FileNameKey);
    for path in find_images(root) {
        let image = ImageRef::new(path);
        if let Err(e) = graph.add_vertex(image.clone()) {
            tracing::warn!("Skipping {}: {}", image, e);
        }
    }
    tracing::info!("Found {} images", graph.vertex_count());

    layout(root, &graph, &CanvasConfig::default())
}

pub fn status(root: &Path) -> anyhow::Result<()> {
    match imgraph_scene::load_scene(root)? {
        Some(scene) => {
            let bounds = scene.plot_bounds();
            println!(
                "{} vertices, {} edges, {} labels",
                scene.vertex_count(),
                scene.edge_count(),
                scene.label_count()
            );
            println!(
                "plot area: {:.1},{:.1} {:.1}x{:.1}",
                bounds.x, bounds.y, bounds.width, bounds.height
            );
        }
        None => println!("No saved scene under {}", root.display()),
    }
    Ok(())
}

pub fn clear(root: &Path) -> anyhow::Result<()> {
    tracing::info!("Clearing cache for: {}", root.display());

    imgraph_scene::clear_cache(root)?;

    tracing::info!("Cache cleared");
    Ok(())
}

/// Reconcile the graph into a fresh scene and save the snapshot.
fn layout(root: &Path, graph: &ImageGraph, canvas: &CanvasConfig) -> anyhow::Result<()> {
    let mut scene: Scene = canvas.scene();
    let mut reconciler = canvas.reconciler();

    let diff = reconciler.reconcile(graph, &mut scene);
    log_diff(&diff);

    let path = imgraph_scene::save_scene(&scene, root)?;
    tracing::info!("Scene saved to {}", path.display());
    Ok(())
}

fn log_diff(diff: &GraphDiff) {
    tracing::info!(
        "Pass {}: +{} vertices, +{} edges, -{} vertices, -{} edges",
        diff.sequence,
        diff.added_vertices.len(),
        diff.added_edges.len(),
        diff.removed_vertices.len(),
        diff.removed_edges.len()
    );
    for key in &diff.added_edges {
        tracing::debug!("Edge displayed: {}", key);
    }
}

/// Walk the root breadth-first, skipping hidden entries, collecting image files.
fn find_images(root: &Path) -> Vec<PathBuf> {
    let mut images = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(current_path) = queue.pop_front() {
        tracing::debug!("Processing directory: {}", current_path.display());

        let entries = match fs::read_dir(&current_path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Cannot read directory {}: {}", current_path.display(), e);
                continue;
            }
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    if entry.file_name().to_string_lossy().starts_with('.') {
                        continue;
                    }
                    paths.push(entry.path());
                }
                Err(e) => tracing::warn!("Cannot read entry: {}", e),
            }
        }
        paths.sort();

        for path in paths {
            if path.is_dir() {
                queue.push_back(path);
            } else if path.is_file() && is_image(&path) {
                images.push(path);
            }
        }
    }

    images
}
