//! Integration tests for Imgraph
//!
//! These tests verify that the model, the reconciler and the scene work together,
//! and that the CLI drives them end to end.

use std::fs;
use std::path::Path;
use std::process::Command;

use imgraph_core::{DisplayKey, EdgeKey, GraphModel, GridPlacement, Reconciler};
use imgraph_scene::{Scene, VisualId, load_scene};
use tempfile::TempDir;

fn imgraph(root: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_imgraph"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = Command::new(env!("CARGO_BIN_EXE_imgraph"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Build and lay out weighted graphs of images"));
}

#[test]
fn test_version_command() {
    let temp_dir = TempDir::new().unwrap();
    let output = imgraph(temp_dir.path(), &["version"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_build_then_status_then_clear() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(
        root.join("imgraph.toml"),
        r#"
[canvas]
width = 300.0
height = 200.0
seed = 42

[[vertices]]
path = "images/img1.png"

[[vertices]]
path = "images/img2.png"

[[vertices]]
path = "images/img3.png"

[[edges]]
start = "images/img1.png"
end = "images/img2.png"
weight = 0.5

[[edges]]
start = "images/img2.png"
end = "images/img3.png"
weight = 0.25
"#,
    )
    .unwrap();

    let output = imgraph(root, &["build"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(root.join(".imgraph/scene.json").exists());

    let scene = load_scene(root).unwrap().unwrap();
    assert_eq!(scene.vertex_count(), 3);
    assert_eq!(scene.edge_count(), 2);
    for vertex in scene.vertices() {
        assert!(scene.canvas().contains(vertex.center));
    }

    let output = imgraph(root, &["status"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 vertices, 2 edges, 5 labels"));

    let output = imgraph(root, &["clear"]);
    assert!(output.status.success());
    assert!(!root.join(".imgraph").exists());

    let output = imgraph(root, &["status"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No saved scene"));
}

#[test]
fn test_build_rejects_unknown_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(
        root.join("graph.toml"),
        r#"
[[vertices]]
path = "a.png"

[[edges]]
start = "a.png"
end = "b.png"
weight = 1.0
"#,
    )
    .unwrap();

    let output = imgraph(root, &["build", "--file", "graph.toml"]);
    assert!(!output.status.success());
    assert!(!root.join(".imgraph").exists());
}

#[test]
fn test_scan_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("more")).unwrap();
    fs::write(root.join("one.png"), b"").unwrap();
    fs::write(root.join("two.jpg"), b"").unwrap();
    fs::write(root.join("more/three.gif"), b"").unwrap();
    // Same file name as one.png, so it collides on key and is skipped.
    fs::write(root.join("more/one.png"), b"").unwrap();
    fs::write(root.join("notes.txt"), b"").unwrap();

    let output = imgraph(root, &["scan"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let scene = load_scene(root).unwrap().unwrap();
    assert_eq!(scene.vertex_count(), 3);
    assert_eq!(scene.edge_count(), 0);
}

/// Drive several edit/reconcile passes against one scene and check that the
/// scene always mirrors the model.
#[test]
fn test_scene_tracks_model_edits() {
    let mut graph: GraphModel<String, f64, DisplayKey> = GraphModel::new(DisplayKey);
    let mut scene = Scene::new(400.0, 400.0);
    let mut engine: Reconciler<VisualId, VisualId> =
        Reconciler::new(GridPlacement::new(100.0), scene.canvas());

    for name in ["a", "b", "c"] {
        graph.add_vertex(name.to_string()).unwrap();
    }
    graph.add_edge(&"a".into(), &"b".into(), 1.0).unwrap();
    graph.add_edge(&"b".into(), &"c".into(), 2.0).unwrap();
    engine.reconcile(&graph, &mut scene);
    assert_eq!((scene.vertex_count(), scene.edge_count()), (3, 2));

    let b = graph.vertex_by_key("b").unwrap();
    graph.remove_vertex(b).unwrap();
    let diff = engine.reconcile(&graph, &mut scene);
    assert_eq!(diff.removed_vertices, vec!["b".to_string()]);
    assert_eq!(diff.removed_edges.len(), 2);
    assert_eq!((scene.vertex_count(), scene.edge_count()), (2, 0));

    graph.add_edge(&"c".into(), &"a".into(), 3.0).unwrap();
    let diff = engine.reconcile(&graph, &mut scene);
    assert_eq!(diff.added_edges, vec![EdgeKey::new("c", "a")]);

    let a = *engine.vertex_handle("a").unwrap();
    let c = *engine.vertex_handle("c").unwrap();
    assert!(scene.are_adjacent(a, c));
    assert_eq!(scene.label_count(), 3);

    assert!(engine.reconcile(&graph, &mut scene).is_empty());
}
