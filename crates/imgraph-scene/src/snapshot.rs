//! Scene snapshots persisted under the cache directory

use crate::scene::{Scene, SceneSnapshot};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cache directory: .imgraph/
pub const CACHE_DIR: &str = ".imgraph";

/// Scene snapshot file
pub const SCENE_CACHE: &str = "scene.json";

/// On-disk envelope around a scene snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct SceneFile {
    version: String,
    saved_at: String,
    scene: SceneSnapshot,
}

/// Get cache directory path
pub fn cache_dir(root: &Path) -> PathBuf {
    root.join(CACHE_DIR)
}

/// Get scene snapshot file path
pub fn scene_cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_DIR).join(SCENE_CACHE)
}

/// Ensure cache directory exists
pub fn ensure_cache_dir(root: &Path) -> std::io::Result<()> {
    let cache = cache_dir(root);
    if !cache.exists() {
        std::fs::create_dir_all(&cache)?;
    }
    Ok(())
}

/// Write the scene as pretty JSON. Returns the path written.
pub fn save_scene(scene: &Scene, root: &Path) -> anyhow::Result<PathBuf> {
    ensure_cache_dir(root)
        .with_context(|| format!("creating {}", cache_dir(root).display()))?;
    let path = scene_cache_path(root);

    let file = SceneFile {
        version: env!("CARGO_PKG_VERSION").to_string(),
        saved_at: chrono::Utc::now().to_rfc3339(),
        scene: scene.to_snapshot(),
    };
    let json_str = serde_json::to_string_pretty(&file)?;
    std::fs::write(&path, json_str).with_context(|| format!("writing {}", path.display()))?;

    tracing::debug!("Scene snapshot saved: {}", path.display());
    Ok(path)
}

/// Load the scene snapshot, if one has been saved.
pub fn load_scene(root: &Path) -> anyhow::Result<Option<Scene>> {
    let path = scene_cache_path(root);
    if !path.exists() {
        return Ok(None);
    }

    let json_str =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let file: SceneFile = serde_json::from_str(&json_str)
        .with_context(|| format!("parsing {}", path.display()))?;

    tracing::debug!(
        "Scene snapshot loaded from: {} (saved {})",
        path.display(),
        file.saved_at
    );
    Ok(Some(Scene::from_snapshot(file.scene)))
}

/// Clear cache directory
pub fn clear_cache(root: &Path) -> std::io::Result<()> {
    let cache = cache_dir(root);
    if cache.exists() {
        std::fs::remove_dir_all(&cache)?;
    }
    Ok(())
}
