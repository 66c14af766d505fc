//! Imgraph Scene — headless presentation layer and scene snapshots

pub mod scene;
pub mod snapshot;


pub use scene::{DEFAULT_RADIUS, Label, Scene, SceneEdge, SceneSnapshot, SceneVertex, VisualId};
pub use snapshot::{
    CACHE_DIR, SCENE_CACHE, cache_dir, clear_cache, ensure_cache_dir, load_scene, save_scene,
    scene_cache_path,
};
