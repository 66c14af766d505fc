//! Image references: the element type carried by graph vertices

use std::fmt;
use std::path::{Path, PathBuf};

use imgraph_core::{FileNameKey, GraphModel};
use serde::Deserialize;

/// File extensions treated as images when scanning.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp"];

/// Graph of images keyed by file name, weighted by similarity score.
pub type ImageGraph = GraphModel<ImageRef, f64, FileNameKey>;

/// Locator of an image resource. Its identity is the file name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ImageRef {
    path: PathBuf,
}

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ImageRef { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for ImageRef {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// True if the path has one of [`IMAGE_EXTENSIONS`], case-insensitively.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
