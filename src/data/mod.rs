//! Content and style image sources

mod content;
mod styles;

pub use content::{BatchSource, ContentStream};
pub use styles::StyleCatalog;

use crate::Result;
use std::path::{Path, PathBuf};

/// List the decodable image files directly under `dir`, in sorted order.
pub(crate) fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn is_image_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("png" | "jpg" | "jpeg" | "bmp")
    )
}
