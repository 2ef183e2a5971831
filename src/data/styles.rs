//! Style image catalog

use super::list_image_files;
use crate::codec::{self, ImageTensor};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Enumerates a fixed directory of style images.
///
/// Catalog order is the sorted file listing, so index assignments are stable
/// across runs as long as the directory contents do not change.
pub struct StyleCatalog {
    paths: Vec<PathBuf>,
}

impl StyleCatalog {
    /// Open the catalog over `dir`. Fails if the directory holds no images.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let paths = list_image_files(dir.as_ref())?;
        if paths.is_empty() {
            return Err(Error::EmptyDataset(dir.as_ref().to_path_buf()));
        }
        Ok(Self { paths })
    }

    /// Number of styles in the catalog.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Decode the styles at `indices`, preserving the requested order so
    /// that rotation slot `i` always maps to `indices[i]`.
    pub fn get_style_tensor_subset(&self, indices: &[usize]) -> Result<Vec<ImageTensor>> {
        let mut styles = Vec::with_capacity(indices.len());
        for &index in indices {
            let path = self
                .paths
                .get(index)
                .ok_or(Error::StyleIndexOutOfRange {
                    index,
                    available: self.paths.len(),
                })?;
            styles.push(codec::load_image_as_tensor(path)?);
        }
        Ok(styles)
    }
}
