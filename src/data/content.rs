//! Shuffled, batched content image stream

use super::list_image_files;
use crate::codec::{self, ImageTensor, CHANNELS, TRANSFER_SIZE};
use crate::{Error, Result};
use ndarray::{s, Array4};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// Source of content batches.
///
/// Infinite from the training loop's viewpoint: implementations restart the
/// underlying pass transparently and never signal exhaustion.
pub trait BatchSource {
    /// Draw the next content batch.
    fn next_batch(&mut self) -> Result<ImageTensor>;
}

/// Streams shuffled batches from a directory of content images.
///
/// Each pass visits every file once in a fresh shuffled order. The final
/// batch of a pass may be smaller than the configured batch size; it is
/// still yielded. When a pass is exhausted the stream reshuffles and
/// continues, so callers drive it by step count rather than pass boundary.
pub struct ContentStream {
    paths: Vec<PathBuf>,
    batch_size: usize,
    cursor: usize,
    rng: StdRng,
}

impl ContentStream {
    /// Open a stream over `dir` with batches of `batch_size`.
    ///
    /// A seed makes the shuffle order reproducible; without one the order is
    /// drawn from OS entropy. Fails if the directory holds no images.
    pub fn open(dir: impl AsRef<Path>, batch_size: usize, seed: Option<u64>) -> Result<Self> {
        let paths = list_image_files(dir.as_ref())?;
        if paths.is_empty() {
            return Err(Error::EmptyDataset(dir.as_ref().to_path_buf()));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut stream = Self {
            paths,
            batch_size,
            cursor: 0,
            rng,
        };
        stream.reshuffle();
        Ok(stream)
    }

    /// Number of images in one full pass.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn reshuffle(&mut self) {
        self.paths.shuffle(&mut self.rng);
        self.cursor = 0;
    }
}

impl BatchSource for ContentStream {
    fn next_batch(&mut self) -> Result<ImageTensor> {
        if self.cursor >= self.paths.len() {
            self.reshuffle();
        }
        let end = (self.cursor + self.batch_size).min(self.paths.len());
        let mut batch = Array4::zeros((
            end - self.cursor,
            CHANNELS,
            TRANSFER_SIZE,
            TRANSFER_SIZE,
        ));
        for (i, path) in self.paths[self.cursor..end].iter().enumerate() {
            let img = codec::load_image_as_tensor(path)?;
            batch.slice_mut(s![i..i + 1, .., .., ..]).assign(&img);
        }
        self.cursor = end;
        Ok(batch)
    }
}
