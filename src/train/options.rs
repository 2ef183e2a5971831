//! Training run configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for one training run.
///
/// Loadable from YAML; the `with_*` builders cover programmatic use. The
/// orchestrator performs no validation beyond filesystem checks, so
/// [`TrainOptions::validate`] exists for front-ends that want to fail fast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Content image corpus root
    pub image_dir: PathBuf,

    /// Style image directory
    pub style_dir: PathBuf,

    /// Checkpoint root; subdirectory count drives run-id allocation
    pub checkpoint_dir: PathBuf,

    /// Stats output root
    pub stats_dir: PathBuf,

    /// Content batch size per step
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Total optimizer steps before stopping
    #[serde(default = "default_num_parameter_updates")]
    pub num_parameter_updates: usize,

    /// Multiplier applied to the raw content loss
    #[serde(default = "default_content_weight")]
    pub content_weight: f32,

    /// Multiplier applied to the raw style loss
    #[serde(default = "default_style_weight")]
    pub style_weight: f32,

    /// Ordered subset of catalog style indices used this run; defines K
    /// and the rotation order
    #[serde(default = "default_style_idxs")]
    pub style_idxs: Vec<usize>,

    /// Fixed learning rate for the Adam optimizer
    #[serde(default = "default_lr")]
    pub lr: f32,

    /// Progress display interval in steps
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,

    /// Content shuffle seed; OS entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Stop the run when the total loss goes non-finite
    #[serde(default)]
    pub halt_on_non_finite: bool,

    /// Save a parameter snapshot every N updates
    #[serde(default)]
    pub snapshot_interval: Option<usize>,

    /// Save a parameter snapshot when the run completes
    #[serde(default)]
    pub snapshot_final: bool,
}

fn default_batch_size() -> usize {
    4
}

fn default_num_parameter_updates() -> usize {
    100
}

fn default_content_weight() -> f32 {
    1e5
}

fn default_style_weight() -> f32 {
    1e10
}

fn default_style_idxs() -> Vec<usize> {
    vec![0, 3]
}

fn default_lr() -> f32 {
    1e-3
}

fn default_log_interval() -> usize {
    1
}

impl TrainOptions {
    /// Create options for the given directories with default hyperparameters.
    pub fn new(
        image_dir: impl Into<PathBuf>,
        style_dir: impl Into<PathBuf>,
        checkpoint_dir: impl Into<PathBuf>,
        stats_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            image_dir: image_dir.into(),
            style_dir: style_dir.into(),
            checkpoint_dir: checkpoint_dir.into(),
            stats_dir: stats_dir.into(),
            batch_size: default_batch_size(),
            num_parameter_updates: default_num_parameter_updates(),
            content_weight: default_content_weight(),
            style_weight: default_style_weight(),
            style_idxs: default_style_idxs(),
            lr: default_lr(),
            log_interval: default_log_interval(),
            seed: None,
            halt_on_non_finite: false,
            snapshot_interval: None,
            snapshot_final: false,
        }
    }

    /// Load options from a YAML file.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        serde_yaml::from_str(&contents)
            .map_err(|e| Error::Serialization(format!("YAML parse failed: {e}")))
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_num_parameter_updates(mut self, updates: usize) -> Self {
        self.num_parameter_updates = updates;
        self
    }

    pub fn with_weights(mut self, content_weight: f32, style_weight: f32) -> Self {
        self.content_weight = content_weight;
        self.style_weight = style_weight;
        self
    }

    pub fn with_style_idxs(mut self, style_idxs: Vec<usize>) -> Self {
        self.style_idxs = style_idxs;
        self
    }

    pub fn with_lr(mut self, lr: f32) -> Self {
        self.lr = lr;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_halt_on_non_finite(mut self) -> Self {
        self.halt_on_non_finite = true;
        self
    }

    pub fn with_snapshots(mut self, interval: usize) -> Self {
        self.snapshot_interval = Some(interval);
        self.snapshot_final = true;
        self
    }

    /// Number of styles used this run.
    pub fn style_count(&self) -> usize {
        self.style_idxs.len()
    }

    /// Check hyperparameter sanity. Intended for front-ends; the training
    /// loop itself does not call this.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if self.num_parameter_updates == 0 {
            return Err(Error::Config(
                "num_parameter_updates must be at least 1".into(),
            ));
        }
        if self.style_idxs.is_empty() {
            return Err(Error::Config("style_idxs must not be empty".into()));
        }
        if !(self.content_weight > 0.0 && self.content_weight.is_finite()) {
            return Err(Error::Config("content_weight must be positive".into()));
        }
        if !(self.style_weight > 0.0 && self.style_weight.is_finite()) {
            return Err(Error::Config("style_weight must be positive".into()));
        }
        if self.log_interval == 0 {
            return Err(Error::Config("log_interval must be at least 1".into()));
        }
        Ok(())
    }
}
