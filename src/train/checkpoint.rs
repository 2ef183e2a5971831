//! Parameter snapshot extension point
//!
//! The training core mandates no checkpoint policy. Integrators plug a
//! `Checkpointer` and choose an interval through `TrainOptions`; the default
//! implementation writes JSON snapshots under the run's checkpoint
//! directory.

use crate::io::save_params;
use crate::model::Param;
use crate::Result;
use std::path::PathBuf;

/// Persists transfer-network parameter snapshots during a run.
pub trait Checkpointer: Send {
    /// Save a snapshot of `params` after `update` completed steps.
    fn save(&mut self, params: &[Param], run_id: &str, update: usize) -> Result<()>;
}

/// Writes JSON snapshots into `checkpoint_root/<run_id>/`.
pub struct JsonCheckpointer {
    checkpoint_root: PathBuf,
}

impl JsonCheckpointer {
    pub fn new(checkpoint_root: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_root: checkpoint_root.into(),
        }
    }

    pub fn snapshot_path(&self, run_id: &str, update: usize) -> PathBuf {
        self.checkpoint_root
            .join(run_id)
            .join(format!("update_{update:06}.json"))
    }
}

impl Checkpointer for JsonCheckpointer {
    fn save(&mut self, params: &[Param], run_id: &str, update: usize) -> Result<()> {
        std::fs::create_dir_all(self.checkpoint_root.join(run_id))?;
        save_params(params, self.snapshot_path(run_id, update))
    }
}
