//! Run identity allocation
//!
//! A run id is derived from a single point-in-time scan of the checkpoint
//! root: one plus the number of existing subdirectories, zero-padded to four
//! digits. Concurrent runs against the same root can race this scan; callers
//! that need isolation should use distinct roots.

use crate::Result;
use std::path::Path;

/// Create `path` and any missing parents. Idempotent.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    std::fs::create_dir_all(path.as_ref())?;
    Ok(())
}

/// Allocate the next sequential run id under `checkpoint_root`.
///
/// Only direct subdirectories count; stray files are ignored.
pub fn allocate_run_id(checkpoint_root: impl AsRef<Path>) -> Result<String> {
    let mut existing = 0;
    for entry in std::fs::read_dir(checkpoint_root.as_ref())? {
        if entry?.path().is_dir() {
            existing += 1;
        }
    }
    Ok(format!("{:04}", existing + 1))
}
