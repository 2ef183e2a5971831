//! Per-step stats persistence
//!
//! One line per optimizer step, `update, style_loss, content_loss`, raw
//! decimal magnitudes separated by comma-space, no header. The writer owns
//! the file handle for the run's duration and releases it on every exit
//! path: `finish` flushes explicitly, and dropping the writer flushes too.

use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct StatsWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    records: usize,
}

impl StatsWriter {
    /// Open `stats_dir/stats<run_id>.csv`, truncating any previous contents.
    pub fn create(stats_dir: impl AsRef<Path>, run_id: &str) -> Result<Self> {
        let path = stats_dir.as_ref().join(format!("stats{run_id}.csv"));
        let file = File::create(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            records: 0,
        })
    }

    /// Append one record in step order.
    pub fn append(&mut self, update: usize, style_loss: f32, content_loss: f32) -> Result<()> {
        writeln!(self.writer, "{update}, {style_loss}, {content_loss}")?;
        self.records += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Flush and close.
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
