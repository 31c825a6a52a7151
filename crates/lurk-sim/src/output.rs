//! Snapshot Writer
//!
//! Append-only JSONL log of Overseer snapshots.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::warn;

use lurk_events::OverseerSnapshot;

use crate::SimError;

pub struct SnapshotWriter {
    writer: Option<BufWriter<File>>,
    count: u64,
}

impl SnapshotWriter {
    /// Creates a writer that truncates `path`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            count: 0,
        })
    }

    /// A writer that only counts (for dry runs and tests).
    pub fn null() -> Self {
        Self {
            writer: None,
            count: 0,
        }
    }

    pub fn write(&mut self, snapshot: &OverseerSnapshot) -> Result<(), SimError> {
        self.count += 1;
        if let Some(ref mut writer) = self.writer {
            let line = snapshot.to_jsonl()?;
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn flush(&mut self) -> Result<(), SimError> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("failed to flush snapshot log: {}", e);
        }
    }
}
