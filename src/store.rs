use std::{fs, path::PathBuf, sync::RwLock};

use anyhow::{Context, Result};
use log::warn;

use crate::models::LocationRecord;

/// Sole owner of the persisted location history.
///
/// The history is a JSON array of records, oldest first, rewritten in full
/// on every append. All consumers go through this interface; readers take
/// snapshots and the tracking loop is the only writer.
pub struct LocationStore {
    path: PathBuf,
    data: RwLock<Vec<LocationRecord>>,
}

impl LocationStore {
    /// Open the history at `path`. A missing file yields an empty history;
    /// a malformed one is logged and treated as empty rather than
    /// propagated.
    pub fn open(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path).with_context(|| {
                format!("failed to read location history from {}", path.display())
            })?;
            match serde_json::from_str(&contents) {
                Ok(records) => records,
                Err(err) => {
                    warn!(
                        "malformed location history in {}, starting empty: {err}",
                        path.display()
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Snapshot of the full history, oldest first.
    pub fn load_all(&self) -> Vec<LocationRecord> {
        self.data.read().unwrap().clone()
    }

    /// Last persisted record, if any.
    pub fn last(&self) -> Option<LocationRecord> {
        self.data.read().unwrap().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().unwrap().is_empty()
    }

    /// Append `record` unless its coordinates exactly equal the last
    /// persisted record's. Returns whether the append was performed.
    ///
    /// The append is all-or-nothing: on a write failure the in-memory and
    /// on-disk history both keep their previous contents.
    pub fn append(&self, record: LocationRecord) -> Result<bool> {
        let mut guard = self.data.write().unwrap();

        if let Some(last) = guard.last() {
            if last.latitude == record.latitude && last.longitude == record.longitude {
                return Ok(false);
            }
        }

        guard.push(record);
        if let Err(err) = self.persist(&guard) {
            guard.pop();
            return Err(err);
        }

        Ok(true)
    }

    fn persist(&self, records: &[LocationRecord]) -> Result<()> {
        let serialized = serde_json::to_string(records)?;

        // Write to a temp file first, then rename for atomicity.
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serialized).with_context(|| {
            format!("failed to write location history to {}", temp_path.display())
        })?;
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!("failed to replace location history at {}", self.path.display())
        })
    }
}
