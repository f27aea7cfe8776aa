use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Persisted tracking state: whether a session is active and how often the
/// location source is asked for fixes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingPrefs {
    pub is_tracking: bool,
    pub interval_secs: u64,
}

impl Default for TrackingPrefs {
    fn default() -> Self {
        Self {
            is_tracking: false,
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

/// JSON-file-backed store for [`TrackingPrefs`]. Every mutation is written
/// through immediately.
pub struct PrefsStore {
    path: PathBuf,
    data: RwLock<TrackingPrefs>,
}

impl PrefsStore {
    /// Open the preferences at `path`. A missing or unreadable-as-JSON file
    /// yields the defaults.
    pub fn open(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read tracking prefs from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            TrackingPrefs::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn is_tracking(&self) -> bool {
        self.data.read().unwrap().is_tracking
    }

    pub fn set_tracking(&self, tracking: bool) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.is_tracking = tracking;
        self.persist(&guard)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.data.read().unwrap().interval_secs)
    }

    /// Update the sampling interval. Zero is rejected and leaves the stored
    /// value untouched.
    pub fn set_interval_secs(&self, secs: u64) -> Result<()> {
        if secs == 0 {
            bail!("interval must be greater than zero");
        }

        let mut guard = self.data.write().unwrap();
        guard.interval_secs = secs;
        self.persist(&guard)
    }

    fn persist(&self, data: &TrackingPrefs) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write tracking prefs to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let prefs = PrefsStore::open(dir.path().join("prefs.json")).unwrap();

        assert!(!prefs.is_tracking());
        assert_eq!(prefs.interval(), Duration::from_secs(DEFAULT_INTERVAL_SECS));
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{{{not json").unwrap();

        let prefs = PrefsStore::open(path).unwrap();
        assert!(!prefs.is_tracking());
        assert_eq!(prefs.interval(), Duration::from_secs(DEFAULT_INTERVAL_SECS));
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");

        {
            let prefs = PrefsStore::open(path.clone()).unwrap();
            prefs.set_tracking(true).unwrap();
            prefs.set_interval_secs(25).unwrap();
        }

        let reopened = PrefsStore::open(path).unwrap();
        assert!(reopened.is_tracking());
        assert_eq!(reopened.interval(), Duration::from_secs(25));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");

        let prefs = PrefsStore::open(path.clone()).unwrap();
        prefs.set_interval_secs(30).unwrap();
        assert!(prefs.set_interval_secs(0).is_err());
        assert_eq!(prefs.interval(), Duration::from_secs(30));

        let reopened = PrefsStore::open(path).unwrap();
        assert_eq!(reopened.interval(), Duration::from_secs(30));
    }
}
