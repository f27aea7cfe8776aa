//! Background GPS location tracking engine.
//!
//! A [`Tracker`] owns the persisted tracking preferences, the location
//! history store, and a broadcaster for accepted samples. Tracking runs as a
//! background task fed by an injected [`LocationSource`]; each fix is run
//! through the sampling policy (first fix accepted, exact duplicates and
//! sub-threshold movements skipped), persisted, and then published to
//! subscribers.

mod broadcast;
mod models;
mod prefs;
mod source;
mod store;
mod tracking;
mod utils;

pub use broadcast::UpdateBroadcaster;
pub use models::{Fix, LocationRecord, TrackUpdate};
pub use prefs::{PrefsStore, TrackingPrefs, DEFAULT_INTERVAL_SECS};
pub use source::{LocationSource, ReplaySource, SourceError};
pub use store::LocationStore;
pub use tracking::{
    haversine_distance, should_accept, TrackingController, MIN_MOVE_DISTANCE_METERS,
};
pub use utils::timefmt;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::warn;
use tokio::sync::broadcast::Receiver;
use tokio::sync::Mutex;

const PREFS_FILE: &str = "prefs.json";
const LOCATIONS_FILE: &str = "locations.json";

/// Engine facade wiring preferences, history store, broadcaster, and the
/// tracking controller together.
pub struct Tracker {
    prefs: PrefsStore,
    store: Arc<LocationStore>,
    broadcaster: UpdateBroadcaster,
    controller: Mutex<TrackingController>,
}

impl Tracker {
    /// Open (or create) the tracker state under `data_dir`.
    ///
    /// A persisted `is_tracking = true` means the previous process died with
    /// tracking active; the flag is reset to stopped since no loop is
    /// running in this process yet.
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let prefs = PrefsStore::open(data_dir.join(PREFS_FILE))?;
        let store = Arc::new(LocationStore::open(data_dir.join(LOCATIONS_FILE))?);

        if prefs.is_tracking() {
            warn!("recovered stale tracking flag, resetting to stopped");
            prefs.set_tracking(false)?;
        }

        Ok(Self {
            prefs,
            store,
            broadcaster: UpdateBroadcaster::default(),
            controller: Mutex::new(TrackingController::new()),
        })
    }

    /// Begin background tracking fed by `source`, using the persisted
    /// sampling interval as the request hint.
    ///
    /// Fails if tracking is already active or if the source refuses the
    /// subscription; permission denial surfaces here, before any task
    /// spawns, and leaves the tracker stopped.
    pub async fn start_tracking(&self, source: Box<dyn LocationSource>) -> Result<()> {
        let mut controller = self.controller.lock().await;
        controller.start(
            source,
            self.prefs.interval(),
            Arc::clone(&self.store),
            self.broadcaster.clone(),
        )?;
        self.prefs.set_tracking(true)?;
        Ok(())
    }

    /// Stop background tracking. Idempotent; any in-flight append completes
    /// before this returns, and no further fixes are processed afterwards.
    pub async fn stop_tracking(&self) -> Result<()> {
        let mut controller = self.controller.lock().await;
        controller.stop().await?;
        self.prefs.set_tracking(false)?;
        Ok(())
    }

    pub async fn is_tracking(&self) -> bool {
        self.controller.lock().await.is_active()
    }

    pub fn interval(&self) -> Duration {
        self.prefs.interval()
    }

    pub fn set_interval_secs(&self, secs: u64) -> Result<()> {
        self.prefs.set_interval_secs(secs)
    }

    /// Full history snapshot, oldest first.
    pub fn history(&self) -> Vec<LocationRecord> {
        self.store.load_all()
    }

    /// History newest first, the order a list UI shows it.
    pub fn history_newest_first(&self) -> Vec<LocationRecord> {
        let mut records = self.store.load_all();
        records.reverse();
        records
    }

    /// Subscribe to accepted-sample events.
    pub fn subscribe(&self) -> Receiver<TrackUpdate> {
        self.broadcaster.subscribe()
    }
}
