mod loop_worker;
mod policy;

pub use policy::{haversine_distance, should_accept, MIN_MOVE_DISTANCE_METERS};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::broadcast::UpdateBroadcaster;
use crate::source::LocationSource;
use crate::store::LocationStore;

use loop_worker::tracking_loop;

/// Owns the background tracking task and the source feeding it.
pub struct TrackingController {
    source: Option<Box<dyn LocationSource>>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl TrackingController {
    pub fn new() -> Self {
        Self {
            source: None,
            handle: None,
            cancel_token: None,
        }
    }

    /// Subscribe to `source` and spawn the tracking loop.
    ///
    /// A subscription refusal (permission denial included) surfaces here,
    /// before any task is spawned. The source is held for the lifetime of
    /// the session so its delivery keeps running until [`stop`].
    ///
    /// [`stop`]: TrackingController::stop
    pub fn start(
        &mut self,
        mut source: Box<dyn LocationSource>,
        interval: Duration,
        store: Arc<LocationStore>,
        broadcaster: UpdateBroadcaster,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("tracking already active");
        }

        let fixes = source
            .subscribe(interval)
            .context("location source rejected subscription")?;

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(tracking_loop(fixes, store, broadcaster, token_clone));

        self.source = Some(source);
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Cancel the loop and wait for it to finish, then release the source.
    /// An in-flight append completes before this returns. Idempotent.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle.await.context("tracking loop task failed to join")?;
            info!("tracking stopped");
        }

        self.source = None;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Default for TrackingController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ReplaySource;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir) -> (Arc<LocationStore>, UpdateBroadcaster) {
        let store = LocationStore::open(dir.path().join("locations.json")).unwrap();
        (Arc::new(store), UpdateBroadcaster::default())
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (store, broadcaster) = fixture(&dir);

        let mut controller = TrackingController::new();
        controller
            .start(
                Box::new(ReplaySource::new(Vec::new())),
                Duration::from_millis(1),
                Arc::clone(&store),
                broadcaster.clone(),
            )
            .unwrap();

        let err = controller
            .start(
                Box::new(ReplaySource::new(Vec::new())),
                Duration::from_millis(1),
                store,
                broadcaster,
            )
            .unwrap_err();
        assert!(err.to_string().contains("already active"));

        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let (store, broadcaster) = fixture(&dir);

        let mut controller = TrackingController::new();
        assert!(!controller.is_active());
        controller.stop().await.unwrap();

        controller
            .start(
                Box::new(ReplaySource::new(Vec::new())),
                Duration::from_millis(1),
                store,
                broadcaster,
            )
            .unwrap();
        assert!(controller.is_active());

        controller.stop().await.unwrap();
        assert!(!controller.is_active());
        controller.stop().await.unwrap();
    }
}
