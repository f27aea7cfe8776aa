use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::broadcast::UpdateBroadcaster;
use crate::models::{Fix, LocationRecord, TrackUpdate};
use crate::store::LocationStore;

use super::policy::should_accept;

pub(crate) async fn tracking_loop(
    mut fixes: mpsc::Receiver<Fix>,
    store: Arc<LocationStore>,
    broadcaster: UpdateBroadcaster,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            maybe_fix = fixes.recv() => {
                match maybe_fix {
                    Some(fix) => {
                        if let Err(err) = record_fix(&fix, &store, &broadcaster) {
                            error!(
                                "failed to record fix ({}, {}): {err:?}",
                                fix.latitude, fix.longitude
                            );
                        }
                    }
                    None => {
                        info!("location source closed, tracking loop exiting");
                        break;
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("tracking loop shutting down");
                break;
            }
        }
    }
}

/// Run one fix through the sampling policy, persisting and publishing it if
/// accepted. The policy compares against the store's last persisted record,
/// so the notion of "last" can never drift from what is on disk.
fn record_fix(fix: &Fix, store: &LocationStore, broadcaster: &UpdateBroadcaster) -> Result<()> {
    let last = store.last();
    if !should_accept(last.as_ref(), fix) {
        debug!(
            "skipping fix ({}, {}): duplicate or below movement threshold",
            fix.latitude, fix.longitude
        );
        return Ok(());
    }

    let record = LocationRecord::from_fix(fix);
    if store.append(record.clone())? {
        broadcaster.publish(TrackUpdate::from(&record));
    }

    Ok(())
}
