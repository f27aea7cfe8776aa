use log::debug;
use tokio::sync::broadcast;

use crate::models::TrackUpdate;

const DEFAULT_CAPACITY: usize = 64;

/// Fans accepted samples out to UI-facing subscribers.
///
/// An update is published only after its record has been persisted, so
/// subscribers never see a sample the store does not hold, and each accepted
/// sample produces at most one update.
#[derive(Clone)]
pub struct UpdateBroadcaster {
    tx: broadcast::Sender<TrackUpdate>,
}

impl UpdateBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrackUpdate> {
        self.tx.subscribe()
    }

    /// Publish an update to all current subscribers. Having none is normal,
    /// not an error.
    pub fn publish(&self, update: TrackUpdate) {
        if self.tx.send(update).is_err() {
            debug!("track update published with no subscribers");
        }
    }
}

impl Default for UpdateBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(latitude: f64) -> TrackUpdate {
        TrackUpdate {
            latitude,
            longitude: 0.0,
            timestamp: "t".to_string(),
        }
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let broadcaster = UpdateBroadcaster::default();
        broadcaster.publish(update(1.0));
    }

    #[tokio::test]
    async fn subscribers_receive_published_updates_in_order() {
        let broadcaster = UpdateBroadcaster::default();
        let mut rx = broadcaster.subscribe();

        broadcaster.publish(update(1.0));
        broadcaster.publish(update(2.0));

        assert_eq!(rx.recv().await.unwrap().latitude, 1.0);
        assert_eq!(rx.recv().await.unwrap().latitude, 2.0);
    }
}
