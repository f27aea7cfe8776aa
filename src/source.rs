//! Location source boundary: the contract a positioning provider fulfils,
//! plus a deterministic replay source for tests and simulations.

use std::time::Duration;

use log::debug;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::models::Fix;

const FIX_CHANNEL_CAPACITY: usize = 16;

/// Errors a positioning provider can surface at subscription time.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Location access is not granted. Fatal for the session; the caller
    /// must re-initiate tracking once access is available.
    #[error("location permission not granted")]
    PermissionDenied,

    #[error("location provider unavailable: {0}")]
    Unavailable(String),
}

/// A provider of raw location fixes.
///
/// `subscribe` starts delivery and hands back the receiving end of a fix
/// channel. The interval is a request hint, not a hard guarantee; providers
/// may deliver faster or slower. Dropping the receiver unsubscribes and
/// halts further delivery.
pub trait LocationSource: Send {
    fn subscribe(&mut self, interval: Duration) -> Result<mpsc::Receiver<Fix>, SourceError>;
}

/// Plays back a scripted sequence of fixes on the requested interval.
///
/// Stands in for a platform provider in tests and simulations. The channel
/// closes once the script is exhausted. Must be subscribed from within a
/// tokio runtime.
pub struct ReplaySource {
    fixes: Vec<Fix>,
}

impl ReplaySource {
    pub fn new(fixes: Vec<Fix>) -> Self {
        Self { fixes }
    }
}

impl LocationSource for ReplaySource {
    fn subscribe(&mut self, interval: Duration) -> Result<mpsc::Receiver<Fix>, SourceError> {
        let fixes = std::mem::take(&mut self.fixes);
        let (tx, rx) = mpsc::channel(FIX_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            for fix in fixes {
                ticker.tick().await;
                if tx.send(fix).await.is_err() {
                    debug!("replay subscriber dropped, halting delivery");
                    return;
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fix(latitude: f64) -> Fix {
        Fix {
            latitude,
            longitude: 0.0,
            accuracy: 5.0,
            instant: Utc::now(),
        }
    }

    #[tokio::test]
    async fn replays_the_script_in_order_then_closes() {
        let mut source = ReplaySource::new(vec![fix(1.0), fix(2.0), fix(3.0)]);
        let mut rx = source.subscribe(Duration::from_millis(1)).unwrap();

        assert_eq!(rx.recv().await.unwrap().latitude, 1.0);
        assert_eq!(rx.recv().await.unwrap().latitude, 2.0);
        assert_eq!(rx.recv().await.unwrap().latitude, 3.0);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn subscribe_consumes_the_script() {
        let mut source = ReplaySource::new(vec![fix(1.0)]);
        let mut rx = source.subscribe(Duration::from_millis(1)).unwrap();
        assert_eq!(rx.recv().await.unwrap().latitude, 1.0);
        drop(rx);

        // A second subscription has nothing left to play.
        let mut rx = source.subscribe(Duration::from_millis(1)).unwrap();
        assert!(rx.recv().await.is_none());
    }
}
