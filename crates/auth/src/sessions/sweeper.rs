use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::BoundedSessionCache;

/// Periodically drops expired session slots until `shutdown` fires.
pub fn spawn_session_sweeper(
    cache: Arc<BoundedSessionCache>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = cache.remove_expired(Utc::now());
                    if removed > 0 {
                        tracing::debug!(removed, remaining = cache.len(), "swept expired sessions");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("session sweeper shutting down");
                    break;
                }
            }
        }
    })
}
