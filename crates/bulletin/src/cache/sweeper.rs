use std::fmt::Display;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::ReadThroughCache;

/// Runs [`ReadThroughCache::sweep`] every `every` until `shutdown` fires.
pub fn spawn_cache_sweeper<V, E>(
    cache: ReadThroughCache<V, E>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Display + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = cache.sweep();
                    if report.total() > 0 {
                        tracing::debug!(
                            expired = report.expired,
                            evicted = report.evicted,
                            remaining = cache.len(),
                            "swept read-through cache"
                        );
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("cache sweeper shutting down");
                    break;
                }
            }
        }
    })
}
