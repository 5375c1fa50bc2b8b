use std::time::{Duration, Instant};

use serde::Serialize;

/// A cached value together with the bookkeeping the read-through cache needs.
///
/// `stored_at` is only written when the entry is created or fully replaced.
/// Reads bump `hit_count` and nothing else.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
    pub ttl: Duration,
    pub hit_count: u64,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, stored_at: Instant, ttl: Duration) -> Self {
        Self {
            value,
            stored_at,
            ttl,
            hit_count: 0,
        }
    }

    /// Age of the entry at `now`. Saturates at zero if `now` is earlier.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        self.age(now) < self.ttl
    }
}

/// Per-call options for a read-through lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetOptions {
    pub ttl: Duration,
    pub stale_while_revalidate: bool,
    pub force_refresh: bool,
}

impl GetOptions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            stale_while_revalidate: false,
            force_refresh: false,
        }
    }

    /// Serve stale values immediately and refresh them in the background.
    pub fn swr(mut self) -> Self {
        self.stale_while_revalidate = true;
        self
    }

    /// Skip every cache rule and fetch unconditionally.
    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

/// One row of the read-through cache observability report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary {
    pub key: String,
    pub hits: u64,
    pub age_secs: u64,
    pub valid: bool,
}

/// Read-only snapshot of the read-through cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadThroughStats {
    pub size: usize,
    pub top_entries: Vec<EntrySummary>,
}

/// What a sweep pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub expired: usize,
    pub evicted: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.expired + self.evicted
    }
}
