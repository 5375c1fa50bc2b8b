//! Pure decision functions for the read-through cache.
//!
//! The imperative shell (`bulletin::cache::ReadThroughCache`) gathers the
//! facts (entry age, whether a refresh is already running) and acts on the
//! plan returned here.

use std::cmp::Ordering;
use std::time::Duration;

use super::GetOptions;

/// Multiple of an entry's TTL after which the sweep drops it unconditionally.
pub const HARD_EXPIRY_FACTOR: u32 = 2;

/// What a lookup should do, given the current state of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// `force_refresh` was requested: fetch, store, return.
    ForceFetch,
    /// No entry: fetch synchronously, store, return.
    ColdMiss,
    /// Entry younger than its TTL: count the hit and return it.
    FreshHit,
    /// Stale, SWR requested, nobody refreshing: start a background refresh
    /// and return the stale value.
    Revalidate,
    /// Stale, SWR requested, a refresh is already running: return the
    /// stale value without starting another one.
    ServeStale,
    /// Stale and SWR not requested: fetch synchronously and replace.
    BlockingRefresh,
}

impl Lookup {
    /// Whether this plan returns the cached value without waiting on a fetch.
    pub fn serves_cached(self) -> bool {
        matches!(self, Self::FreshHit | Self::Revalidate | Self::ServeStale)
    }
}

/// Decides how to serve a lookup.
///
/// `entry_age` is `None` when the key has no entry. An entry is stale once
/// its age reaches the TTL passed in `options` (not the TTL it was stored
/// with), so callers can tighten freshness per call.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use bulletin_core::cache::{plan_lookup, GetOptions, Lookup};
///
/// let options = GetOptions::new(Duration::from_secs(300)).swr();
/// assert_eq!(plan_lookup(None, &options, false), Lookup::ColdMiss);
/// assert_eq!(
///     plan_lookup(Some(Duration::from_secs(240)), &options, false),
///     Lookup::FreshHit
/// );
/// assert_eq!(
///     plan_lookup(Some(Duration::from_secs(360)), &options, false),
///     Lookup::Revalidate
/// );
/// ```
pub fn plan_lookup(
    entry_age: Option<Duration>,
    options: &GetOptions,
    refresh_in_flight: bool,
) -> Lookup {
    if options.force_refresh {
        return Lookup::ForceFetch;
    }

    let Some(age) = entry_age else {
        return Lookup::ColdMiss;
    };

    if age < options.ttl {
        return Lookup::FreshHit;
    }

    match (options.stale_while_revalidate, refresh_in_flight) {
        (true, false) => Lookup::Revalidate,
        (true, true) => Lookup::ServeStale,
        (false, _) => Lookup::BlockingRefresh,
    }
}

/// Returns true when an entry is past the sweep's hard expiry.
pub fn is_hard_expired(age: Duration, ttl: Duration) -> bool {
    age > ttl.saturating_mul(HARD_EXPIRY_FACTOR)
}

/// Sweep-relevant facts about one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepCandidate {
    pub key: String,
    pub age: Duration,
    pub ttl: Duration,
    pub hit_count: u64,
}

/// Keys a sweep pass should remove, split by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepPlan {
    pub expired: Vec<String>,
    pub evicted: Vec<String>,
}

impl SweepPlan {
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.evicted.is_empty()
    }
}

/// Plans a sweep pass.
///
/// Entries older than twice their TTL are dropped first. If more than
/// `max_entries` survive, the least-hit fifth of the survivors (rounded up)
/// is evicted, older entries first among equal hit counts.
pub fn plan_sweep(candidates: Vec<SweepCandidate>, max_entries: usize) -> SweepPlan {
    let (expired, mut survivors): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| is_hard_expired(c.age, c.ttl));

    let expired = expired.into_iter().map(|c| c.key).collect();

    if survivors.len() <= max_entries {
        return SweepPlan {
            expired,
            evicted: Vec::new(),
        };
    }

    let evict_count = survivors.len().div_ceil(5);
    survivors.sort_by(|a, b| match a.hit_count.cmp(&b.hit_count) {
        Ordering::Equal => b.age.cmp(&a.age),
        other => other,
    });

    let evicted = survivors
        .into_iter()
        .take(evict_count)
        .map(|c| c.key)
        .collect();

    SweepPlan { expired, evicted }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn candidate(key: &str, age: u64, ttl: u64, hits: u64) -> SweepCandidate {
        SweepCandidate {
            key: key.to_string(),
            age: secs(age),
            ttl: secs(ttl),
            hit_count: hits,
        }
    }

    #[test]
    fn test_force_refresh_wins_over_everything() {
        let options = GetOptions::new(secs(60)).swr().force_refresh();
        assert_eq!(plan_lookup(None, &options, false), Lookup::ForceFetch);
        assert_eq!(plan_lookup(Some(secs(1)), &options, true), Lookup::ForceFetch);
    }

    #[test]
    fn test_cold_miss() {
        let options = GetOptions::new(secs(60));
        assert_eq!(plan_lookup(None, &options, false), Lookup::ColdMiss);
        assert_eq!(plan_lookup(None, &options, true), Lookup::ColdMiss);
    }

    #[test]
    fn test_fresh_hit_boundary() {
        let options = GetOptions::new(secs(60));
        assert_eq!(plan_lookup(Some(secs(59)), &options, false), Lookup::FreshHit);
        assert_eq!(
            plan_lookup(Some(secs(60)), &options, false),
            Lookup::BlockingRefresh
        );
    }

    #[test]
    fn test_stale_with_swr() {
        let options = GetOptions::new(secs(60)).swr();
        assert_eq!(plan_lookup(Some(secs(61)), &options, false), Lookup::Revalidate);
        assert_eq!(plan_lookup(Some(secs(61)), &options, true), Lookup::ServeStale);
    }

    #[test]
    fn test_stale_without_swr_blocks_even_when_refresh_running() {
        let options = GetOptions::new(secs(60));
        assert_eq!(
            plan_lookup(Some(secs(61)), &options, true),
            Lookup::BlockingRefresh
        );
    }

    #[test]
    fn test_serves_cached() {
        assert!(Lookup::FreshHit.serves_cached());
        assert!(Lookup::Revalidate.serves_cached());
        assert!(Lookup::ServeStale.serves_cached());
        assert!(!Lookup::ColdMiss.serves_cached());
        assert!(!Lookup::BlockingRefresh.serves_cached());
        assert!(!Lookup::ForceFetch.serves_cached());
    }

    #[test]
    fn test_hard_expiry_is_strictly_beyond_twice_ttl() {
        assert!(!is_hard_expired(secs(120), secs(60)));
        assert!(is_hard_expired(secs(121), secs(60)));
    }

    #[test]
    fn test_sweep_drops_hard_expired_only() {
        let plan = plan_sweep(
            vec![
                candidate("news:a", 700, 300, 5),
                candidate("news:b", 500, 300, 0),
                candidate("events:a", 10, 900, 0),
            ],
            100,
        );
        assert_eq!(plan.expired, vec!["news:a".to_string()]);
        assert!(plan.evicted.is_empty());
    }

    #[test]
    fn test_sweep_evicts_least_hit_fifth_over_capacity() {
        let candidates = (0..10)
            .map(|i| candidate(&format!("k:{i}"), 1, 300, i))
            .collect();
        let plan = plan_sweep(candidates, 8);

        assert!(plan.expired.is_empty());
        assert_eq!(plan.evicted, vec!["k:0".to_string(), "k:1".to_string()]);
    }

    #[test]
    fn test_sweep_eviction_rounds_up_and_breaks_ties_by_age() {
        let plan = plan_sweep(
            vec![
                candidate("young", 1, 300, 0),
                candidate("old", 50, 300, 0),
                candidate("popular", 100, 300, 9),
            ],
            2,
        );
        assert_eq!(plan.evicted, vec!["old".to_string()]);
    }

    #[test]
    fn test_sweep_counts_survivors_after_expiry() {
        let plan = plan_sweep(
            vec![
                candidate("a", 1000, 10, 0),
                candidate("b", 1, 10, 0),
                candidate("c", 1, 10, 0),
            ],
            2,
        );
        assert_eq!(plan.expired, vec!["a".to_string()]);
        assert!(plan.evicted.is_empty());
        assert!(!plan.is_empty());
    }
}
