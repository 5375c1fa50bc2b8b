//! Read-through cache with stale-while-revalidate and single-flight fetches.
//!
//! Every key has at most one fetch running at a time. Blocking callers that
//! arrive while a fetch is running wait for its result instead of starting
//! their own. Each fetch is registered under a generation number; explicit
//! invalidation detaches the running fetch, and a detached fetch never
//! writes its result back.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use bulletin_core::cache::{
    pattern_matches, plan_lookup, plan_sweep, table_matches, CacheEntry, EntrySummary, GetOptions,
    Lookup, ReadThroughStats, SweepCandidate, SweepReport,
};
use tokio::sync::broadcast;

const DEFAULT_MAX_ENTRIES: usize = 500;
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadThroughConfig {
    /// Entry count above which the sweep evicts the least-hit entries.
    pub max_entries: usize,
    /// Upper bound for background revalidations. `None` waits forever.
    pub fetch_timeout: Option<Duration>,
}

impl Default for ReadThroughConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            fetch_timeout: Some(DEFAULT_FETCH_TIMEOUT),
        }
    }
}

/// A running fetch. Waiters subscribe to `tx`; dropping the flight closes
/// the channel and tells them to fetch on their own.
struct Flight<V, E> {
    generation: u64,
    tx: broadcast::Sender<Result<V, E>>,
}

struct State<V, E> {
    entries: HashMap<String, CacheEntry<V>>,
    in_flight: HashMap<String, Flight<V, E>>,
    next_generation: u64,
}

impl<V, E> State<V, E> {
    /// Registers a new flight for `key`, detaching any previous one.
    fn begin_flight(&mut self, key: &str) -> u64
    where
        V: Clone,
        E: Clone,
    {
        self.next_generation += 1;
        let generation = self.next_generation;
        let (tx, _) = broadcast::channel(1);
        self.in_flight
            .insert(key.to_string(), Flight { generation, tx });
        generation
    }

    /// Unregisters the flight for `key` if `generation` is still current.
    fn end_flight(&mut self, key: &str, generation: u64) -> Option<Flight<V, E>> {
        if self
            .in_flight
            .get(key)
            .is_some_and(|flight| flight.generation == generation)
        {
            self.in_flight.remove(key)
        } else {
            None
        }
    }

    fn remove_where(&mut self, matches: impl Fn(&str) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !matches(key));
        self.in_flight.retain(|key, _| !matches(key));
        before - self.entries.len()
    }
}

struct Inner<V, E> {
    state: Mutex<State<V, E>>,
    config: ReadThroughConfig,
}

impl<V, E> Inner<V, E> {
    fn lock(&self) -> MutexGuard<'_, State<V, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Unregisters a flight if its fetch is abandoned (cancelled caller,
/// timeout, panic) so waiters are released.
struct FlightGuard<V, E> {
    inner: Option<Arc<Inner<V, E>>>,
    key: String,
    generation: u64,
}

impl<V, E> FlightGuard<V, E> {
    fn new(inner: Arc<Inner<V, E>>, key: &str, generation: u64) -> Self {
        Self {
            inner: Some(inner),
            key: key.to_string(),
            generation,
        }
    }

    fn disarm(mut self) {
        self.inner = None;
    }
}

impl<V, E> Drop for FlightGuard<V, E> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            inner.lock().end_flight(&self.key, self.generation);
        }
    }
}

enum Step<V, E> {
    Cached(V),
    Revalidate(V, u64),
    Lead(u64),
    Join(broadcast::Receiver<Result<V, E>>),
}

/// Current time on the runtime clock, so paused test clocks apply.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Process-local read-through cache. Cloning yields another handle to the
/// same cache.
pub struct ReadThroughCache<V, E> {
    inner: Arc<Inner<V, E>>,
}

impl<V, E> Clone for ReadThroughCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V, E> ReadThroughCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Display + Send + Sync + 'static,
{
    pub fn new(config: ReadThroughConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    entries: HashMap::new(),
                    in_flight: HashMap::new(),
                    next_generation: 0,
                }),
                config,
            }),
        }
    }

    pub fn config(&self) -> ReadThroughConfig {
        self.inner.config
    }

    /// Returns the value for `key`, calling `fetch` when the cache cannot
    /// answer on its own.
    ///
    /// A failed fetch falls back to whatever value is cached for `key`,
    /// however old. Only a failure with nothing cached reaches the caller.
    pub async fn get<F, Fut>(&self, key: &str, fetch: F, options: GetOptions) -> Result<V, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let step = {
            let mut state = self.inner.lock();
            let now = now();
            let refreshing = state.in_flight.contains_key(key);
            let age = state.entries.get(key).map(|entry| entry.age(now));
            let plan = plan_lookup(age, &options, refreshing);
            tracing::trace!(%key, ?plan, "cache lookup");

            let cached = if plan.serves_cached() {
                state.entries.get_mut(key).map(|entry| {
                    if plan == Lookup::FreshHit {
                        entry.hit_count += 1;
                    }
                    entry.value.clone()
                })
            } else {
                None
            };

            let step = match (plan, cached) {
                (Lookup::Revalidate, Some(stale)) => {
                    Step::Revalidate(stale, state.begin_flight(key))
                }
                (_, Some(value)) => Step::Cached(value),
                (Lookup::ForceFetch, None) => Step::Lead(state.begin_flight(key)),
                (_, None) => match state.in_flight.get(key) {
                    Some(flight) => Step::Join(flight.tx.subscribe()),
                    None => Step::Lead(state.begin_flight(key)),
                },
            };
            step
        };

        match step {
            Step::Cached(value) => Ok(value),
            Step::Revalidate(stale, generation) => {
                self.spawn_revalidation(key, generation, fetch, options.ttl);
                Ok(stale)
            }
            Step::Lead(generation) => self.lead(key, generation, fetch, options.ttl).await,
            Step::Join(mut rx) => loop {
                if let Ok(result) = rx.recv().await {
                    return result;
                }
                // The leader was abandoned. Another waiter may already have
                // taken over; only the first one leads a new fetch.
                match self.rejoin_or_lead(key) {
                    Ok(next) => rx = next,
                    Err(generation) => {
                        tracing::debug!(%key, "joined fetch was abandoned, fetching directly");
                        return self.lead(key, generation, fetch, options.ttl).await;
                    }
                }
            },
        }
    }

    /// Subscribes to the live flight for `key`, or registers a new one and
    /// returns its generation.
    fn rejoin_or_lead(&self, key: &str) -> Result<broadcast::Receiver<Result<V, E>>, u64> {
        let mut state = self.inner.lock();
        match state.in_flight.get(key) {
            Some(flight) => Ok(flight.tx.subscribe()),
            None => Err(state.begin_flight(key)),
        }
    }

    async fn lead<F, Fut>(&self, key: &str, generation: u64, fetch: F, ttl: Duration) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let guard = FlightGuard::new(self.inner.clone(), key, generation);
        let result = fetch().await;
        let outcome = self.complete(key, generation, result, ttl);
        guard.disarm();
        outcome
    }

    fn spawn_revalidation<F, Fut>(&self, key: &str, generation: u64, fetch: F, ttl: Duration)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        tracing::debug!(%key, "revalidating stale entry in background");
        let cache = self.clone();
        let key = key.to_string();
        let timeout = self.inner.config.fetch_timeout;

        tokio::spawn(async move {
            let guard = FlightGuard::new(cache.inner.clone(), &key, generation);
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, fetch()).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(
                            %key,
                            timeout_ms = limit.as_millis() as u64,
                            "background refresh timed out, keeping stale value"
                        );
                        return;
                    }
                },
                None => fetch().await,
            };
            // The outcome already went to any waiters.
            let _ = cache.complete(&key, generation, result, ttl);
            guard.disarm();
        });
    }

    /// Stores a fetch result if its flight is still current, resolves the
    /// fallback on failure and hands the outcome to waiters.
    fn complete(
        &self,
        key: &str,
        generation: u64,
        result: Result<V, E>,
        ttl: Duration,
    ) -> Result<V, E> {
        let mut state = self.inner.lock();
        let flight = state.end_flight(key, generation);

        let outcome = match result {
            Ok(value) => {
                if flight.is_some() {
                    state
                        .entries
                        .insert(key.to_string(), CacheEntry::new(value.clone(), now(), ttl));
                    tracing::debug!(%key, "cache entry stored");
                } else {
                    tracing::debug!(%key, "discarding result of detached fetch");
                }
                Ok(value)
            }
            Err(err) => match state.entries.get(key) {
                Some(entry) => {
                    tracing::warn!(%key, error = %err, "fetch failed, serving cached value");
                    Ok(entry.value.clone())
                }
                None => {
                    tracing::warn!(%key, error = %err, "fetch failed with nothing cached");
                    Err(err)
                }
            },
        };

        if let Some(flight) = flight {
            // No receivers is fine.
            let _ = flight.tx.send(outcome.clone());
        }
        outcome
    }

    /// Removes one entry. Returns the number of entries removed.
    pub fn invalidate(&self, key: &str) -> usize {
        let mut state = self.inner.lock();
        state.in_flight.remove(key);
        let removed = usize::from(state.entries.remove(key).is_some());
        tracing::debug!(%key, removed, "invalidated cache key");
        removed
    }

    /// Removes every entry under `prefix:`.
    pub fn invalidate_table(&self, prefix: &str) -> usize {
        let removed = self
            .inner
            .lock()
            .remove_where(|key| table_matches(prefix, key));
        tracing::debug!(%prefix, removed, "invalidated cache table");
        removed
    }

    /// Removes every entry matching a `*` glob.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        let removed = self
            .inner
            .lock()
            .remove_where(|key| pattern_matches(pattern, key));
        tracing::debug!(%pattern, removed, "invalidated cache pattern");
        removed
    }

    pub fn clear(&self) -> usize {
        let mut state = self.inner.lock();
        let removed = state.entries.len();
        state.entries.clear();
        state.in_flight.clear();
        tracing::info!(removed, "cache cleared");
        removed
    }

    /// Drops hard-expired entries, then trims the least popular ones when
    /// the cache is over its configured size.
    pub fn sweep(&self) -> SweepReport {
        let mut state = self.inner.lock();
        let now = now();
        let candidates = state
            .entries
            .iter()
            .map(|(key, entry)| SweepCandidate {
                key: key.clone(),
                age: entry.age(now),
                ttl: entry.ttl,
                hit_count: entry.hit_count,
            })
            .collect();

        let plan = plan_sweep(candidates, self.inner.config.max_entries);
        for key in plan.expired.iter().chain(&plan.evicted) {
            state.entries.remove(key);
        }

        SweepReport {
            expired: plan.expired.len(),
            evicted: plan.evicted.len(),
        }
    }

    /// Size and the `limit` most-hit entries.
    pub fn stats(&self, limit: usize) -> ReadThroughStats {
        let state = self.inner.lock();
        let now = now();
        let mut top_entries: Vec<EntrySummary> = state
            .entries
            .iter()
            .map(|(key, entry)| EntrySummary {
                key: key.clone(),
                hits: entry.hit_count,
                age_secs: entry.age(now).as_secs(),
                valid: entry.is_fresh(now),
            })
            .collect();
        top_entries.sort_by(|a, b| b.hits.cmp(&a.hits).then_with(|| a.key.cmp(&b.key)));
        top_entries.truncate(limit);

        ReadThroughStats {
            size: state.entries.len(),
            top_entries,
        }
    }

    /// Cached value for `key` without touching hit counts or freshness.
    pub fn peek(&self, key: &str) -> Option<V> {
        self.inner
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// Whether a fetch for `key` is running.
    pub fn is_refreshing(&self, key: &str) -> bool {
        self.inner.lock().in_flight.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
