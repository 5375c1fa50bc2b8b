use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bulletin_core::auth::{hit_rate, is_slot_valid, SessionCacheSlot, SessionCacheStats, SessionKey};
use bulletin_core::cache::CacheError;
use chrono::{DateTime, Utc};
use lru::LruCache;

/// Capacity-bounded session cache with least-recently-used eviction.
///
/// Eviction only looks at access order. Expiry is checked by the caller
/// through [`get_valid`](Self::get_valid) or cleaned up by
/// [`remove_expired`](Self::remove_expired).
pub struct BoundedSessionCache {
    slots: Mutex<LruCache<SessionKey, SessionCacheSlot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BoundedSessionCache {
    /// Creates a cache holding at most `capacity` slots.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::InvalidCapacity(capacity))?;
        Ok(Self {
            slots: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<SessionKey, SessionCacheSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Returns the slot for `key`, marking it most recently used.
    ///
    /// Bumps `last_accessed` and `access_count` on the stored slot.
    pub fn get(&self, key: &SessionKey, now: DateTime<Utc>) -> Option<SessionCacheSlot> {
        let mut slots = self.lock();
        let slot = slots.get_mut(key)?;
        slot.last_accessed = now;
        slot.access_count += 1;
        Some(slot.clone())
    }

    /// Like [`get`](Self::get), but only returns slots that have not expired
    /// and records the lookup as a hit or a miss.
    pub fn get_valid(&self, key: &SessionKey, now: DateTime<Utc>) -> Option<SessionCacheSlot> {
        match self.get(key, now).filter(|slot| is_slot_valid(slot, now)) {
            Some(slot) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key = %short(key), "session cache hit");
                Some(slot)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key = %short(key), "session cache miss");
                None
            }
        }
    }

    /// Stores a slot, evicting the least recently used one when full.
    ///
    /// Overwriting an existing key keeps its popularity: the new slot's
    /// `access_count` continues from the previous one.
    pub fn set(&self, key: SessionKey, mut slot: SessionCacheSlot) {
        let mut slots = self.lock();
        if let Some(previous) = slots.peek(&key) {
            slot.access_count = previous.access_count + 1;
        }
        if let Some((evicted, _)) = slots.push(key.clone(), slot) {
            if evicted != key {
                tracing::debug!(key = %short(&evicted), "evicted least recently used session");
            }
        }
    }

    pub fn delete(&self, key: &SessionKey) -> bool {
        self.lock().pop(key).is_some()
    }

    /// Removes every slot belonging to `user_id`.
    pub fn delete_user(&self, user_id: &str) -> usize {
        self.remove_where(|slot| slot.user_id == user_id)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Removes slots whose expiry is not after `now`.
    pub fn remove_expired(&self, now: DateTime<Utc>) -> usize {
        self.remove_where(|slot| !is_slot_valid(slot, now))
    }

    fn remove_where(&self, predicate: impl Fn(&SessionCacheSlot) -> bool) -> usize {
        let mut slots = self.lock();
        let doomed: Vec<SessionKey> = slots
            .iter()
            .filter(|(_, slot)| predicate(slot))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            slots.pop(key);
        }
        doomed.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self, now: DateTime<Utc>) -> SessionCacheStats {
        let (size, oldest, newest) = {
            let slots = self.lock();
            let ages = slots
                .iter()
                .map(|(_, slot)| (now - slot.record.cached_at).num_seconds());
            let (oldest, newest) = ages.fold((None, None), |(oldest, newest), age| {
                (
                    Some(oldest.map_or(age, |o: i64| o.max(age))),
                    Some(newest.map_or(age, |n: i64| n.min(age))),
                )
            });
            (slots.len(), oldest, newest)
        };
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);

        SessionCacheStats {
            size,
            hit_rate: hit_rate(hits, misses),
            total_requests: hits + misses,
            cache_hits: hits,
            cache_misses: misses,
            oldest_entry_age_secs: oldest,
            newest_entry_age_secs: newest,
        }
    }
}

/// Log-friendly prefix of a session key.
fn short(key: &SessionKey) -> &str {
    let key = key.as_str();
    key.get(..12).unwrap_or(key)
}
