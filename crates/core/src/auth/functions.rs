use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use super::{SessionCacheSlot, SessionKey};

/// How long a resolved identity stays valid in the session cache.
pub const SESSION_CACHE_TTL_MINUTES: i64 = 15;

/// Session cache TTL as a chrono duration.
pub fn session_cache_ttl() -> Duration {
    Duration::minutes(SESSION_CACHE_TTL_MINUTES)
}

/// Derive the session cache key for a credential token.
///
/// The key is the hex SHA-256 digest of the whole token: fixed length, no
/// secret material kept in memory, and two tokens only share a key if they
/// are identical.
pub fn derive_session_key(token: &str) -> SessionKey {
    let digest = Sha256::digest(token.as_bytes());
    SessionKey::new(hex::encode(digest))
}

/// Calculate slot expiry from the time the record was cached.
pub fn calculate_expiry(cached_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    cached_at + ttl
}

/// A slot is valid strictly before its expiry.
pub fn is_slot_valid(slot: &SessionCacheSlot, now: DateTime<Utc>) -> bool {
    now < slot.expires_at
}

/// Hit rate as a percentage. Zero when nothing has been requested yet.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        return 0.0;
    }
    100.0 * hits as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionRecord;

    fn slot(cached_at: DateTime<Utc>) -> SessionCacheSlot {
        SessionCacheSlot {
            user_id: "user-1".to_string(),
            record: SessionRecord {
                user_id: "user-1".to_string(),
                role: "member".to_string(),
                email: None,
                cached_at,
            },
            expires_at: calculate_expiry(cached_at, session_cache_ttl()),
            last_accessed: cached_at,
            access_count: 0,
        }
    }

    #[test]
    fn test_session_key_is_fixed_length_hex() {
        let key = derive_session_key("eyJhbGciOiJIUzI1NiJ9.payload.signature");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_session_key_does_not_contain_token() {
        let token = "secret-token-value-1234567890";
        let key = derive_session_key(token);
        assert!(!key.as_str().contains("1234567890"));
    }

    #[test]
    fn test_tokens_sharing_a_suffix_get_distinct_keys() {
        let a = derive_session_key("aaaa.same-last-12-chars");
        let b = derive_session_key("bbbb.same-last-12-chars");
        assert_ne!(a, b);
    }

    #[test]
    fn test_session_key_is_deterministic() {
        assert_eq!(derive_session_key("token"), derive_session_key("token"));
    }

    #[test]
    fn test_slot_valid_until_expiry() {
        let cached_at = Utc::now();
        let slot = slot(cached_at);

        assert!(is_slot_valid(&slot, cached_at + Duration::minutes(14)));
        assert!(!is_slot_valid(&slot, cached_at + Duration::minutes(15)));
        assert!(!is_slot_valid(&slot, cached_at + Duration::minutes(16)));
    }

    #[test]
    fn test_hit_rate_is_percentage() {
        assert_eq!(hit_rate(0, 0), 0.0);
        assert_eq!(hit_rate(3, 1), 75.0);
        assert_eq!(hit_rate(5, 0), 100.0);
        assert!((hit_rate(1, 2) - 33.333).abs() < 0.01);
    }
}
