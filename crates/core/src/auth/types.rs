use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lookup key for the session cache, derived from a credential token.
///
/// Never the token itself: see [`derive_session_key`](super::derive_session_key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity returned by the external identity verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub id: String,
    pub email: Option<String>,
}

/// Resolved identity and role, as cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: String,
    pub role: String,
    pub email: Option<String>,
    pub cached_at: DateTime<Utc>,
}

/// A session record plus cache bookkeeping.
///
/// `expires_at` is `record.cached_at + SESSION_CACHE_TTL`; the slot is valid
/// while `now < expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCacheSlot {
    pub user_id: String,
    pub record: SessionRecord,
    pub expires_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
}

/// Caller identity handed to request handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIdentity {
    pub id: String,
    pub email: Option<String>,
    pub role: String,
    pub is_authenticated: bool,
}

impl From<&SessionRecord> for ResolvedIdentity {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.user_id.clone(),
            email: record.email.clone(),
            role: record.role.clone(),
            is_authenticated: true,
        }
    }
}

/// Outcome of resolving a credential.
///
/// Built only through [`AuthResolution::authenticated`] and
/// [`AuthResolution::failed`], so `identity` and `error` are never both set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResolution {
    identity: Option<ResolvedIdentity>,
    error: Option<String>,
    from_cache: bool,
}

impl AuthResolution {
    pub fn authenticated(identity: ResolvedIdentity, from_cache: bool) -> Self {
        Self {
            identity: Some(identity),
            error: None,
            from_cache,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            identity: None,
            error: Some(error.into()),
            from_cache: false,
        }
    }

    pub fn identity(&self) -> Option<&ResolvedIdentity> {
        self.identity.as_ref()
    }

    pub fn into_identity(self) -> Option<ResolvedIdentity> {
        self.identity
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Informational: whether the identity came from the session cache.
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.as_ref().is_some_and(|i| i.is_authenticated)
    }
}

/// Read-only snapshot of the session cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCacheStats {
    pub size: usize,
    pub hit_rate: f64,
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub oldest_entry_age_secs: Option<i64>,
    pub newest_entry_age_secs: Option<i64>,
}
