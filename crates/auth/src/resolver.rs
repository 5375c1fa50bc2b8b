//! Credential to identity resolution with a session cache in front.

use std::sync::Arc;

use bulletin_core::auth::{
    calculate_expiry, derive_session_key, session_cache_ttl, AuthResolution, IdentityVerifier,
    ResolvedIdentity, RoleStore, SessionCacheSlot, SessionCacheStats, SessionRecord,
};
use chrono::{DateTime, Utc};

use crate::sessions::BoundedSessionCache;

/// Resolves credential tokens to identities.
///
/// Never returns an error: every failure becomes a failed
/// [`AuthResolution`]. A verified user without a role is not authenticated.
#[derive(Clone)]
pub struct IdentityResolver {
    cache: Arc<BoundedSessionCache>,
    verifier: Arc<dyn IdentityVerifier>,
    roles: Arc<dyn RoleStore>,
}

impl IdentityResolver {
    pub fn new(
        cache: Arc<BoundedSessionCache>,
        verifier: Arc<dyn IdentityVerifier>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        Self {
            cache,
            verifier,
            roles,
        }
    }

    pub fn cache(&self) -> &Arc<BoundedSessionCache> {
        &self.cache
    }

    pub async fn resolve(&self, token: &str) -> AuthResolution {
        self.resolve_at(token, Utc::now()).await
    }

    /// [`resolve`](Self::resolve) against an explicit clock.
    pub async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> AuthResolution {
        if token.is_empty() {
            return AuthResolution::failed("no credential");
        }

        let key = derive_session_key(token);
        if let Some(slot) = self.cache.get_valid(&key, now) {
            return AuthResolution::authenticated(ResolvedIdentity::from(&slot.record), true);
        }

        let identity = match self.verifier.verify(token).await {
            Ok(identity) => identity,
            Err(err) => {
                tracing::debug!(error = %err, "identity verification failed");
                return AuthResolution::failed(err.to_string());
            }
        };

        let role = match self.roles.get_role(&identity.id).await {
            Ok(role) => role,
            Err(err) => {
                tracing::warn!(user_id = %identity.id, error = %err, "role lookup failed");
                return AuthResolution::failed(err.to_string());
            }
        };

        let record = SessionRecord {
            user_id: identity.id,
            role,
            email: identity.email,
            cached_at: now,
        };
        let resolved = ResolvedIdentity::from(&record);
        self.cache.set(
            key,
            SessionCacheSlot {
                user_id: record.user_id.clone(),
                expires_at: calculate_expiry(now, session_cache_ttl()),
                last_accessed: now,
                access_count: 0,
                record,
            },
        );
        tracing::debug!(user_id = %resolved.id, role = %resolved.role, "identity resolved");

        AuthResolution::authenticated(resolved, false)
    }

    /// Forgets the cached resolution of one token (logout).
    pub fn invalidate_token(&self, token: &str) -> bool {
        self.cache.delete(&derive_session_key(token))
    }

    /// Forgets every cached resolution of a user (role change).
    pub fn invalidate_user(&self, user_id: &str) -> usize {
        let removed = self.cache.delete_user(user_id);
        tracing::debug!(%user_id, removed, "invalidated user sessions");
        removed
    }

    pub fn stats(&self) -> SessionCacheStats {
        self.cache.stats(Utc::now())
    }
}
