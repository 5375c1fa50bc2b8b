use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bulletin_core::auth::{AuthError, IdentityVerifier, Result, RoleStore, VerifiedIdentity};

/// Identity provider backed by a seeded token table.
///
/// Used in development mode and tests.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    tokens: RwLock<HashMap<String, VerifiedIdentity>>,
    roles: RwLock<HashMap<String, String>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user reachable through `token`.
    pub fn with_user(
        self,
        token: impl Into<String>,
        user_id: impl Into<String>,
        email: Option<&str>,
        role: impl Into<String>,
    ) -> Self {
        let user_id = user_id.into();
        self.insert_token(
            token,
            VerifiedIdentity {
                id: user_id.clone(),
                email: email.map(String::from),
            },
        );
        self.set_role(user_id, role);
        self
    }

    pub fn insert_token(&self, token: impl Into<String>, identity: VerifiedIdentity) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), identity);
    }

    pub fn revoke_token(&self, token: &str) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }

    pub fn set_role(&self, user_id: impl Into<String>, role: impl Into<String>) {
        self.roles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.into(), role.into());
    }

    pub fn remove_role(&self, user_id: &str) {
        self.roles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user_id);
    }
}

#[async_trait]
impl IdentityVerifier for InMemoryIdentityProvider {
    async fn verify(&self, raw_token: &str) -> Result<VerifiedIdentity> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(raw_token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[async_trait]
impl RoleStore for InMemoryIdentityProvider {
    async fn get_role(&self, user_id: &str) -> Result<String> {
        self.roles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
            .ok_or_else(|| AuthError::RoleNotFound(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_user_verifies() {
        let provider =
            InMemoryIdentityProvider::new().with_user("tok", "user-1", Some("a@b.c"), "admin");

        let identity = provider.verify("tok").await.unwrap();
        assert_eq!(identity.id, "user-1");
        assert_eq!(identity.email.as_deref(), Some("a@b.c"));
        assert_eq!(provider.get_role("user-1").await.unwrap(), "admin");
    }

    #[tokio::test]
    async fn test_unknown_token_and_role() {
        let provider = InMemoryIdentityProvider::new();
        assert_eq!(
            provider.verify("nope").await.unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(
            provider.get_role("ghost").await.unwrap_err(),
            AuthError::RoleNotFound("ghost".to_string())
        );
    }

    #[tokio::test]
    async fn test_revoke_and_remove_role() {
        let provider = InMemoryIdentityProvider::new().with_user("tok", "u", None, "member");
        provider.revoke_token("tok");
        provider.remove_role("u");
        assert!(provider.verify("tok").await.is_err());
        assert!(provider.get_role("u").await.is_err());
    }
}
