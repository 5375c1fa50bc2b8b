use async_trait::async_trait;

use super::{AuthError, VerifiedIdentity};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// External service that turns a raw credential token into an identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify the token and return who it belongs to.
    async fn verify(&self, raw_token: &str) -> Result<VerifiedIdentity>;
}

/// External authorization store mapping users to roles.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Look up the role string for a user.
    async fn get_role(&self, user_id: &str) -> Result<String>;
}
