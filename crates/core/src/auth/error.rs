use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("no identity for token")]
    IdentityNotFound,

    #[error("no role assigned to user {0}")]
    RoleNotFound(String),

    #[error("identity provider error: {0}")]
    Provider(String),

    #[error("role store error: {0}")]
    Storage(String),
}
