use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised by the identity layer.
///
/// Wraps the core [`AuthError`](bulletin_core::auth::AuthError) and adds the
/// variants that only exist at the I/O edge.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Core(#[from] bulletin_core::auth::AuthError),

    #[error("configuration error: {0}")]
    Config(String),

    /// No credential, or a credential that did not resolve to an identity.
    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated, but the role does not cover the route.
    #[error("role {role} may not access {path}")]
    Forbidden { role: String, path: String },
}

impl From<bulletin_core::cache::CacheError> for AuthError {
    fn from(err: bulletin_core::cache::CacheError) -> Self {
        Self::Config(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use bulletin_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(CoreError::InvalidToken | CoreError::IdentityNotFound) => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AuthError::Core(CoreError::RoleNotFound(_)) => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            AuthError::Core(CoreError::Provider(_) | CoreError::Storage(_)) => {
                tracing::error!(error = %self, "identity backend error");
                (
                    StatusCode::BAD_GATEWAY,
                    "Authentication provider error".to_string(),
                )
            }
            AuthError::Config(_) => {
                tracing::error!(error = %self, "auth configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
            AuthError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::Forbidden { role, path } => {
                tracing::warn!(%role, %path, "authorization denied");
                (StatusCode::FORBIDDEN, "Insufficient role".to_string())
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AuthError::Unauthenticated("no credential".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AuthError::Forbidden {
                    role: "member".into(),
                    path: "/api/admin/news".into(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                AuthError::Core(bulletin_core::auth::AuthError::InvalidToken),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AuthError::Core(bulletin_core::auth::AuthError::Provider("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AuthError::Config("bad".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
