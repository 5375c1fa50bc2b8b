//! Axum extractors for the caller's identity.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use bulletin_core::auth::ResolvedIdentity;

use crate::guard::{credential_from_headers, CurrentIdentity};
use crate::AuthState;

/// Resolves the identity for a request: the guard's result when present,
/// otherwise a fresh resolution of the request's credential.
async fn identity_for(parts: &Parts, auth: &AuthState) -> Option<ResolvedIdentity> {
    if let Some(current) = parts.extensions.get::<CurrentIdentity>() {
        return Some(current.identity.clone());
    }
    let token = credential_from_headers(&parts.headers, &auth.config.cookies)?;
    auth.resolver.resolve(&token).await.into_identity()
}

/// Extractor for authenticated user. Returns 401 if not authenticated.
pub struct CurrentUser(pub ResolvedIdentity);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthState::from_ref(state);
        identity_for(parts, &auth)
            .await
            .map(CurrentUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Not authenticated"))
    }
}

/// Extractor for optionally authenticated user. Returns None if not authenticated.
pub struct OptionalUser(pub Option<ResolvedIdentity>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthState::from_ref(state);
        Ok(OptionalUser(identity_for(parts, &auth).await))
    }
}
