//! Route guard middleware.

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};
use bulletin_core::auth::{
    bearer_token, classify_route, extract_credential, CredentialCookies, ResolvedIdentity, Role,
    RouteClass,
};

use crate::error::AuthError;
use crate::state::AuthState;

/// Identity resolved by [`route_guard`], stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentIdentity {
    pub identity: ResolvedIdentity,
    pub route: RouteClass,
}

/// Finds the caller's credential: the bearer header first, then cookies.
pub fn credential_from_headers(headers: &HeaderMap, cookies: &CredentialCookies) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    let cookie_header = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    if cookie_header.is_empty() {
        return None;
    }
    extract_credential(&cookie_header, cookies)
}

/// Resolves the caller's identity for protected routes.
///
/// Public routes pass through untouched. Protected routes answer 401 when
/// no identity can be resolved and 403 when the role does not cover the
/// route.
pub async fn route_guard(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();
    let route = classify_route(&path);
    if !route.requires_auth {
        return Ok(next.run(request).await);
    }

    let token = credential_from_headers(request.headers(), &auth.config.cookies)
        .ok_or_else(|| AuthError::Unauthenticated("no credential".to_string()))?;

    let resolution = auth.resolver.resolve(&token).await;
    let Some(identity) = resolution.identity().cloned() else {
        let reason = resolution.error().unwrap_or("not authenticated");
        return Err(AuthError::Unauthenticated(reason.to_string()));
    };

    let role: Role = identity.role.parse().unwrap_or_else(|never| match never {});
    if !role.satisfies(&route) {
        return Err(AuthError::Forbidden {
            role: identity.role,
            path,
        });
    }

    request
        .extensions_mut()
        .insert(CurrentIdentity { identity, route });
    Ok(next.run(request).await)
}
