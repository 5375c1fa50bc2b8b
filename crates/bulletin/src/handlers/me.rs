use axum::Json;
use bulletin_auth::CurrentUser;
use bulletin_core::auth::ResolvedIdentity;

/// GET /api/me
pub async fn me(CurrentUser(identity): CurrentUser) -> Json<ResolvedIdentity> {
    Json(identity)
}
