//! Admin API: content writes and cache management.
//!
//! Writes go through the facade, which persists first and then purges the
//! affected cache category.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bulletin_core::auth::SessionCacheStats;
use bulletin_core::cache::ReadThroughStats;
use bulletin_core::content::{Event, NewsItem, Promotion};
use bulletin_core::storage::RepositoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{handlers::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct NewPromotion {
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// POST /api/admin/promotions
pub async fn create_promotion(
    State(state): State<AppState>,
    Json(body): Json<NewPromotion>,
) -> Result<(StatusCode, Json<Promotion>), AppError> {
    let mut promotion = Promotion::new(body.title, body.image_url, body.priority);
    promotion.link_url = body.link_url;
    promotion.starts_at = body.starts_at;
    promotion.ends_at = body.ends_at;
    if let (Some(start), Some(end)) = (promotion.starts_at, promotion.ends_at) {
        ensure_ordered(start, end)?;
    }

    state.content.create_promotion(&promotion).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

#[derive(Debug, Deserialize)]
pub struct NewNews {
    pub title: String,
    pub summary: String,
    pub body: String,
    #[serde(default)]
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
}

/// POST /api/admin/news
pub async fn create_news(
    State(state): State<AppState>,
    Json(body): Json<NewNews>,
) -> Result<(StatusCode, Json<NewsItem>), AppError> {
    let mut news = NewsItem::new(
        body.title,
        body.summary,
        body.body,
        body.published_at.unwrap_or_else(Utc::now),
    );
    news.featured = body.featured;

    state.content.create_news(&news).await?;
    Ok((StatusCode::CREATED, Json(news)))
}

#[derive(Debug, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// POST /api/admin/events
pub async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    ensure_ordered(body.starts_at, body.ends_at)?;
    let mut event = Event::new(body.title, body.starts_at, body.ends_at);
    event.location = body.location;

    state.content.create_event(&event).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

fn ensure_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), RepositoryError> {
    if end <= start {
        return Err(RepositoryError::InvalidData(
            "ends_at must be after starts_at".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SettingValue {
    pub value: String,
}

/// PUT /api/admin/settings/{key}
pub async fn put_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<SettingValue>,
) -> Result<StatusCode, AppError> {
    state.content.put_setting(&key, &body.value).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/promotions/{id}
pub async fn delete_promotion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.content.delete_promotion(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/news/{id}
pub async fn delete_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.content.delete_news(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.content.delete_event(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub top: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub content: ReadThroughStats,
    pub sessions: SessionCacheStats,
}

/// GET /api/admin/cache/stats
pub async fn cache_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<CacheStats> {
    Json(CacheStats {
        content: state.content.stats(query.top.unwrap_or(10)),
        sessions: state.auth.resolver.stats(),
    })
}

/// Body of `POST /api/admin/cache/invalidate`. Exactly one selector is used,
/// checked in the order `all`, `table`, `pattern`.
#[derive(Debug, Default, Deserialize)]
pub struct InvalidateRequest {
    pub pattern: Option<String>,
    pub table: Option<String>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Invalidated {
    pub removed: usize,
}

/// POST /api/admin/cache/invalidate
pub async fn invalidate_cache(
    State(state): State<AppState>,
    Json(body): Json<InvalidateRequest>,
) -> Response {
    let removed = if body.all {
        state.content.clear()
    } else if let Some(table) = body.table.as_deref() {
        state.content.invalidate_table(table)
    } else if let Some(pattern) = body.pattern.as_deref() {
        state.content.invalidate_pattern(pattern)
    } else {
        return (
            StatusCode::BAD_REQUEST,
            "expected one of `all`, `table` or `pattern`",
        )
            .into_response();
    };

    tracing::info!(removed, "content cache invalidated by admin");
    Json(Invalidated { removed }).into_response()
}

/// DELETE /api/admin/sessions/{user_id}
///
/// Drops every cached session of a user, forcing re-verification on their
/// next request.
pub async fn invalidate_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Invalidated> {
    let removed = state.auth.resolver.invalidate_user(&user_id);
    tracing::info!(%user_id, removed, "sessions invalidated by admin");
    Json(Invalidated { removed })
}
