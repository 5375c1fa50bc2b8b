//! Public read API. Every handler reads through the content cache.

use axum::{
    extract::{Query, State},
    Json,
};
use bulletin_core::content::{Event, NewsItem, Promotion, SiteSettings};
use serde::Deserialize;

use crate::{handlers::AppError, state::AppState};

const DEFAULT_LIMIT: usize = 10;
/// Each distinct limit is its own cache key, so the range is capped.
const MAX_LIMIT: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    #[serde(default)]
    pub featured: bool,
}

impl ListQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// GET /api/public/promotions
pub async fn list_promotions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Promotion>>, AppError> {
    let items = state.content.active_promotions(query.limit()).await?;
    Ok(Json(items.to_vec()))
}

/// GET /api/public/news
pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<NewsItem>>, AppError> {
    let items = if query.featured {
        state.content.featured_news(query.limit()).await?
    } else {
        state.content.latest_news(query.limit()).await?
    };
    Ok(Json(items.to_vec()))
}

/// GET /api/public/events
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let items = state.content.upcoming_events(query.limit()).await?;
    Ok(Json(items.to_vec()))
}

/// GET /api/public/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<SiteSettings>, AppError> {
    let settings = state.content.settings().await?;
    Ok(Json(SiteSettings::clone(&settings)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        let query = |limit| ListQuery {
            limit,
            featured: false,
        };
        assert_eq!(query(None).limit(), DEFAULT_LIMIT);
        assert_eq!(query(Some(0)).limit(), 1);
        assert_eq!(query(Some(3)).limit(), 3);
        assert_eq!(query(Some(1_000)).limit(), MAX_LIMIT);
    }
}
