use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::content::{Event, NewsItem, Promotion, SiteSettings};

use super::Result;

/// Backing store for the bulletin's public content.
///
/// Read methods are what the cached query facade fronts. Write methods are
/// only used by the admin API, which invalidates the cache afterwards.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Promotions live at `now`, highest priority first.
    async fn list_active_promotions(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Promotion>>;

    /// Featured news, newest first.
    async fn list_featured_news(&self, limit: usize) -> Result<Vec<NewsItem>>;

    /// All news, newest first.
    async fn list_latest_news(&self, limit: usize) -> Result<Vec<NewsItem>>;

    /// Events that have not ended by `now`, soonest first.
    async fn list_upcoming_events(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Event>>;

    /// The full settings document.
    async fn get_settings(&self) -> Result<SiteSettings>;

    async fn create_promotion(&self, promotion: &Promotion) -> Result<()>;

    async fn create_news(&self, news: &NewsItem) -> Result<()>;

    async fn create_event(&self, event: &Event) -> Result<()>;

    /// Inserts or overwrites one settings key.
    async fn put_setting(&self, key: &str, value: &str) -> Result<()>;

    async fn delete_promotion(&self, id: Uuid) -> Result<()>;

    async fn delete_news(&self, id: Uuid) -> Result<()>;

    async fn delete_event(&self, id: Uuid) -> Result<()>;
}
