//! In-memory content repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use bulletin_core::content::{
    select_active_promotions, select_latest_news, select_upcoming_events, Event, NewsItem,
    Promotion, SiteSettings,
};
use bulletin_core::storage::{ContentRepository, RepositoryError, Result};

/// Authoritative content store kept in process memory.
///
/// Clones share the same tables. Filtering and ordering happen on read
/// through the `bulletin_core::content` selectors.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentRepository {
    promotions: Arc<RwLock<HashMap<Uuid, Promotion>>>,
    news: Arc<RwLock<HashMap<Uuid, NewsItem>>>,
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
    settings: Arc<RwLock<SiteSettings>>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

async fn insert_new<T: Clone>(
    table: &RwLock<HashMap<Uuid, T>>,
    entity_type: &'static str,
    id: Uuid,
    item: &T,
) -> Result<()> {
    let mut table = table.write().await;
    if table.contains_key(&id) {
        return Err(RepositoryError::AlreadyExists {
            entity_type,
            id: id.to_string(),
        });
    }
    table.insert(id, item.clone());
    Ok(())
}

async fn remove_existing<T>(
    table: &RwLock<HashMap<Uuid, T>>,
    entity_type: &'static str,
    id: Uuid,
) -> Result<()> {
    table
        .write()
        .await
        .remove(&id)
        .map(|_| ())
        .ok_or_else(|| RepositoryError::not_found(entity_type, id))
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn list_active_promotions(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Promotion>> {
        let promotions = self.promotions.read().await;
        Ok(select_active_promotions(promotions.values(), now, limit))
    }

    async fn list_featured_news(&self, limit: usize) -> Result<Vec<NewsItem>> {
        let news = self.news.read().await;
        Ok(select_latest_news(news.values(), true, limit))
    }

    async fn list_latest_news(&self, limit: usize) -> Result<Vec<NewsItem>> {
        let news = self.news.read().await;
        Ok(select_latest_news(news.values(), false, limit))
    }

    async fn list_upcoming_events(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        Ok(select_upcoming_events(events.values(), now, limit))
    }

    async fn get_settings(&self) -> Result<SiteSettings> {
        Ok(self.settings.read().await.clone())
    }

    async fn create_promotion(&self, promotion: &Promotion) -> Result<()> {
        insert_new(&self.promotions, "Promotion", promotion.id, promotion).await
    }

    async fn create_news(&self, news: &NewsItem) -> Result<()> {
        insert_new(&self.news, "NewsItem", news.id, news).await
    }

    async fn create_event(&self, event: &Event) -> Result<()> {
        insert_new(&self.events, "Event", event.id, event).await
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(RepositoryError::InvalidData(
                "setting key must not be empty".to_string(),
            ));
        }
        self.settings.write().await.set(key, value);
        Ok(())
    }

    async fn delete_promotion(&self, id: Uuid) -> Result<()> {
        remove_existing(&self.promotions, "Promotion", id).await
    }

    async fn delete_news(&self, id: Uuid) -> Result<()> {
        remove_existing(&self.news, "NewsItem", id).await
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        remove_existing(&self.events, "Event", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_and_list_news() {
        let repo = InMemoryContentRepository::new();
        let now = Utc::now();
        repo.create_news(&NewsItem::new("Old", "s", "b", now - Duration::days(1)))
            .await
            .unwrap();
        repo.create_news(&NewsItem::new("New", "s", "b", now).featured())
            .await
            .unwrap();

        let latest = repo.list_latest_news(10).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].title, "New");

        let featured = repo.list_featured_news(10).await.unwrap();
        assert_eq!(featured.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let repo = InMemoryContentRepository::new();
        let promo = Promotion::new("Sale", "/sale.png", 1);
        repo.create_promotion(&promo).await.unwrap();

        let err = repo.create_promotion(&promo).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = InMemoryContentRepository::new();
        let err = repo.delete_event(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::NotFound {
                entity_type: "Event",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_upcoming_events_and_active_promotions() {
        let repo = InMemoryContentRepository::new();
        let now = Utc::now();
        repo.create_event(&Event::new(
            "Past",
            now - Duration::days(3),
            now - Duration::days(2),
        ))
        .await
        .unwrap();
        repo.create_event(&Event::new(
            "Soon",
            now + Duration::days(1),
            now + Duration::days(2),
        ))
        .await
        .unwrap();
        let mut hidden = Promotion::new("Hidden", "/h.png", 9);
        hidden.active = false;
        repo.create_promotion(&hidden).await.unwrap();
        repo.create_promotion(&Promotion::new("Shown", "/s.png", 1))
            .await
            .unwrap();

        let events = repo.list_upcoming_events(now, 10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Soon");

        let promotions = repo.list_active_promotions(now, 10).await.unwrap();
        assert_eq!(promotions.len(), 1);
        assert_eq!(promotions[0].title, "Shown");
    }

    #[tokio::test]
    async fn test_settings_upsert() {
        let repo = InMemoryContentRepository::new();
        repo.put_setting("site_name", "Bulletin").await.unwrap();
        repo.put_setting("site_name", "Town Bulletin").await.unwrap();
        assert!(repo.put_setting(" ", "x").await.is_err());

        let settings = repo.get_settings().await.unwrap();
        assert_eq!(settings.get("site_name"), Some("Town Bulletin"));
        assert_eq!(settings.len(), 1);
    }
}
