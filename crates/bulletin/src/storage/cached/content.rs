use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use bulletin_core::cache::{
    events_upcoming_key, news_featured_key, news_latest_key, promotions_active_key, settings_key,
    GetOptions, ReadThroughStats, EVENTS_TABLE, NEWS_TABLE, PROMOTIONS_TABLE,
};
use bulletin_core::content::{Event, NewsItem, Promotion, SiteSettings};
use bulletin_core::storage::{ContentRepository, RepositoryError, Result};

use crate::cache::ReadThroughCache;

/// Values stored in the content cache.
#[derive(Debug, Clone)]
pub enum CachedContent {
    Promotions(Arc<[Promotion]>),
    News(Arc<[NewsItem]>),
    Events(Arc<[Event]>),
    Settings(Arc<SiteSettings>),
}

impl CachedContent {
    fn into_promotions(self) -> Option<Arc<[Promotion]>> {
        match self {
            Self::Promotions(items) => Some(items),
            _ => None,
        }
    }

    fn into_news(self) -> Option<Arc<[NewsItem]>> {
        match self {
            Self::News(items) => Some(items),
            _ => None,
        }
    }

    fn into_events(self) -> Option<Arc<[Event]>> {
        match self {
            Self::Events(items) => Some(items),
            _ => None,
        }
    }

    fn into_settings(self) -> Option<Arc<SiteSettings>> {
        match self {
            Self::Settings(settings) => Some(settings),
            _ => None,
        }
    }
}

pub type ContentCache = ReadThroughCache<CachedContent, RepositoryError>;

/// How quickly a kind of content goes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    Volatile,
    Moderate,
    Stable,
}

/// TTL for each [`TtlClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub volatile: Duration,
    pub moderate: Duration,
    pub stable: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            volatile: Duration::from_secs(5 * 60),
            moderate: Duration::from_secs(15 * 60),
            stable: Duration::from_secs(60 * 60),
        }
    }
}

impl TtlPolicy {
    pub fn ttl(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Volatile => self.volatile,
            TtlClass::Moderate => self.moderate,
            TtlClass::Stable => self.stable,
        }
    }
}

/// Named, cached queries over a [`ContentRepository`].
///
/// | query               | key                         | class    |
/// |---------------------|-----------------------------|----------|
/// | active promotions   | `promotions:active:{limit}` | volatile |
/// | featured news       | `news:featured:{limit}`     | volatile |
/// | latest news         | `news:latest:{limit}`       | volatile |
/// | upcoming events     | `events:upcoming:{limit}`   | moderate |
/// | site settings       | `settings:all`              | stable   |
///
/// Every query serves stale values while refreshing in the background.
#[derive(Clone)]
pub struct CachedQueryFacade {
    repository: Arc<dyn ContentRepository>,
    cache: ContentCache,
    ttls: TtlPolicy,
}

impl CachedQueryFacade {
    pub fn new(repository: Arc<dyn ContentRepository>, cache: ContentCache, ttls: TtlPolicy) -> Self {
        Self {
            repository,
            cache,
            ttls,
        }
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Runs one query through the cache.
    ///
    /// A cached payload of the wrong shape is treated as a miss and
    /// replaced with a forced fetch.
    async fn load<T, F, Fut>(
        &self,
        key: String,
        class: TtlClass,
        fetch: F,
        extract: fn(CachedContent) -> Option<T>,
    ) -> Result<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CachedContent>> + Send + 'static,
    {
        let options = GetOptions::new(self.ttls.ttl(class)).swr();
        let fetch = Arc::new(fetch);

        let first = {
            let fetch = fetch.clone();
            move || fetch()
        };
        if let Some(value) = extract(self.cache.get(&key, first, options).await?) {
            return Ok(value);
        }

        tracing::warn!(%key, "cached payload has unexpected shape, refetching");
        let value = self
            .cache
            .get(&key, move || fetch(), options.force_refresh())
            .await?;
        extract(value)
            .ok_or_else(|| RepositoryError::InvalidData(format!("unexpected payload for {key}")))
    }

    pub async fn active_promotions(&self, limit: usize) -> Result<Arc<[Promotion]>> {
        let repository = self.repository.clone();
        self.load(
            promotions_active_key(limit),
            TtlClass::Volatile,
            move || {
                let repository = repository.clone();
                async move {
                    let items = repository.list_active_promotions(Utc::now(), limit).await?;
                    Ok(CachedContent::Promotions(items.into()))
                }
            },
            CachedContent::into_promotions,
        )
        .await
    }

    pub async fn featured_news(&self, limit: usize) -> Result<Arc<[NewsItem]>> {
        let repository = self.repository.clone();
        self.load(
            news_featured_key(limit),
            TtlClass::Volatile,
            move || {
                let repository = repository.clone();
                async move {
                    let items = repository.list_featured_news(limit).await?;
                    Ok(CachedContent::News(items.into()))
                }
            },
            CachedContent::into_news,
        )
        .await
    }

    pub async fn latest_news(&self, limit: usize) -> Result<Arc<[NewsItem]>> {
        let repository = self.repository.clone();
        self.load(
            news_latest_key(limit),
            TtlClass::Volatile,
            move || {
                let repository = repository.clone();
                async move {
                    let items = repository.list_latest_news(limit).await?;
                    Ok(CachedContent::News(items.into()))
                }
            },
            CachedContent::into_news,
        )
        .await
    }

    pub async fn upcoming_events(&self, limit: usize) -> Result<Arc<[Event]>> {
        let repository = self.repository.clone();
        self.load(
            events_upcoming_key(limit),
            TtlClass::Moderate,
            move || {
                let repository = repository.clone();
                async move {
                    let items = repository.list_upcoming_events(Utc::now(), limit).await?;
                    Ok(CachedContent::Events(items.into()))
                }
            },
            CachedContent::into_events,
        )
        .await
    }

    pub async fn settings(&self) -> Result<Arc<SiteSettings>> {
        let repository = self.repository.clone();
        self.load(
            settings_key(),
            TtlClass::Stable,
            move || {
                let repository = repository.clone();
                async move {
                    let settings = repository.get_settings().await?;
                    Ok(CachedContent::Settings(Arc::new(settings)))
                }
            },
            CachedContent::into_settings,
        )
        .await
    }

    pub fn invalidate_promotions(&self) -> usize {
        self.cache.invalidate_table(PROMOTIONS_TABLE)
    }

    pub fn invalidate_news(&self) -> usize {
        self.cache.invalidate_table(NEWS_TABLE)
    }

    pub fn invalidate_events(&self) -> usize {
        self.cache.invalidate_table(EVENTS_TABLE)
    }

    pub fn invalidate_settings(&self) -> usize {
        self.cache.invalidate(&settings_key())
    }

    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        self.cache.invalidate_pattern(pattern)
    }

    pub fn invalidate_table(&self, prefix: &str) -> usize {
        self.cache.invalidate_table(prefix)
    }

    pub fn clear(&self) -> usize {
        self.cache.clear()
    }

    pub fn stats(&self, limit: usize) -> ReadThroughStats {
        self.cache.stats(limit)
    }

    // Write path: persist, then purge the category.

    pub async fn create_promotion(&self, promotion: &Promotion) -> Result<()> {
        self.repository.create_promotion(promotion).await?;
        self.invalidate_promotions();
        Ok(())
    }

    pub async fn delete_promotion(&self, id: Uuid) -> Result<()> {
        self.repository.delete_promotion(id).await?;
        self.invalidate_promotions();
        Ok(())
    }

    pub async fn create_news(&self, news: &NewsItem) -> Result<()> {
        self.repository.create_news(news).await?;
        self.invalidate_news();
        Ok(())
    }

    pub async fn delete_news(&self, id: Uuid) -> Result<()> {
        self.repository.delete_news(id).await?;
        self.invalidate_news();
        Ok(())
    }

    pub async fn create_event(&self, event: &Event) -> Result<()> {
        self.repository.create_event(event).await?;
        self.invalidate_events();
        Ok(())
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<()> {
        self.repository.delete_event(id).await?;
        self.invalidate_events();
        Ok(())
    }

    pub async fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        self.repository.put_setting(key, value).await?;
        self.invalidate_settings();
        Ok(())
    }
}
