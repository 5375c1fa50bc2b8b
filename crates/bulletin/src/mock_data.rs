//! Demo content and identities for local development.

use bulletin_auth::InMemoryIdentityProvider;
use bulletin_core::content::{Event, NewsItem, Promotion};
use bulletin_core::storage::{ContentRepository, Result};
use chrono::{Duration, Utc};

/// Bearer tokens accepted by the development identity provider.
pub const DEMO_ADMIN_TOKEN: &str = "demo-admin-token";
pub const DEMO_MEMBER_TOKEN: &str = "demo-member-token";

/// Seeds a repository with a handful of promotions, articles and events
/// relative to the current time.
pub async fn seed_content(repo: &dyn ContentRepository) -> Result<()> {
    let now = Utc::now();

    let promotions = [
        Promotion::new("Spring market", "/img/market.png", 10).with_link("/events/market"),
        Promotion::new("Volunteer drive", "/img/volunteers.png", 5),
        Promotion::new("Library late nights", "/img/library.png", 1)
            .with_window(now - Duration::days(7), now + Duration::days(30)),
    ];
    for promotion in &promotions {
        repo.create_promotion(promotion).await?;
    }

    let news = [
        NewsItem::new(
            "Park renovation approved",
            "The council approved the renovation of the central park.",
            "Work starts next month and will take about six weeks.",
            now - Duration::hours(3),
        )
        .featured(),
        NewsItem::new(
            "New bus schedule",
            "Weekend buses run every 20 minutes.",
            "The new schedule applies to lines 4 and 7.",
            now - Duration::days(1),
        ),
        NewsItem::new(
            "Recycling center hours",
            "Extended hours during the summer.",
            "Open until 8pm on weekdays.",
            now - Duration::days(4),
        ),
    ];
    for item in &news {
        repo.create_news(item).await?;
    }

    let events = [
        Event::new(
            "Town hall meeting",
            now + Duration::days(2),
            now + Duration::days(2) + Duration::hours(2),
        )
        .at("City Hall"),
        Event::new(
            "Farmers market",
            now + Duration::days(5),
            now + Duration::days(5) + Duration::hours(6),
        )
        .at("Main Square"),
    ];
    for event in &events {
        repo.create_event(event).await?;
    }

    repo.put_setting("site_name", "Town Bulletin").await?;
    repo.put_setting("contact_email", "hello@bulletin.local").await?;

    tracing::info!(
        promotions = promotions.len(),
        news = news.len(),
        events = events.len(),
        "seeded demo content"
    );
    Ok(())
}

/// Identity provider with one admin and one member.
pub fn demo_identities() -> InMemoryIdentityProvider {
    InMemoryIdentityProvider::new()
        .with_user(
            DEMO_ADMIN_TOKEN,
            "demo-admin",
            Some("admin@bulletin.local"),
            "admin",
        )
        .with_user(
            DEMO_MEMBER_TOKEN,
            "demo-member",
            Some("member@bulletin.local"),
            "member",
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::inmemory::InMemoryContentRepository;

    #[tokio::test]
    async fn test_seed_content() {
        let repo = InMemoryContentRepository::new();
        seed_content(&repo).await.unwrap();

        assert_eq!(repo.list_latest_news(10).await.unwrap().len(), 3);
        assert_eq!(repo.list_featured_news(10).await.unwrap().len(), 1);
        assert_eq!(repo.list_upcoming_events(Utc::now(), 10).await.unwrap().len(), 2);
        assert_eq!(
            repo.get_settings().await.unwrap().get("site_name"),
            Some("Town Bulletin")
        );
    }
}
