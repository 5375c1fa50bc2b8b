//! Pure query functions over content collections.
//!
//! Backing stores that cannot express these filters natively (the in-memory
//! repository) apply them after loading.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use super::{Event, NewsItem, Promotion};

/// Whether a promotion should be shown at `now`.
pub fn is_promotion_live(promotion: &Promotion, now: DateTime<Utc>) -> bool {
    promotion.active
        && promotion.starts_at.is_none_or(|start| start <= now)
        && promotion.ends_at.is_none_or(|end| now < end)
}

/// Live promotions, highest priority first.
pub fn select_active_promotions<'a>(
    promotions: impl IntoIterator<Item = &'a Promotion>,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<Promotion> {
    let mut live: Vec<_> = promotions
        .into_iter()
        .filter(|p| is_promotion_live(p, now))
        .cloned()
        .collect();
    live.sort_by_key(|p| (Reverse(p.priority), p.title.clone()));
    live.truncate(limit);
    live
}

/// Most recently published news first.
pub fn select_latest_news<'a>(
    news: impl IntoIterator<Item = &'a NewsItem>,
    featured_only: bool,
    limit: usize,
) -> Vec<NewsItem> {
    let mut items: Vec<_> = news
        .into_iter()
        .filter(|n| !featured_only || n.featured)
        .cloned()
        .collect();
    items.sort_by_key(|n| Reverse(n.published_at));
    items.truncate(limit);
    items
}

/// Events that have not ended yet, soonest first.
pub fn select_upcoming_events<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<Event> {
    let mut upcoming: Vec<_> = events
        .into_iter()
        .filter(|e| e.ends_at > now)
        .cloned()
        .collect();
    upcoming.sort_by_key(|e| e.starts_at);
    upcoming.truncate(limit);
    upcoming
}
