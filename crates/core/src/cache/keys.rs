//! Cache key builders for the content query catalog.
//!
//! Every key starts with its table prefix followed by `:` so that
//! [`table_matches`](super::table_matches) can purge a whole category.

/// Table prefix for promotional banners.
pub const PROMOTIONS_TABLE: &str = "promotions";
/// Table prefix for news items.
pub const NEWS_TABLE: &str = "news";
/// Table prefix for events.
pub const EVENTS_TABLE: &str = "events";
/// Table prefix for site settings.
pub const SETTINGS_TABLE: &str = "settings";

/// Returns the cache key for the active promotions list.
pub fn promotions_active_key(limit: usize) -> String {
    format!("{PROMOTIONS_TABLE}:active:{limit}")
}

/// Returns the cache key for the featured news list.
pub fn news_featured_key(limit: usize) -> String {
    format!("{NEWS_TABLE}:featured:{limit}")
}

/// Returns the cache key for the latest news list.
pub fn news_latest_key(limit: usize) -> String {
    format!("{NEWS_TABLE}:latest:{limit}")
}

/// Returns the cache key for the upcoming events list.
pub fn events_upcoming_key(limit: usize) -> String {
    format!("{EVENTS_TABLE}:upcoming:{limit}")
}

/// Returns the cache key for the full settings document.
pub fn settings_key() -> String {
    format!("{SETTINGS_TABLE}:all")
}
