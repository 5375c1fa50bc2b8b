mod error;
mod functions;
mod keys;
mod patterns;
mod types;

pub use error::{CacheError, Result};
pub use functions::{
    is_hard_expired, plan_lookup, plan_sweep, Lookup, SweepCandidate, SweepPlan,
    HARD_EXPIRY_FACTOR,
};
pub use keys::{
    events_upcoming_key, news_featured_key, news_latest_key, promotions_active_key, settings_key,
    EVENTS_TABLE, NEWS_TABLE, PROMOTIONS_TABLE, SETTINGS_TABLE,
};
pub use patterns::{pattern_matches, table_matches};
pub use types::{CacheEntry, EntrySummary, GetOptions, ReadThroughStats, SweepReport};
