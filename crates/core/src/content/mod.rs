mod functions;
mod types;

pub use functions::{
    is_promotion_live, select_active_promotions, select_latest_news, select_upcoming_events,
};
pub use types::{Event, NewsItem, Promotion, SiteSettings};
