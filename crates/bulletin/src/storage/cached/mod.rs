//! Cached query layer.
//!
//! Reads go through a [`ReadThroughCache`](crate::cache::ReadThroughCache)
//! with a TTL chosen by how often each kind of content changes. Writes go to
//! the repository first and then invalidate exactly the affected category.

mod content;

pub use content::{CachedContent, CachedQueryFacade, ContentCache, TtlClass, TtlPolicy};
