//! In-process read-through caching.

mod read_through;
mod sweeper;

pub use read_through::{ReadThroughCache, ReadThroughConfig};
pub use sweeper::spawn_cache_sweeper;
