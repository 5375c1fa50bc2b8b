//! Process-local session cache.
//!
//! Resolved identities are kept in a bounded LRU so the identity backend is
//! only consulted on a miss. Expired slots are dropped by a scheduled sweep.

mod cache;
mod sweeper;

pub use cache::BoundedSessionCache;
pub use sweeper::spawn_session_sweeper;
