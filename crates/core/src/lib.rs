//! Functional core for bulletin.
//!
//! Pure types and decision functions shared by the identity layer and the
//! content service. Everything with side effects (clocks, locks, tasks,
//! network) lives in the `bulletin_auth` and `bulletin` crates; this crate
//! only describes what those shells should do.

pub mod auth;
pub mod cache;
pub mod content;
pub mod storage;
