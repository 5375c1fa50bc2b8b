//! Identity layer for bulletin.
//!
//! This crate provides:
//! - A bounded LRU session cache with a scheduled expiry sweep
//! - Credential resolution that fails closed on any backend error
//! - In-memory and HTTP identity providers
//! - An axum route guard and identity extractors

mod config;
mod error;
mod extractors;
mod guard;
mod providers;
mod resolver;
mod sessions;
mod state;

pub use config::{AuthConfig, IdentityBackendConfig};
pub use error::AuthError;
pub use extractors::{CurrentUser, OptionalUser};
pub use guard::{credential_from_headers, route_guard, CurrentIdentity};
pub use providers::{HttpIdentityProvider, InMemoryIdentityProvider};
pub use resolver::IdentityResolver;
pub use sessions::{spawn_session_sweeper, BoundedSessionCache};
pub use state::AuthState;
