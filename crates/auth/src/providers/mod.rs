//! Identity backends.
//!
//! Both providers implement [`IdentityVerifier`](bulletin_core::auth::IdentityVerifier)
//! and [`RoleStore`](bulletin_core::auth::RoleStore).

mod http;
mod memory;

pub use http::HttpIdentityProvider;
pub use memory::InMemoryIdentityProvider;
