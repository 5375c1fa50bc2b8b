mod credentials;
mod error;
mod functions;
mod routes;
mod traits;
mod types;

pub use credentials::{
    bearer_token, decode_credential, extract_credential, parse_cookie_header, CredentialCookies,
    GENERIC_COOKIE_SUFFIX,
};
pub use error::AuthError;
pub use functions::{
    calculate_expiry, derive_session_key, hit_rate, is_slot_valid, session_cache_ttl,
    SESSION_CACHE_TTL_MINUTES,
};
pub use routes::{classify_route, Role, RouteClass};
pub use traits::{IdentityVerifier, Result, RoleStore};
pub use types::{
    AuthResolution, ResolvedIdentity, SessionCacheSlot, SessionCacheStats, SessionKey,
    SessionRecord, VerifiedIdentity,
};
