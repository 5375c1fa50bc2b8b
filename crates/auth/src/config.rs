use std::time::Duration;

use bulletin_core::auth::CredentialCookies;
use url::Url;

use crate::error::AuthError;

const DEFAULT_SESSION_CACHE_CAPACITY: usize = 1000;
const DEFAULT_SESSION_SWEEP_SECS: u64 = 60;
const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 5;

/// Remote identity service.
#[derive(Debug, Clone)]
pub struct IdentityBackendConfig {
    pub base_url: Url,
    pub api_key: String,
    pub timeout: Duration,
}

/// Identity layer configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_cache_capacity: usize,
    pub session_sweep_interval: Duration,
    pub cookies: CredentialCookies,
    /// `None` selects the in-memory provider.
    pub backend: Option<IdentityBackendConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cache_capacity: DEFAULT_SESSION_CACHE_CAPACITY,
            session_sweep_interval: Duration::from_secs(DEFAULT_SESSION_SWEEP_SECS),
            cookies: CredentialCookies::default(),
            backend: None,
        }
    }
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SESSION_CACHE_CAPACITY`: maximum cached sessions (default: 1000)
    /// - `SESSION_SWEEP_SECS`: expired-session sweep interval (default: 60)
    /// - `AUTH_COOKIE_NAMES`: comma-separated credential cookie names
    ///   (default: `access_token,auth-token`)
    /// - `AUTH_COOKIE_PREFIX`: prefix of generic `<prefix>*-auth-token` cookies
    ///   (default: `sb-`, empty disables)
    /// - `IDENTITY_BACKEND_URL`: identity service base URL (optional)
    /// - `IDENTITY_BACKEND_API_KEY`: identity service key (required with the URL)
    /// - `IDENTITY_BACKEND_TIMEOUT_SECS`: request timeout (default: 5)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but unparsable, the backend URL
    /// is set without a key, or the cache capacity or sweep interval is zero.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let defaults = Self::default();

        let session_cache_capacity = parse_var(
            &lookup,
            "SESSION_CACHE_CAPACITY",
            defaults.session_cache_capacity,
        )?;
        if session_cache_capacity == 0 {
            return Err(AuthError::Config(
                "SESSION_CACHE_CAPACITY must be greater than zero".to_string(),
            ));
        }

        let sweep_secs = parse_var(&lookup, "SESSION_SWEEP_SECS", DEFAULT_SESSION_SWEEP_SECS)?;
        if sweep_secs == 0 {
            return Err(AuthError::Config(
                "SESSION_SWEEP_SECS must be greater than zero".to_string(),
            ));
        }

        let names = lookup("AUTH_COOKIE_NAMES")
            .map(|v| parse_list(&v))
            .unwrap_or(defaults.cookies.names);
        let generic_prefix = match lookup("AUTH_COOKIE_PREFIX") {
            Some(prefix) if prefix.is_empty() => None,
            Some(prefix) => Some(prefix),
            None => defaults.cookies.generic_prefix,
        };

        let backend = match lookup("IDENTITY_BACKEND_URL") {
            Some(raw) => {
                let base_url = raw
                    .parse()
                    .map_err(|e| AuthError::Config(format!("IDENTITY_BACKEND_URL: {e}")))?;
                let api_key = lookup("IDENTITY_BACKEND_API_KEY").ok_or_else(|| {
                    AuthError::Config("IDENTITY_BACKEND_API_KEY is required".to_string())
                })?;
                let timeout = Duration::from_secs(parse_var(
                    &lookup,
                    "IDENTITY_BACKEND_TIMEOUT_SECS",
                    DEFAULT_IDENTITY_TIMEOUT_SECS,
                )?);
                Some(IdentityBackendConfig {
                    base_url,
                    api_key,
                    timeout,
                })
            }
            None => None,
        };

        Ok(Self {
            session_cache_capacity,
            session_sweep_interval: Duration::from_secs(sweep_secs),
            cookies: CredentialCookies {
                names,
                generic_prefix,
            },
            backend,
        })
    }
}

/// Unset takes `default`; set but unparsable is an error.
fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AuthError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AuthError::Config(format!("invalid value for {name}: {value:?}"))),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.session_cache_capacity, 1000);
        assert_eq!(config.session_sweep_interval, Duration::from_secs(60));
        assert_eq!(config.cookies, CredentialCookies::default());
        assert!(config.backend.is_none());
    }

    fn load(vars: &[(&str, &str)]) -> Result<AuthConfig, AuthError> {
        let vars: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AuthConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_unset_variables_take_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.session_cache_capacity, 1000);
        assert_eq!(config.session_sweep_interval, Duration::from_secs(60));
        assert!(config.backend.is_none());
    }

    #[test]
    fn test_zero_sweep_interval_is_rejected() {
        assert!(matches!(
            load(&[("SESSION_SWEEP_SECS", "0")]),
            Err(AuthError::Config(msg)) if msg.contains("SESSION_SWEEP_SECS")
        ));
    }

    #[test]
    fn test_unparsable_values_are_rejected() {
        assert!(matches!(
            load(&[("SESSION_CACHE_CAPACITY", "abc")]),
            Err(AuthError::Config(msg)) if msg.contains("SESSION_CACHE_CAPACITY")
        ));
        assert!(matches!(
            load(&[("SESSION_SWEEP_SECS", "soon")]),
            Err(AuthError::Config(_))
        ));
        assert!(matches!(
            load(&[
                ("IDENTITY_BACKEND_URL", "https://id.example.com"),
                ("IDENTITY_BACKEND_API_KEY", "key"),
                ("IDENTITY_BACKEND_TIMEOUT_SECS", "-1"),
            ]),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SESSION_CACHE_CAPACITY", " 25 "),
            ("SESSION_SWEEP_SECS", "5"),
            ("AUTH_COOKIE_PREFIX", ""),
            ("IDENTITY_BACKEND_URL", "https://id.example.com"),
            ("IDENTITY_BACKEND_API_KEY", "key"),
        ])
        .unwrap();
        assert_eq!(config.session_cache_capacity, 25);
        assert_eq!(config.session_sweep_interval, Duration::from_secs(5));
        assert_eq!(config.cookies.generic_prefix, None);
        let backend = config.backend.unwrap();
        assert_eq!(backend.timeout, Duration::from_secs(5));
        assert_eq!(backend.api_key, "key");
    }

    #[test]
    fn test_parse_list_skips_blanks() {
        assert_eq!(
            parse_list(" access_token, ,auth-token "),
            vec!["access_token".to_string(), "auth-token".to_string()]
        );
    }
}
