//! Shared identity state.

use std::sync::Arc;

use axum::extract::FromRef;
use bulletin_core::auth::{IdentityVerifier, RoleStore};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::providers::{HttpIdentityProvider, InMemoryIdentityProvider};
use crate::resolver::IdentityResolver;
use crate::sessions::{spawn_session_sweeper, BoundedSessionCache};

/// Shared state for the route guard and auth extractors.
#[derive(Clone)]
pub struct AuthState {
    pub resolver: IdentityResolver,
    pub config: Arc<AuthConfig>,
}

impl AuthState {
    /// Builds the state from configuration.
    ///
    /// Uses the remote identity service when one is configured, otherwise
    /// an empty in-memory provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache capacity is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: AuthConfig) -> Result<Self, AuthError> {
        match config.backend.clone() {
            Some(backend) => {
                tracing::info!(url = %backend.base_url, "using remote identity service");
                let provider = Arc::new(HttpIdentityProvider::new(&backend)?);
                Self::with_provider(config, provider)
            }
            None => {
                tracing::warn!("no identity backend configured, using in-memory provider");
                Self::with_provider(config, Arc::new(InMemoryIdentityProvider::new()))
            }
        }
    }

    /// Builds the state around one provider acting as verifier and role store.
    pub fn with_provider<P>(config: AuthConfig, provider: Arc<P>) -> Result<Self, AuthError>
    where
        P: IdentityVerifier + RoleStore + 'static,
    {
        if config.session_sweep_interval.is_zero() {
            return Err(AuthError::Config(
                "session sweep interval must be greater than zero".to_string(),
            ));
        }
        let cache = Arc::new(BoundedSessionCache::new(config.session_cache_capacity)?);
        let verifier: Arc<dyn IdentityVerifier> = provider.clone();
        let roles: Arc<dyn RoleStore> = provider;

        Ok(Self {
            resolver: IdentityResolver::new(cache, verifier, roles),
            config: Arc::new(config),
        })
    }

    /// Starts the expired-session sweep for this state's cache.
    pub fn spawn_sweeper(&self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        spawn_session_sweeper(
            self.resolver.cache().clone(),
            self.config.session_sweep_interval,
            shutdown,
        )
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
