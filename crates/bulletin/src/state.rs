//! Shared application state.
//!
//! Cloned into every handler. Holds the cached query facade, the identity
//! state used by the route guard, and the shutdown broadcast that stops
//! background sweepers.

use std::sync::Arc;

use bulletin_auth::{AuthConfig, AuthState};
use bulletin_core::storage::ContentRepository;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::cache::{spawn_cache_sweeper, ReadThroughCache};
use crate::config::Config;
use crate::mock_data::{demo_identities, seed_content};
use crate::storage::cached::CachedQueryFacade;
use crate::storage::inmemory::InMemoryContentRepository;

#[derive(Clone)]
pub struct AppState {
    /// Cached reads and invalidating writes over the content repository.
    pub content: CachedQueryFacade,
    /// Identity resolution for protected routes.
    pub auth: AuthState,
    pub config: Arc<Config>,
    /// Shutdown signal for background tasks.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(config: Config, repository: Arc<dyn ContentRepository>, auth: AuthState) -> Self {
        let cache = ReadThroughCache::new(config.read_through());
        let content = CachedQueryFacade::new(repository, cache, config.ttl_policy());
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            content,
            auth,
            config: Arc::new(config),
            shutdown_tx,
        }
    }

    /// Creates state over a seeded in-memory repository.
    ///
    /// When `auth_config` names no identity backend, the demo identities
    /// are used so that the admin API can be exercised locally.
    pub async fn with_demo_data(config: Config, auth_config: AuthConfig) -> anyhow::Result<Self> {
        let repository = InMemoryContentRepository::new();
        seed_content(&repository).await?;

        let auth = if auth_config.backend.is_some() {
            AuthState::from_config(auth_config)?
        } else {
            tracing::info!("using demo identities");
            AuthState::with_provider(auth_config, Arc::new(demo_identities()))?
        };

        Ok(Self::new(config, Arc::new(repository), auth))
    }

    /// Starts the session and content sweepers.
    pub fn spawn_sweepers(&self) -> Vec<JoinHandle<()>> {
        vec![
            self.auth.spawn_sweeper(self.subscribe_shutdown()),
            spawn_cache_sweeper(
                self.content.cache().clone(),
                self.config.cache_sweep_interval(),
                self.subscribe_shutdown(),
            ),
        ]
    }

    /// Subscribe to shutdown signal.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal all background tasks to stop.
    pub fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_demo_state_is_seeded() {
        let state = AppState::with_demo_data(Config::default(), AuthConfig::default())
            .await
            .unwrap();

        assert_eq!(state.content.latest_news(10).await.unwrap().len(), 3);
        assert!(state
            .auth
            .resolver
            .resolve(crate::mock_data::DEMO_ADMIN_TOKEN)
            .await
            .is_authenticated());
    }

    #[tokio::test]
    async fn test_sweepers_stop_on_shutdown() {
        let state = AppState::with_demo_data(Config::default(), AuthConfig::default())
            .await
            .unwrap();
        let handles = state.spawn_sweepers();

        state.signal_shutdown();
        for handle in handles {
            tokio::time::timeout(Duration::from_secs(1), handle)
                .await
                .unwrap()
                .unwrap();
        }
    }
}
