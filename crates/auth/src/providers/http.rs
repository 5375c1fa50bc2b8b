use async_trait::async_trait;
use bulletin_core::auth::{AuthError, IdentityVerifier, Result, RoleStore, VerifiedIdentity};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::IdentityBackendConfig;

const USER_PATH: &str = "auth/v1/user";
const ROLES_PATH: &str = "rest/v1/user_roles";

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoleRow {
    role: String,
}

/// Identity provider talking to a remote auth/REST service.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpIdentityProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &IdentityBackendConfig) -> std::result::Result<Self, crate::AuthError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| crate::AuthError::Config(format!("identity client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
            .parse()
            .map_err(|e| AuthError::Provider(format!("invalid endpoint {path}: {e}")))
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityProvider {
    async fn verify(&self, raw_token: &str) -> Result<VerifiedIdentity> {
        let response = self
            .client
            .get(self.endpoint(USER_PATH)?)
            .bearer_auth(raw_token)
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AuthError::InvalidToken),
            StatusCode::NOT_FOUND => return Err(AuthError::IdentityNotFound),
            status => {
                return Err(AuthError::Provider(format!(
                    "identity service returned {status}"
                )))
            }
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("malformed user response: {e}")))?;

        Ok(VerifiedIdentity {
            id: user.id,
            email: user.email,
        })
    }
}

#[async_trait]
impl RoleStore for HttpIdentityProvider {
    async fn get_role(&self, user_id: &str) -> Result<String> {
        let user_filter = format!("eq.{user_id}");
        let response = self
            .client
            .get(self.endpoint(ROLES_PATH)?)
            .query(&[("user_id", user_filter.as_str()), ("select", "role")])
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Storage(format!(
                "role lookup returned {}",
                response.status()
            )));
        }

        let rows: Vec<RoleRow> = response
            .json()
            .await
            .map_err(|e| AuthError::Storage(format!("malformed role response: {e}")))?;

        rows.into_iter()
            .next()
            .map(|row| row.role)
            .ok_or_else(|| AuthError::RoleNotFound(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};

    async fn fake_user(headers: HeaderMap) -> (AxumStatus, Json<Value>) {
        let has_key = headers.get("apikey").is_some_and(|v| v == "service-key");
        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        match (has_key, bearer) {
            (true, "Bearer good-token") => (
                AxumStatus::OK,
                Json(json!({ "id": "user-1", "email": "one@example.com" })),
            ),
            (true, "Bearer broken") => (AxumStatus::INTERNAL_SERVER_ERROR, Json(json!({}))),
            _ => (AxumStatus::UNAUTHORIZED, Json(json!({ "msg": "bad jwt" }))),
        }
    }

    async fn fake_roles(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        assert_eq!(params.get("select").map(String::as_str), Some("role"));
        match params.get("user_id").map(String::as_str) {
            Some("eq.user-1") => Json(json!([{ "role": "admin" }])),
            _ => Json(json!([])),
        }
    }

    async fn spawn_backend() -> HttpIdentityProvider {
        let app = Router::new()
            .route("/auth/v1/user", get(fake_user))
            .route("/rest/v1/user_roles", get(fake_roles));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        HttpIdentityProvider::new(&IdentityBackendConfig {
            base_url: format!("http://{addr}/").parse().unwrap(),
            api_key: "service-key".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_verify_success() {
        let provider = spawn_backend().await;
        let identity = provider.verify("good-token").await.unwrap();
        assert_eq!(identity.id, "user-1");
        assert_eq!(identity.email.as_deref(), Some("one@example.com"));
    }

    #[tokio::test]
    async fn test_verify_rejected_token() {
        let provider = spawn_backend().await;
        assert_eq!(
            provider.verify("expired").await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[tokio::test]
    async fn test_verify_server_error_is_provider_error() {
        let provider = spawn_backend().await;
        assert!(matches!(
            provider.verify("broken").await.unwrap_err(),
            AuthError::Provider(_)
        ));
    }

    #[tokio::test]
    async fn test_role_lookup() {
        let provider = spawn_backend().await;
        assert_eq!(provider.get_role("user-1").await.unwrap(), "admin");
        assert_eq!(
            provider.get_role("user-2").await.unwrap_err(),
            AuthError::RoleNotFound("user-2".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let provider = HttpIdentityProvider::new(&IdentityBackendConfig {
            base_url: "http://127.0.0.1:1".parse().unwrap(),
            api_key: "k".to_string(),
            timeout: Duration::from_millis(500),
        })
        .unwrap();
        assert!(matches!(
            provider.verify("t").await.unwrap_err(),
            AuthError::Provider(_)
        ));
    }
}
