//! Token acquisition: the login client and the in-process cache in front
//! of it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use super::credentials::ErpCredentials;
use super::gateway::body_preview;
use crate::domain::ports::{BearerToken, TokenCache, TokenCacheError};

/// Source of fresh tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Obtain a new token.
    async fn fetch(&self) -> Result<BearerToken, TokenCacheError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(default)]
    bearer_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

impl LoginResponse {
    fn into_token(self) -> Option<BearerToken> {
        self.bearer_token
            .into_iter()
            .chain(self.token)
            .find(|token| !token.trim().is_empty())
            .map(BearerToken::new)
    }
}

/// Logs into the ERP with header credentials.
pub struct ErpLoginClient {
    client: Client,
    url: Url,
    credentials: ErpCredentials,
}

impl ErpLoginClient {
    /// Build a login client whose calls time out after `timeout`.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        url: Url,
        credentials: ErpCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            credentials,
        })
    }
}

#[async_trait]
impl TokenSource for ErpLoginClient {
    async fn fetch(&self) -> Result<BearerToken, TokenCacheError> {
        let started = Instant::now();
        let mut request = self.client.post(self.url.clone()).json(&serde_json::json!({}));
        for (name, value) in self.credentials.headers() {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|error| TokenCacheError::login(error.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| TokenCacheError::login(error.to_string()))?;
        let elapsed_ms = started.elapsed().as_millis();
        if !status.is_success() {
            warn!(status = status.as_u16(), elapsed_ms, "erp login refused");
            return Err(TokenCacheError::login(format!(
                "status {}: {}",
                status.as_u16(),
                body_preview(&body)
            )));
        }

        let parsed: LoginResponse = serde_json::from_slice(&body)
            .map_err(|error| TokenCacheError::login(format!("invalid login body: {error}")))?;
        let token = parsed.into_token().ok_or_else(TokenCacheError::missing_token)?;
        info!(status = status.as_u16(), elapsed_ms, "erp login succeeded");
        Ok(token)
    }
}

/// Module-local token cache: one slot in front of a [`TokenSource`].
///
/// Concurrent refreshes may race; the last successful fetch wins.
pub struct InProcessTokenCache {
    source: Arc<dyn TokenSource>,
    slot: RwLock<Option<BearerToken>>,
}

impl InProcessTokenCache {
    /// Empty cache over `source`.
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            slot: RwLock::new(None),
        }
    }
}

#[async_trait]
impl TokenCache for InProcessTokenCache {
    async fn get(&self, force_refresh: bool) -> Result<BearerToken, TokenCacheError> {
        if !force_refresh {
            if let Some(token) = self.slot.read().await.as_ref() {
                return Ok(token.clone());
            }
        }

        debug!(force_refresh, "fetching erp token");
        match self.source.fetch().await {
            Ok(token) => {
                *self.slot.write().await = Some(token.clone());
                Ok(token)
            }
            Err(error) => {
                *self.slot.write().await = None;
                Err(error)
            }
        }
    }
}
