//! Wire transport for authenticated ERP calls.
//!
//! The gateway decides what a status means; the transport only moves bytes
//! and classifies network failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use url::Url;

use crate::domain::ports::{BearerToken, ErpGatewayError};

/// Status and body of one ERP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Undecoded body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Build a response from a status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends one JSON payload with a bearer token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErpTransport: Send + Sync {
    /// Perform the call; only network failures are errors.
    async fn send(
        &self,
        method: Method,
        url: &Url,
        token: &BearerToken,
        payload: &Value,
    ) -> Result<RawResponse, ErpGatewayError>;
}

/// Reqwest-backed transport with a per-call timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport whose calls time out after `timeout`.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ErpTransport for ReqwestTransport {
    async fn send(
        &self,
        method: Method,
        url: &Url,
        token: &BearerToken,
        payload: &Value,
    ) -> Result<RawResponse, ErpGatewayError> {
        let response = self
            .client
            .request(method, url.clone())
            .bearer_auth(token.expose())
            .json(payload)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

pub(super) fn map_transport_error(error: reqwest::Error) -> ErpGatewayError {
    if error.is_timeout() {
        ErpGatewayError::timeout(error.to_string())
    } else {
        ErpGatewayError::transport(error.to_string())
    }
}
