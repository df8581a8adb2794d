//! HTTP adapter for the [`ErpGateway`] port.
//!
//! Every call takes a cached token; a 401 or 403 forces one refresh and a
//! single retry before the session is reported expired.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::dto::{load_payload, save_payload};
use super::endpoints::ErpEndpoints;
use super::normalizer::normalize_entities;
use super::transport::{ErpTransport, RawResponse};
use crate::domain::ports::{ErpGateway, ErpGatewayError, SaveOutcome, TokenCache};
use crate::domain::{ErpRecord, LoadRequest, SaveRequest};

const UNAUTHORIZED: u16 = 401;
const FORBIDDEN: u16 = 403;

/// ERP gateway over an [`ErpTransport`] and a [`TokenCache`].
pub struct HttpErpGateway {
    transport: Arc<dyn ErpTransport>,
    tokens: Arc<dyn TokenCache>,
    endpoints: ErpEndpoints,
}

impl HttpErpGateway {
    /// Assemble the gateway.
    pub fn new(
        transport: Arc<dyn ErpTransport>,
        tokens: Arc<dyn TokenCache>,
        endpoints: ErpEndpoints,
    ) -> Self {
        Self {
            transport,
            tokens,
            endpoints,
        }
    }

    async fn call(
        &self,
        url: &Url,
        entity: &'static str,
        payload: &Value,
    ) -> Result<Value, ErpGatewayError> {
        let mut force_refresh = false;
        for attempt in 1..=2_u8 {
            let token = self
                .tokens
                .get(force_refresh)
                .await
                .map_err(|error| ErpGatewayError::authentication(error.to_string()))?;

            let started = Instant::now();
            let response = self
                .transport
                .send(Method::POST, url, &token, payload)
                .await?;
            let elapsed_ms = started.elapsed().as_millis();
            debug!(entity, attempt, status = response.status, elapsed_ms, "erp call finished");

            if is_auth_failure(response.status) {
                warn!(entity, attempt, status = response.status, "erp rejected token");
                force_refresh = true;
                continue;
            }
            return decode(&response);
        }
        Err(ErpGatewayError::session_expired())
    }
}

const fn is_auth_failure(status: u16) -> bool {
    matches!(status, UNAUTHORIZED | FORBIDDEN)
}

fn decode(response: &RawResponse) -> Result<Value, ErpGatewayError> {
    let parsed = serde_json::from_slice::<Value>(&response.body).ok();
    if !(200..300).contains(&response.status) {
        return Err(map_status_error(response, parsed.as_ref()));
    }

    let text = String::from_utf8_lossy(&response.body);
    if text.trim_start().starts_with('<') {
        return Err(ErpGatewayError::malformed_response(format!(
            "html body: {}",
            body_preview(&response.body)
        )));
    }
    let body = parsed.ok_or_else(|| {
        ErpGatewayError::malformed_response(format!(
            "invalid json: {}",
            body_preview(&response.body)
        ))
    })?;

    if body.get("status").and_then(status_text).as_deref() == Some("0") {
        return Err(ErpGatewayError::rejected(
            status_message(&body).unwrap_or_else(|| "no status message".to_owned()),
        ));
    }
    Ok(body)
}

fn map_status_error(response: &RawResponse, parsed: Option<&Value>) -> ErpGatewayError {
    let detail = parsed
        .and_then(status_message)
        .unwrap_or_else(|| body_preview(&response.body));
    ErpGatewayError::status(response.status, detail)
}

fn status_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn status_message(body: &Value) -> Option<String> {
    body.get("statusMessage")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

fn primary_key_of(body: &Value, key: &str) -> Option<String> {
    let raw = body.pointer("/responseBody/pk")?.get(key)?;
    let value = match raw {
        Value::Object(wrapped) => wrapped.get("$")?,
        other => other,
    };
    status_text(value).filter(|text| !text.is_empty())
}

pub(super) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[async_trait]
impl ErpGateway for HttpErpGateway {
    async fn load(&self, request: &LoadRequest) -> Result<Vec<ErpRecord>, ErpGatewayError> {
        let schema = request.schema();
        let payload = load_payload(request)?;
        let body = self.call(self.endpoints.load(), schema.name, &payload).await?;

        let side_channel = (!request.fields().contains(&schema.primary_key))
            .then_some(schema.primary_key);
        let records = body
            .pointer("/responseBody/entities")
            .map(|entities| normalize_entities(entities, side_channel))
            .unwrap_or_default();
        debug!(entity = schema.name, rows = records.len(), "erp load normalised");
        Ok(records)
    }

    async fn save(&self, request: &SaveRequest) -> Result<SaveOutcome, ErpGatewayError> {
        let schema = request.schema();
        let payload = save_payload(request)?;
        let body = self.call(self.endpoints.save(), schema.name, &payload).await?;
        Ok(SaveOutcome {
            primary_key: primary_key_of(&body, schema.primary_key),
        })
    }
}
