//! HTTP inbound adapter exposing the CRM endpoints.

use actix_web::web;
use serde_json::json;

use crate::domain::Error;

pub mod error;
pub mod funnels;
pub mod health;
pub mod leads;
pub mod session;
pub mod state;

pub use error::ApiResult;

/// JSON extractor settings that report malformed bodies as domain errors.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request("request body is not valid JSON")
            .with_details(json!({ "reason": err.to_string() }))
            .into()
    })
}
