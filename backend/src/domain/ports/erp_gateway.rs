//! Driven port for the ERP CRUD gateway.
//!
//! Services describe reads and writes as typed [`LoadRequest`]s and
//! [`SaveRequest`]s; adapters own authentication, transport, and the ERP's
//! positional wire format.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Error, ErpRecord, LoadRequest, SaveRequest};

/// Result of a successful write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Primary key echoed by the ERP, when it reports one.
    pub primary_key: Option<String>,
}

impl SaveOutcome {
    /// Outcome carrying an echoed key.
    pub fn with_key(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: Some(primary_key.into()),
        }
    }
}

define_port_error! {
    /// Errors surfaced while talking to the ERP.
    pub enum ErpGatewayError {
        /// A bearer token could not be obtained.
        Authentication { message: String } =>
            "erp authentication failed: {message}",
        /// Authorisation still failed after refreshing the token.
        SessionExpired =>
            "erp session expired after token refresh",
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "erp transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } =>
            "erp call timed out: {message}",
        /// The body was HTML or otherwise not the expected JSON.
        MalformedResponse { message: String } =>
            "erp response malformed: {message}",
        /// The ERP answered with `status: "0"`.
        Rejected { message: String } =>
            "erp rejected request: {message}",
        /// The ERP answered with an unexpected HTTP status.
        Status { status: u16, message: String } =>
            "erp returned status {status}: {message}",
        /// The request could not be encoded.
        InvalidRequest { message: String } =>
            "erp request invalid: {message}",
    }
}

impl From<ErpGatewayError> for Error {
    fn from(value: ErpGatewayError) -> Self {
        match value {
            ErpGatewayError::Authentication { .. }
            | ErpGatewayError::SessionExpired
            | ErpGatewayError::Transport { .. }
            | ErpGatewayError::Timeout { .. } => Self::service_unavailable(value.to_string()),
            ErpGatewayError::MalformedResponse { .. }
            | ErpGatewayError::Rejected { .. }
            | ErpGatewayError::Status { .. } => Self::upstream(value.to_string()),
            ErpGatewayError::InvalidRequest { .. } => Self::internal(value.to_string()),
        }
    }
}

/// Port for reading and writing ERP entities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErpGateway: Send + Sync {
    /// Load rows matching `request`. An empty result is not an error.
    async fn load(&self, request: &LoadRequest) -> Result<Vec<ErpRecord>, ErpGatewayError>;

    /// Persist one record.
    async fn save(&self, request: &SaveRequest) -> Result<SaveOutcome, ErpGatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case::auth(ErpGatewayError::authentication("no token"), ErrorCode::ServiceUnavailable)]
    #[case::expired(ErpGatewayError::session_expired(), ErrorCode::ServiceUnavailable)]
    #[case::timeout(ErpGatewayError::timeout("15s"), ErrorCode::ServiceUnavailable)]
    #[case::html(ErpGatewayError::malformed_response("html"), ErrorCode::UpstreamError)]
    #[case::rejected(ErpGatewayError::rejected("bad field"), ErrorCode::UpstreamError)]
    #[case::status(ErpGatewayError::status(500_u16, "boom"), ErrorCode::UpstreamError)]
    #[case::encode(ErpGatewayError::invalid_request("nan"), ErrorCode::InternalError)]
    fn gateway_errors_map_to_domain_codes(
        #[case] error: ErpGatewayError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(Error::from(error).code(), expected);
    }
}
