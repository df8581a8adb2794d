//! Tests for domain error construction and trace propagation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case::invalid(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case::unauthorized(Error::unauthorized("no"), ErrorCode::Unauthorized)]
#[case::conflict(Error::conflict("dup"), ErrorCode::Conflict)]
#[case::upstream(Error::upstream("html"), ErrorCode::UpstreamError)]
#[case::unavailable(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case::internal(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::not_found("gone") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_snake_case_code_and_camel_case_fields(expected_trace_id: String) {
    let error = Error::unauthorized("no session")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "reason": "missing_session_cookie" }));

    let value = serde_json::to_value(&error).expect("error serialises");
    assert_eq!(value["code"], "unauthorized");
    assert_eq!(value["traceId"], expected_trace_id);
    assert_eq!(value["details"]["reason"], "missing_session_cookie");
}

#[rstest]
fn omits_absent_optional_fields() {
    let value = serde_json::to_value(Error::conflict("dup")).expect("error serialises");
    assert!(value.get("traceId").is_none());
    assert!(value.get("details").is_none());
}
