//! CRM backend-for-frontend over an ERP CRUD gateway.
//!
//! `domain` holds the funnel, lead, and user services and the ports they
//! drive; `outbound` implements those ports against the ERP; `inbound`
//! exposes the HTTP surface.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware.
pub use middleware::Trace;
