//! Domain primitives, services, and ports.
//!
//! Purpose: model the CRM entities stored in the ERP (funnels, stages,
//! leads, users) and the use-cases over them. Services speak only to the
//! [`ports::ErpGateway`] port with typed [`LoadRequest`]s and
//! [`SaveRequest`]s; the ERP's wire shapes live in the outbound adapter.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - Funnel, FunnelStage, Lead, User and their client drafts.
//! - FunnelService, LeadService, UserService: port implementations.

pub mod auth;
pub mod criteria;
pub mod erp_date;
pub mod error;
pub mod funnel_service;
pub mod funnels;
pub mod lead_service;
pub mod leads;
pub mod ports;
pub mod read_after_write;
pub mod schema;
pub mod trace_id;
pub mod user_service;
pub mod users;

pub use self::auth::SessionUser;
pub use self::criteria::{Criteria, CriteriaValue};
pub use self::erp_date::{ErpDate, to_erp_date};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::funnel_service::FunnelService;
pub use self::funnels::{DEFAULT_COLOR, Funnel, FunnelDraft, FunnelPermission, FunnelStage, StageDraft};
pub use self::lead_service::LeadService;
pub use self::leads::{Lead, LeadDraft, LeadStatus};
pub use self::read_after_write::ReadAfterWrite;
pub use self::schema::{
    EntitySchema, ErpRecord, FieldValue, LoadRequest, SaveRequest, SchemaError, SortOrder,
};
pub use self::trace_id::TraceId;
pub use self::user_service::UserService;
pub use self::users::{NewUser, User, UserPatch, UserStatus};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use crm_bff::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
