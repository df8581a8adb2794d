//! Lead HTTP handlers.
//!
//! ```text
//! GET /api/leads
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};

use crate::domain::{Error, Lead, SessionUser};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Lead lists change with every write; clients must never reuse them.
pub const NO_STORE: &str = "no-store, no-cache, must-revalidate";

/// List the active leads visible to the caller.
#[utoipa::path(
    get,
    path = "/api/leads",
    tags = ["leads"],
    responses(
        (
            status = 200,
            description = "Active leads visible to the caller",
            headers(("Cache-Control" = String, description = "Always no-store")),
            body = [Lead]
        ),
        (status = 401, description = "Missing or invalid user cookie", body = Error),
        (status = 502, description = "ERP answered with an unusable body", body = Error),
        (status = 503, description = "ERP unreachable", body = Error)
    )
)]
#[get("/api/leads")]
pub async fn list_leads(state: web::Data<HttpState>, user: SessionUser) -> ApiResult<HttpResponse> {
    let leads = state.leads.list_leads(user.id, user.is_admin()).await?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, NO_STORE))
        .insert_header((header::PRAGMA, "no-cache"))
        .insert_header((header::EXPIRES, "0"))
        .json(leads))
}
