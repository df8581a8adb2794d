//! Funnel HTTP handlers.
//!
//! ```text
//! GET  /api/funis
//! POST /api/funis/salvar
//! ```

use actix_web::{get, post, web};
use tracing::info;

use crate::domain::{Error, Funnel, FunnelDraft, SessionUser};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// List the funnels visible to the caller.
#[utoipa::path(
    get,
    path = "/api/funis",
    tags = ["funnels"],
    responses(
        (status = 200, description = "Active funnels visible to the caller", body = [Funnel]),
        (status = 401, description = "Missing or invalid user cookie", body = Error),
        (status = 502, description = "ERP answered with an unusable body", body = Error),
        (status = 503, description = "ERP unreachable", body = Error)
    )
)]
#[get("/api/funis")]
pub async fn list_funnels(
    state: web::Data<HttpState>,
    user: SessionUser,
) -> ApiResult<web::Json<Vec<Funnel>>> {
    let funnels = state
        .funnels
        .list_funnels(user.id, user.is_admin())
        .await?;
    Ok(web::Json(funnels))
}

/// Create or update a funnel and return the stored row.
#[utoipa::path(
    post,
    path = "/api/funis/salvar",
    tags = ["funnels"],
    request_body = FunnelDraft,
    responses(
        (status = 200, description = "Stored funnel", body = Funnel),
        (status = 400, description = "Malformed body", body = Error),
        (status = 401, description = "Missing or invalid user cookie", body = Error),
        (status = 502, description = "ERP rejected the write", body = Error),
        (status = 503, description = "ERP unreachable", body = Error)
    )
)]
#[post("/api/funis/salvar")]
pub async fn save_funnel(
    state: web::Data<HttpState>,
    user: SessionUser,
    payload: web::Json<FunnelDraft>,
) -> ApiResult<web::Json<Funnel>> {
    let draft = payload.into_inner();
    let is_update = draft.id.is_some();
    let funnel = state.funnels_command.save_funnel(draft).await?;
    info!(
        funnel_id = %funnel.id,
        user_id = user.id,
        is_update,
        "funnel saved"
    );
    Ok(web::Json(funnel))
}
