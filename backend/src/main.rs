//! Backend entry-point: loads settings, wires the ERP adapters, and serves
//! the funnel and lead endpoints.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use crm_bff::config::AppSettings;
use crm_bff::inbound::http::health::HealthState;
use crm_bff::outbound::erp::{BuildMode, ErpCredentials};
use server::{ServerConfig, build_erp_gateway, build_http_state, create_server};

/// Read the ERP login credentials from the process environment.
fn erp_credentials() -> std::io::Result<ErpCredentials> {
    ErpCredentials::from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let credentials = erp_credentials()?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let gateway = build_erp_gateway(&settings, credentials)?;
    let http_state = build_http_state(&settings, gateway);
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, ServerConfig::new(bind_addr, http_state))?;
    info!(%bind_addr, "server listening");
    server.await
}
