//! Assembly of the ERP adapter chain and the services handlers depend on.

use std::io;
use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use crm_bff::config::AppSettings;
use crm_bff::domain::ports::ErpGateway;
use crm_bff::domain::{FunnelService, LeadService};
use crm_bff::inbound::http::state::HttpState;
use crm_bff::outbound::erp::{
    ErpCredentials, ErpEndpoints, ErpLoginClient, HttpErpGateway, InProcessTokenCache,
    ReqwestTransport,
};

/// Build the production ERP gateway: login client, token cache, transport.
///
/// # Errors
/// Returns [`io::Error`] when a setting does not parse or a reqwest client
/// cannot be built.
pub fn build_erp_gateway(
    settings: &AppSettings,
    credentials: ErpCredentials,
) -> io::Result<Arc<dyn ErpGateway>> {
    let base = settings.erp_base_url().map_err(io::Error::other)?;
    let endpoints = ErpEndpoints::new(&base).map_err(io::Error::other)?;
    let login = ErpLoginClient::new(
        endpoints.login().clone(),
        credentials,
        settings.login_timeout(),
    )
    .map_err(io::Error::other)?;
    let transport = ReqwestTransport::new(settings.request_timeout()).map_err(io::Error::other)?;
    info!(erp_base_url = %base, "erp gateway configured");

    Ok(Arc::new(HttpErpGateway::new(
        Arc::new(transport),
        Arc::new(InProcessTokenCache::new(Arc::new(login))),
        endpoints,
    )))
}

/// Wire funnel and lead services over `gateway` into handler state.
pub fn build_http_state(settings: &AppSettings, gateway: Arc<dyn ErpGateway>) -> HttpState {
    let clock = Arc::new(DefaultClock);
    let read_after_write = settings.read_after_write();
    let funnels = Arc::new(
        FunnelService::new(gateway.clone(), clock.clone())
            .with_read_after_write(read_after_write.clone()),
    );
    let leads =
        Arc::new(LeadService::new(gateway, clock).with_read_after_write(read_after_write));

    HttpState::new(funnels.clone(), funnels, leads)
}
