//! HTTP server configuration object.

use std::net::SocketAddr;

use crm_bff::inbound::http::state::HttpState;

/// Everything the server factory needs besides the health state.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    /// Bind `http_state`'s handlers at `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, http_state: HttpState) -> Self {
        Self {
            bind_addr,
            http_state,
        }
    }
}
