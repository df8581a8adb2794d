//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FunnelsCommand, FunnelsQuery, LeadsQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Funnel reads.
    pub funnels: Arc<dyn FunnelsQuery>,
    /// Funnel writes.
    pub funnels_command: Arc<dyn FunnelsCommand>,
    /// Lead reads.
    pub leads: Arc<dyn LeadsQuery>,
}

impl HttpState {
    /// Bundle the ports.
    pub fn new(
        funnels: Arc<dyn FunnelsQuery>,
        funnels_command: Arc<dyn FunnelsCommand>,
        leads: Arc<dyn LeadsQuery>,
    ) -> Self {
        Self {
            funnels,
            funnels_command,
            leads,
        }
    }
}
