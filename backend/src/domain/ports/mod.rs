//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod erp_gateway;
mod funnels_command;
mod funnels_query;
mod leads_command;
mod leads_query;
mod password_hasher;
mod sleeper;
mod token_cache;
mod users_command;
mod users_query;

#[cfg(test)]
pub use erp_gateway::MockErpGateway;
pub use erp_gateway::{ErpGateway, ErpGatewayError, SaveOutcome};
#[cfg(test)]
pub use funnels_command::MockFunnelsCommand;
pub use funnels_command::FunnelsCommand;
#[cfg(test)]
pub use funnels_query::MockFunnelsQuery;
pub use funnels_query::FunnelsQuery;
#[cfg(test)]
pub use leads_command::MockLeadsCommand;
pub use leads_command::LeadsCommand;
#[cfg(test)]
pub use leads_query::MockLeadsQuery;
pub use leads_query::LeadsQuery;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
pub use sleeper::{Sleeper, TokioSleeper};
#[cfg(test)]
pub use token_cache::MockTokenCache;
pub use token_cache::{BearerToken, TokenCache, TokenCacheError};
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::UsersCommand;
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
