//! Outbound adapter for the ERP's JSON service gateway.
//!
//! Layout: credentials and endpoints describe where and as whom to log in;
//! `token` owns bearer acquisition; `transport` moves bytes; `dto`,
//! `expression`, and `normalizer` translate between typed requests and the
//! ERP's positional wire shape; `gateway` ties them into [`HttpErpGateway`].

mod credentials;
mod dto;
mod endpoints;
mod expression;
mod gateway;
mod normalizer;
mod token;
mod transport;

pub use credentials::{BuildMode, CredentialsError, ErpCredentials};
pub use endpoints::ErpEndpoints;
pub use gateway::HttpErpGateway;
pub use normalizer::normalize_entities;
pub use token::{ErpLoginClient, InProcessTokenCache, TokenSource};
pub use transport::{ErpTransport, RawResponse, ReqwestTransport};
