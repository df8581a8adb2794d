//! Driven port for bearer-token acquisition.
//!
//! The gateway asks for a token before every call and forces a refresh after
//! an authorisation failure. Whether tokens live in process memory or a
//! shared store is the adapter's business.

use async_trait::async_trait;
use zeroize::Zeroize;

use super::define_port_error;

/// Opaque bearer token. Redacted in `Debug` and wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BearerToken").field(&"<redacted>").finish()
    }
}

impl Drop for BearerToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

define_port_error! {
    /// Errors surfaced while obtaining a token.
    pub enum TokenCacheError {
        /// The login endpoint could not be reached or refused the credentials.
        Login { message: String } => "erp login failed: {message}",
        /// The login response carried no token.
        MissingToken => "erp login response carried no token",
        /// The backing store failed.
        Store { message: String } => "token store failed: {message}",
    }
}

/// Port exposing `get(force_refresh)` over some token store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Return a usable token, bypassing any cached value when `force_refresh`.
    async fn get(&self, force_refresh: bool) -> Result<BearerToken, TokenCacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_token() {
        let token = BearerToken::new("eyJhbGciOi.secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("secret"), "token leaked: {rendered}");
    }
}
