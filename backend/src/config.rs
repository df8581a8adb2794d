//! Application settings loaded via OrthoConfig.
//!
//! Values come from `CRM_*` environment variables, configuration files, or
//! command-line flags. ERP credentials are deliberately absent: they are read
//! separately so they never pass through a serialisable struct.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::ReadAfterWrite;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ERP_BASE_URL: &str = "https://api.sandbox.sankhya.com.br";

/// Errors raised when a configured value cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address {value}: {message}")]
    BindAddr {
        /// Offending value.
        value: String,
        /// Parser message.
        message: String,
    },
    /// The ERP base URL does not parse.
    #[error("invalid ERP base URL {value}: {message}")]
    ErpBaseUrl {
        /// Offending value.
        value: String,
        /// Parser message.
        message: String,
    },
}

/// Runtime settings for the BFF.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CRM")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// ERP gateway base URL.
    pub erp_base_url: Option<String>,
    /// Timeout for ERP data calls, in seconds.
    #[ortho_config(default = 15)]
    pub request_timeout_secs: u64,
    /// Timeout for ERP login calls, in seconds.
    #[ortho_config(default = 10)]
    pub login_timeout_secs: u64,
    /// Pause between an ERP write and the read that resolves it, in ms.
    #[ortho_config(default = 500)]
    pub settle_delay_ms: u64,
}

impl AppSettings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// ERP base URL, defaulting to the vendor sandbox.
    ///
    /// # Errors
    /// Returns [`SettingsError::ErpBaseUrl`] when the value does not parse.
    pub fn erp_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self.erp_base_url.as_deref().unwrap_or(DEFAULT_ERP_BASE_URL);
        Url::parse(raw).map_err(|err| SettingsError::ErpBaseUrl {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Per-call timeout for data calls, 15 s unless configured.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Per-call timeout for login, 10 s unless configured.
    #[must_use]
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    /// Read-after-write policy derived from the settle delay.
    #[must_use]
    pub fn read_after_write(&self) -> ReadAfterWrite {
        ReadAfterWrite::with_delay(Duration::from_millis(self.settle_delay_ms))
    }
}
