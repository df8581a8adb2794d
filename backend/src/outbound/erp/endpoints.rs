//! ERP endpoint URLs derived from the configured base.

use url::Url;

const LOAD_SERVICE: &str = "CRUDServiceProvider.loadRecords";
const SAVE_SERVICE: &str = "DatasetSP.save";
const SERVICE_PATH: &str = "gateway/v1/mge/service.sbr";

/// The three URLs the adapter calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErpEndpoints {
    login: Url,
    load: Url,
    save: Url,
}

impl ErpEndpoints {
    /// Derive endpoints from `base`; a trailing slash is ignored.
    ///
    /// # Errors
    /// Returns a parse error when `base` cannot be extended into a URL.
    ///
    /// # Examples
    /// ```
    /// use crm_bff::outbound::erp::ErpEndpoints;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://erp.example.com/").expect("base");
    /// let endpoints = ErpEndpoints::new(&base).expect("endpoints");
    /// assert_eq!(endpoints.login().as_str(), "https://erp.example.com/login");
    /// ```
    pub fn new(base: &Url) -> Result<Self, url::ParseError> {
        let root = base.as_str().trim_end_matches('/');
        Ok(Self {
            login: Url::parse(&format!("{root}/login"))?,
            load: service_url(root, LOAD_SERVICE)?,
            save: service_url(root, SAVE_SERVICE)?,
        })
    }

    /// Login endpoint.
    #[must_use]
    pub fn login(&self) -> &Url {
        &self.login
    }

    /// `loadRecords` endpoint.
    #[must_use]
    pub fn load(&self) -> &Url {
        &self.load
    }

    /// `DatasetSP.save` endpoint.
    #[must_use]
    pub fn save(&self) -> &Url {
        &self.save
    }
}

fn service_url(root: &str, service: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("{root}/{SERVICE_PATH}"))?;
    url.query_pairs_mut()
        .append_pair("serviceName", service)
        .append_pair("outputType", "json");
    Ok(url)
}

/// Service name carried in load payloads.
pub(super) const fn load_service() -> &'static str {
    LOAD_SERVICE
}

/// Service name carried in save payloads.
pub(super) const fn save_service() -> &'static str {
    SAVE_SERVICE
}
