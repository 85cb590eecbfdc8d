//! Client configuration

use crate::ConfigError;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default `$top` page-size hint
pub const DEFAULT_PAGE_SIZE: u32 = 20_000;

/// Client configuration for the ERP OData services
#[derive(Clone)]
pub struct ErpConfig {
    /// Basic-auth user
    pub username: String,

    /// Basic-auth password
    pub password: String,

    /// Service root of the weighing-ticket entity set (env: API_ROMANEIO_URL)
    pub ticket_service_url: String,

    /// Service root of the invoice entity set (env: API_FATURA_URL)
    pub invoice_service_url: String,

    /// Service root of the supplier entity set (env: API_FORNECEDOR_URL)
    pub supplier_service_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Page-size hint sent as `$top`
    pub page_size: u32,
}

impl ErpConfig {
    /// Create a configuration; the supplier service defaults to the ticket service
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        ticket_service_url: impl Into<String>,
        invoice_service_url: impl Into<String>,
    ) -> Self {
        let ticket_service_url = trim_url(ticket_service_url.into());
        Self {
            username: username.into(),
            password: password.into(),
            supplier_service_url: ticket_service_url.clone(),
            ticket_service_url,
            invoice_service_url: trim_url(invoice_service_url.into()),
            timeout: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let ticket_url = require("API_ROMANEIO_URL")?;
        let invoice_url = require("API_FATURA_URL")?;
        validate_url("API_ROMANEIO_URL", &ticket_url)?;
        validate_url("API_FATURA_URL", &invoice_url)?;

        let mut config = Self::new(require("SAP_USER")?, require("SAP_PASS")?, ticket_url, invoice_url);

        if let Some(url) = lookup("API_FORNECEDOR_URL").filter(|v| !v.trim().is_empty()) {
            validate_url("API_FORNECEDOR_URL", &url)?;
            config = config.with_supplier_service_url(url);
        }

        config.timeout = lookup("ERP_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        config.page_size = lookup("ERP_PAGE_SIZE")
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Ok(config)
    }

    /// Set the supplier service root
    pub fn with_supplier_service_url(mut self, url: impl Into<String>) -> Self {
        self.supplier_service_url = trim_url(url.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the `$top` page-size hint
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Create an OData client from this configuration
    pub fn build_client(&self) -> crate::ClientResult<crate::ODataClient> {
        crate::ODataClient::new(self)
    }
}

impl std::fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("ticket_service_url", &self.ticket_service_url)
            .field("invoice_service_url", &self.invoice_service_url)
            .field("supplier_service_url", &self.supplier_service_url)
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .finish()
    }
}

fn trim_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn validate_url(name: &'static str, url: &str) -> Result<(), ConfigError> {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("'{url}' is not an http(s) URL"),
        })
    }
}
