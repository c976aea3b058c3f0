//! Rate source configuration.

use std::time::Duration;

/// Default Treasury "rates of exchange" endpoint.
pub const DEFAULT_BASE_URL: &str =
    "https://api.fiscaldata.treasury.gov/services/api/fiscal_service/v1/accounting/od/rates_of_exchange";

/// Rate source configuration.
#[derive(Debug, Clone)]
pub struct RateSourceConfig {
    /// Endpoint queried for rate pages.
    pub base_url: String,
    /// First page requested.
    pub default_page_number: u32,
    /// Records requested per page.
    pub default_page_size: u32,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl Default for RateSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_page_number: 1,
            default_page_size: 100,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RateSourceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("EXCHANGE_RATES_BASE_URL") {
            config.base_url = url;
        }

        if let Ok(page) = std::env::var("EXCHANGE_RATES_PAGE_NUMBER") {
            if let Ok(page) = page.parse() {
                config.default_page_number = page;
            }
        }

        if let Ok(size) = std::env::var("EXCHANGE_RATES_PAGE_SIZE") {
            if let Ok(size) = size.parse() {
                config.default_page_size = size;
            }
        }

        if let Ok(secs) = std::env::var("EXCHANGE_RATES_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Exchange rates base URL cannot be empty".to_string());
        }

        if self.default_page_number == 0 {
            return Err("Page numbers start at 1".to_string());
        }

        if self.default_page_size == 0 {
            return Err("Page size cannot be 0".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be 0".to_string());
        }

        Ok(())
    }
}
