//! Rate page sources: the HTTP client for the Treasury API and a scripted mock.

use async_trait::async_trait;
use chrono::NaiveDate;
use purchase_common::format_record_date;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::config::RateSourceConfig;
use crate::error::{FxError, FxResult};
use crate::record::RatePage;

/// Fields requested from the provider.
pub const RATE_FIELDS: &str = "country_currency_desc,exchange_rate,record_date";

/// Filtered rate query: one currency, inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuery {
    pub currency_descriptor: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl RateQuery {
    /// Create a query.
    pub fn new(currency_descriptor: impl Into<String>, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            currency_descriptor: currency_descriptor.into(),
            from,
            to,
        }
    }

    /// Provider filter expression.
    pub fn filter_expression(&self) -> String {
        format!(
            "country_currency_desc:eq:{},record_date:gte:{},record_date:lte:{}",
            self.currency_descriptor,
            format_record_date(self.from),
            format_record_date(self.to),
        )
    }
}

/// Something that serves one page of rate data at a time.
#[async_trait]
pub trait RatePageSource: Send + Sync {
    /// Source name, for logging.
    fn name(&self) -> &str;

    /// Fetch a single page. Non-success statuses map to `FxError::ExternalService`.
    async fn fetch_page(
        &self,
        query: &RateQuery,
        page_number: u32,
        page_size: u32,
    ) -> FxResult<RatePage>;
}

/// HTTP client for the Treasury "rates of exchange" API.
pub struct TreasuryRateClient {
    client: Client,
    base_url: Url,
}

impl TreasuryRateClient {
    /// Build a client from configuration.
    pub fn new(config: &RateSourceConfig) -> FxResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FxError::Configuration(format!("{}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FxError::Configuration(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Full URL for one page of `query`.
    pub fn page_url(&self, query: &RateQuery, page_number: u32, page_size: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("fields", RATE_FIELDS)
            .append_pair("filter", &query.filter_expression())
            .append_pair("page[number]", &page_number.to_string())
            .append_pair("page[size]", &page_size.to_string());
        url
    }
}

#[async_trait]
impl RatePageSource for TreasuryRateClient {
    fn name(&self) -> &str {
        "TREASURY"
    }

    async fn fetch_page(
        &self,
        query: &RateQuery,
        page_number: u32,
        page_size: u32,
    ) -> FxResult<RatePage> {
        let url = self.page_url(query, page_number, page_size);
        debug!(url = %url, "Calling Treasury API");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(
                status_code = status.as_u16(),
                url = %url,
                "Treasury API call failed"
            );
            return Err(FxError::ExternalService {
                status_code: status.as_u16(),
            });
        }

        let page = response.json::<RatePage>().await?;
        Ok(page)
    }
}

/// Scripted page source for testing. Serves queued responses in order.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockPageSource {
    responses: parking_lot::Mutex<std::collections::VecDeque<FxResult<RatePage>>>,
    requests: parking_lot::Mutex<Vec<(RateQuery, u32, u32)>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockPageSource {
    /// Create an empty mock. An exhausted script serves empty pages.
    pub fn new() -> Self {
        Self {
            responses: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            requests: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Queue a page.
    pub fn push_page(&self, page: RatePage) {
        self.responses.lock().push_back(Ok(page));
    }

    /// Queue a failure.
    pub fn push_error(&self, err: FxError) {
        self.responses.lock().push_back(Err(err));
    }

    /// Requests seen so far: query, page number, page size.
    pub fn requests(&self) -> Vec<(RateQuery, u32, u32)> {
        self.requests.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockPageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RatePageSource for MockPageSource {
    fn name(&self) -> &str {
        "MOCK"
    }

    async fn fetch_page(
        &self,
        query: &RateQuery,
        page_number: u32,
        page_size: u32,
    ) -> FxResult<RatePage> {
        self.requests
            .lock()
            .push((query.clone(), page_number, page_size));
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(RatePage::default()))
    }
}
