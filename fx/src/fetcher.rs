//! Paginated exchange rate retrieval.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::config::RateSourceConfig;
use crate::error::{FxError, FxResult};
use crate::provider::{RatePageSource, RateQuery, TreasuryRateClient};
use crate::record::ExchangeRateRecord;

/// Anything that can produce every rate for a currency over a date range.
#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    /// All valid rates for `currency_descriptor` recorded within `[from, to]`.
    async fn fetch_rates(
        &self,
        currency_descriptor: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> FxResult<Vec<ExchangeRateRecord>>;
}

/// Pages through a [`RatePageSource`] until the data runs out.
pub struct PagedRateFetcher {
    source: Arc<dyn RatePageSource>,
    first_page: u32,
    page_size: u32,
}

impl PagedRateFetcher {
    /// Create a fetcher over the given page source.
    pub fn new(source: Arc<dyn RatePageSource>, config: &RateSourceConfig) -> Self {
        Self {
            source,
            first_page: config.default_page_number,
            page_size: config.default_page_size,
        }
    }

    /// Fetcher backed by the Treasury HTTP API.
    pub fn treasury(config: &RateSourceConfig) -> FxResult<Self> {
        let client = TreasuryRateClient::new(config)?;
        Ok(Self::new(Arc::new(client), config))
    }
}

#[async_trait]
impl ExchangeRateSource for PagedRateFetcher {
    #[instrument(skip(self), fields(source = self.source.name()))]
    async fn fetch_rates(
        &self,
        currency_descriptor: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> FxResult<Vec<ExchangeRateRecord>> {
        if currency_descriptor.trim().is_empty() {
            return Err(FxError::InvalidQuery("currency descriptor is empty".to_string()));
        }
        if from > to {
            return Err(FxError::InvalidQuery(format!(
                "date range is inverted: {} > {}",
                from, to
            )));
        }

        info!(
            currency = currency_descriptor,
            from = %from,
            to = %to,
            "Fetching exchange rates"
        );

        let query = RateQuery::new(currency_descriptor, from, to);
        let mut rates = Vec::new();
        let mut page_number = self.first_page;
        let mut pages = 0u32;
        let mut dropped = 0usize;
        let mut has_more = true;

        while has_more {
            let page = self
                .source
                .fetch_page(&query, page_number, self.page_size)
                .await?;
            pages += 1;

            let page_len = page.data.len();
            if page_len == 0 {
                debug!(page = page_number, "Empty rate page, stopping");
            }

            for raw in &page.data {
                match ExchangeRateRecord::parse(raw) {
                    Ok(record) => rates.push(record),
                    Err(e) => {
                        dropped += 1;
                        warn!(
                            currency = currency_descriptor,
                            page = page_number,
                            reason = %e,
                            "Dropping malformed rate record"
                        );
                    }
                }
            }

            has_more = page.has_next() && page_len > 0;
            page_number = page_number.saturating_add(1);
        }

        if rates.is_empty() {
            warn!(currency = currency_descriptor, "No exchange rate data returned");
        }

        info!(
            currency = currency_descriptor,
            records = rates.len(),
            dropped,
            pages,
            "Fetched exchange rates"
        );

        Ok(rates)
    }
}

/// Fixed rate set for testing. Counts calls.
#[cfg(any(test, feature = "test-utils"))]
pub struct StaticRateSource {
    rates: Vec<ExchangeRateRecord>,
    failure: Option<u16>,
    calls: parking_lot::Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl StaticRateSource {
    /// Serve `rates` regardless of the requested range.
    pub fn new(rates: Vec<ExchangeRateRecord>) -> Self {
        Self {
            rates,
            failure: None,
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with the given provider status.
    pub fn failing(status_code: u16) -> Self {
        Self {
            failure: Some(status_code),
            ..Self::new(Vec::new())
        }
    }

    /// Calls seen so far: currency, from, to.
    pub fn calls(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl ExchangeRateSource for StaticRateSource {
    async fn fetch_rates(
        &self,
        currency_descriptor: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> FxResult<Vec<ExchangeRateRecord>> {
        self.calls
            .lock()
            .push((currency_descriptor.to_string(), from, to));
        match self.failure {
            Some(status_code) => Err(FxError::ExternalService { status_code }),
            None => Ok(self.rates.clone()),
        }
    }
}
