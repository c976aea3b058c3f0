//! Purchase FX
//!
//! Retrieval and selection of historical exchange rates.
//!
//! # Features
//!
//! - Paginated retrieval from the Treasury "rates of exchange" API
//! - Lenient parsing: malformed rate records are dropped, not fatal
//! - Lookback matching of a purchase date to the most recent applicable rate
//!
//! # Example
//!
//! ```rust,ignore
//! use purchase_fx::{ExchangeRateSource, PagedRateFetcher, RateMatcher, RateSourceConfig};
//!
//! let fetcher = PagedRateFetcher::treasury(&RateSourceConfig::from_env())?;
//! let rates = fetcher.fetch_rates("Canada-Dollar", from, to).await?;
//!
//! let matcher = RateMatcher::new(rates);
//! let rate = matcher.match_rate(purchase_date);
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod matcher;
pub mod provider;
pub mod record;

pub use config::RateSourceConfig;
pub use error::{FxError, FxResult, RecordError};
pub use fetcher::{ExchangeRateSource, PagedRateFetcher};
pub use matcher::{match_rate, RateMatcher};
pub use provider::{RatePageSource, RateQuery, TreasuryRateClient};
pub use record::{ExchangeRateRecord, PageLinks, RatePage, RawRateRecord};

#[cfg(any(test, feature = "test-utils"))]
pub use fetcher::StaticRateSource;
#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockPageSource;
