//! Selection of the rate that applies to a purchase date.
//!
//! A rate applies to a purchase when it was recorded on or before the
//! purchase date and no more than six months earlier. Among applicable
//! rates the most recently recorded one wins; ties on the date go to the
//! record that came first in the input.

use chrono::NaiveDate;
use purchase_common::lookback_start;

use crate::record::ExchangeRateRecord;

/// Read-only rate table, sorted for bisection.
#[derive(Debug, Clone, Default)]
pub struct RateMatcher {
    rates: Vec<ExchangeRateRecord>,
}

impl RateMatcher {
    /// Build a matcher. Records with equal dates keep their input order.
    pub fn new(mut rates: Vec<ExchangeRateRecord>) -> Self {
        rates.sort_by_key(|r| r.effective_date);
        Self { rates }
    }

    /// Rate applicable on `transaction_date`, if any.
    pub fn match_rate(&self, transaction_date: NaiveDate) -> Option<&ExchangeRateRecord> {
        let end = self
            .rates
            .partition_point(|r| r.effective_date <= transaction_date);
        let latest = self.rates[..end].last()?;

        if latest.effective_date < lookback_start(transaction_date) {
            return None;
        }

        let first = self.rates[..end].partition_point(|r| r.effective_date < latest.effective_date);
        self.rates.get(first)
    }

    /// Number of rates held.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Linear-scan form of [`RateMatcher::match_rate`] over an unsorted slice.
pub fn match_rate(
    transaction_date: NaiveDate,
    rates: &[ExchangeRateRecord],
) -> Option<&ExchangeRateRecord> {
    let earliest = lookback_start(transaction_date);
    let mut best: Option<&ExchangeRateRecord> = None;

    for rate in rates {
        if rate.effective_date > transaction_date || rate.effective_date < earliest {
            continue;
        }
        if best.map_or(true, |b| rate.effective_date > b.effective_date) {
            best = Some(rate);
        }
    }

    best
}
