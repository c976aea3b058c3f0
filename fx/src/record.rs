//! Rate records: the provider's wire shape and the parsed form.

use std::str::FromStr;

use chrono::NaiveDate;
use purchase_common::parse_record_date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// One page of the provider's response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RatePage {
    #[serde(default)]
    pub data: Vec<RawRateRecord>,
    #[serde(default)]
    pub links: PageLinks,
}

impl RatePage {
    /// Whether the provider advertises another page.
    pub fn has_next(&self) -> bool {
        self.links.next.as_deref().is_some_and(|next| !next.is_empty())
    }
}

/// Pagination links.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
}

/// A rate record as the provider sends it. Every field is a string.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRateRecord {
    #[serde(default)]
    pub country_currency_desc: Option<String>,
    #[serde(default)]
    pub exchange_rate: Option<String>,
    #[serde(default)]
    pub record_date: Option<String>,
}

impl RawRateRecord {
    /// Build a raw record from string slices.
    pub fn new(currency: &str, rate: &str, date: &str) -> Self {
        Self {
            country_currency_desc: Some(currency.to_string()),
            exchange_rate: Some(rate.to_string()),
            record_date: Some(date.to_string()),
        }
    }
}

/// A parsed exchange rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRateRecord {
    /// Provider label, e.g. `Canada-Dollar`.
    pub currency_descriptor: String,
    /// Target currency units per 1 USD.
    pub rate: Decimal,
    /// Date the rate was recorded.
    pub effective_date: NaiveDate,
}

impl ExchangeRateRecord {
    /// Create a record.
    pub fn new(currency_descriptor: impl Into<String>, rate: Decimal, effective_date: NaiveDate) -> Self {
        Self {
            currency_descriptor: currency_descriptor.into(),
            rate,
            effective_date,
        }
    }

    /// Parse a raw provider record.
    pub fn parse(raw: &RawRateRecord) -> Result<Self, RecordError> {
        let date = raw
            .record_date
            .as_deref()
            .ok_or(RecordError::MissingField("record_date"))?;
        let effective_date =
            parse_record_date(date).ok_or_else(|| RecordError::InvalidDate(date.to_string()))?;

        let rate = raw
            .exchange_rate
            .as_deref()
            .ok_or(RecordError::MissingField("exchange_rate"))?;
        let rate = parse_rate(rate).ok_or_else(|| RecordError::InvalidRate(rate.to_string()))?;

        Ok(Self {
            currency_descriptor: raw.country_currency_desc.clone().unwrap_or_default(),
            rate,
            effective_date,
        })
    }
}

/// Parse a rate string independent of locale.
///
/// Accepts surrounding whitespace, a leading sign, `,` group separators and
/// exponent notation. `.` is always the decimal point.
pub fn parse_rate(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized: String = trimmed.chars().filter(|c| *c != ',').collect();

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("1.23"), Some(dec!(1.23)));
        assert_eq!(parse_rate(" 18.015 "), Some(dec!(18.015)));
        assert_eq!(parse_rate("1,234.5"), Some(dec!(1234.5)));
        assert_eq!(parse_rate("+0.5"), Some(dec!(0.5)));
        assert_eq!(parse_rate("1.5e2"), Some(dec!(150)));
        assert_eq!(parse_rate("abc"), None);
        assert_eq!(parse_rate(""), None);
    }

    #[test]
    fn test_parse_record() {
        let raw = RawRateRecord::new("Canada-Dollar", "1.368", "2025-09-30");
        let record = ExchangeRateRecord::parse(&raw).unwrap();

        assert_eq!(record.currency_descriptor, "Canada-Dollar");
        assert_eq!(record.rate, dec!(1.368));
        assert_eq!(record.effective_date, NaiveDate::from_ymd_opt(2025, 9, 30).unwrap());
    }

    #[test]
    fn test_parse_record_rejects_bad_fields() {
        let bad_rate = RawRateRecord::new("Canada-Dollar", "abc", "2025-09-30");
        assert_eq!(
            ExchangeRateRecord::parse(&bad_rate),
            Err(RecordError::InvalidRate("abc".to_string()))
        );

        let bad_date = RawRateRecord::new("Canada-Dollar", "1.3", "30/09/2025");
        assert_eq!(
            ExchangeRateRecord::parse(&bad_date),
            Err(RecordError::InvalidDate("30/09/2025".to_string()))
        );

        let missing = RawRateRecord {
            exchange_rate: None,
            ..RawRateRecord::new("Canada-Dollar", "1.3", "2025-09-30")
        };
        assert_eq!(
            ExchangeRateRecord::parse(&missing),
            Err(RecordError::MissingField("exchange_rate"))
        );
    }

    #[test]
    fn test_page_deserialize() {
        let body = r#"{
            "data": [
                {"country_currency_desc": "Mexico-Peso", "exchange_rate": "18.34", "record_date": "2025-06-30"}
            ],
            "meta": {"count": 1},
            "links": {"self": "&page%5Bnumber%5D=1", "next": "&page%5Bnumber%5D=2"}
        }"#;

        let page: RatePage = serde_json::from_str(body).unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(page.has_next());
    }

    #[test]
    fn test_page_next_null_or_empty() {
        let page: RatePage = serde_json::from_str(r#"{"data": [], "links": {"next": null}}"#).unwrap();
        assert!(!page.has_next());

        let page: RatePage = serde_json::from_str(r#"{"data": [], "links": {"next": ""}}"#).unwrap();
        assert!(!page.has_next());

        let page: RatePage = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(!page.has_next());
    }
}
