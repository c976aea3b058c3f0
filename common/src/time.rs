//! Date arithmetic for the exchange rate lookback policy.

use chrono::{Months, NaiveDate};

/// Policy constants.
pub mod constants {
    /// How far back a rate may be recorded and still apply to a purchase.
    pub const RATE_LOOKBACK_MONTHS: u32 = 6;

    /// Wire format of provider dates.
    pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";
}

/// Subtract calendar months, clamping to the end of shorter months.
///
/// Saturates at `NaiveDate::MIN` instead of failing.
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Earliest record date whose rate may still apply on `date`.
pub fn lookback_start(date: NaiveDate) -> NaiveDate {
    months_before(date, constants::RATE_LOOKBACK_MONTHS)
}

/// Parse a provider date. Only the zero-padded `yyyy-MM-dd` form is accepted.
pub fn parse_record_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(s, constants::RECORD_DATE_FORMAT).ok()
}

/// Format a date the way the provider's filter expects.
pub fn format_record_date(date: NaiveDate) -> String {
    date.format(constants::RECORD_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_lookback_start() {
        assert_eq!(lookback_start(date(2025, 10, 20)), date(2025, 4, 20));
    }

    #[test]
    fn test_lookback_clamps_to_month_end() {
        assert_eq!(lookback_start(date(2025, 8, 31)), date(2025, 2, 28));
        assert_eq!(lookback_start(date(2024, 8, 31)), date(2024, 2, 29));
    }

    #[test]
    fn test_lookback_crosses_year() {
        assert_eq!(lookback_start(date(2025, 3, 15)), date(2024, 9, 15));
    }

    #[test]
    fn test_parse_record_date() {
        assert_eq!(parse_record_date("2025-10-19"), Some(date(2025, 10, 19)));
        assert_eq!(parse_record_date("2025-1-9"), None);
        assert_eq!(parse_record_date("10/19/2025"), None);
        assert_eq!(parse_record_date("2025-02-30"), None);
        assert_eq!(parse_record_date(""), None);
    }

    #[test]
    fn test_format_record_date() {
        assert_eq!(format_record_date(date(2025, 4, 1)), "2025-04-01");
    }
}
