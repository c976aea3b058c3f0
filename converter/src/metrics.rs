//! Conversion metrics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Converter metrics.
pub struct Metrics {
    /// Conversion requests received.
    pub requests_total: AtomicU64,
    /// Requests that returned an error.
    pub requests_failed: AtomicU64,
    /// Transactions converted with a rate.
    pub transactions_converted: AtomicU64,
    /// Transactions with no rate in their lookback window.
    pub transactions_unconvertible: AtomicU64,
    /// Transactions dropped because their worker failed.
    pub transactions_failed: AtomicU64,
    /// Rate records fetched from the provider.
    pub rate_records_fetched: AtomicU64,
}

impl Metrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            transactions_converted: AtomicU64::new(0),
            transactions_unconvertible: AtomicU64::new(0),
            transactions_failed: AtomicU64::new(0),
            rate_records_fetched: AtomicU64::new(0),
        }
    }

    pub fn request_received(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn transaction_converted(&self) {
        self.transactions_converted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn transaction_unconvertible(&self) {
        self.transactions_unconvertible.fetch_add(1, Ordering::Relaxed);
    }

    pub fn transaction_failed(&self) {
        self.transactions_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rates_fetched(&self, count: u64) {
        self.rate_records_fetched.fetch_add(count, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            transactions_converted: self.transactions_converted.load(Ordering::Relaxed),
            transactions_unconvertible: self.transactions_unconvertible.load(Ordering::Relaxed),
            transactions_failed: self.transactions_failed.load(Ordering::Relaxed),
            rate_records_fetched: self.rate_records_fetched.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            r#"# HELP purchase_conversion_requests_total Total conversion requests
# TYPE purchase_conversion_requests_total counter
purchase_conversion_requests_total {}

# HELP purchase_conversion_requests_failed Conversion requests that returned an error
# TYPE purchase_conversion_requests_failed counter
purchase_conversion_requests_failed {}

# HELP purchase_transactions_converted Transactions converted with a rate
# TYPE purchase_transactions_converted counter
purchase_transactions_converted {}

# HELP purchase_transactions_unconvertible Transactions without an applicable rate
# TYPE purchase_transactions_unconvertible counter
purchase_transactions_unconvertible {}

# HELP purchase_transactions_failed Transactions dropped after a worker failure
# TYPE purchase_transactions_failed counter
purchase_transactions_failed {}

# HELP purchase_rate_records_fetched Rate records fetched from the provider
# TYPE purchase_rate_records_fetched counter
purchase_rate_records_fetched {}
"#,
            snapshot.requests_total,
            snapshot.requests_failed,
            snapshot.transactions_converted,
            snapshot.transactions_unconvertible,
            snapshot.transactions_failed,
            snapshot.rate_records_fetched,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub requests_failed: u64,
    pub transactions_converted: u64,
    pub transactions_unconvertible: u64,
    pub transactions_failed: u64,
    pub rate_records_fetched: u64,
}

/// Shared metrics instance.
pub type SharedMetrics = Arc<Metrics>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_increment() {
        let metrics = Metrics::new();

        metrics.request_received();
        metrics.transaction_converted();
        metrics.transaction_converted();
        metrics.transaction_unconvertible();
        metrics.rates_fetched(12);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 1);
        assert_eq!(snapshot.transactions_converted, 2);
        assert_eq!(snapshot.transactions_unconvertible, 1);
        assert_eq!(snapshot.rate_records_fetched, 12);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        metrics.request_received();

        let output = metrics.to_prometheus();
        assert!(output.contains("purchase_conversion_requests_total 1"));
    }
}
