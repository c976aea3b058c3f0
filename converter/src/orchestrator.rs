//! Conversion of purchase batches into a target currency.
//!
//! One request loads the purchases in chunks, fetches every rate the batch
//! can need in a single call, then matches and converts each purchase on a
//! bounded pool of tasks that share the rate table read-only.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use purchase_common::{
    lookback_start, ConvertedTransaction, PurchaseError, Result, Transaction, TransactionId,
};
use purchase_fx::{ExchangeRateSource, RateMatcher};

use crate::batch_loader::BatchLoader;
use crate::config::ConverterConfig;
use crate::metrics::{Metrics, SharedMetrics};
use crate::store::TransactionStore;

/// Converts stored purchases into a target currency.
pub struct ConversionOrchestrator {
    loader: BatchLoader,
    rates: Arc<dyn ExchangeRateSource>,
    max_concurrency: usize,
    deadline: Option<Duration>,
    metrics: SharedMetrics,
}

impl ConversionOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        store: Arc<dyn TransactionStore>,
        rates: Arc<dyn ExchangeRateSource>,
        config: &ConverterConfig,
    ) -> Self {
        Self {
            loader: BatchLoader::new(store, config.batch_size),
            rates,
            max_concurrency: config.max_concurrency.max(1),
            deadline: config.deadline,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Report into a shared metrics instance.
    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Metrics for this orchestrator.
    pub fn metrics(&self) -> &SharedMetrics {
        &self.metrics
    }

    /// Convert the purchases named by `transaction_ids` into `target_currency`.
    ///
    /// Ids that do not exist are omitted from the output. Purchases with no
    /// rate in their lookback window come back zeroed and annotated. Output
    /// order is unspecified.
    pub async fn convert(
        &self,
        transaction_ids: &[TransactionId],
        target_currency: &str,
    ) -> Result<Vec<ConvertedTransaction>> {
        match self.deadline {
            Some(deadline) => {
                self.convert_with_deadline(transaction_ids, target_currency, deadline)
                    .await
            }
            None => self.run(transaction_ids, target_currency).await,
        }
    }

    /// [`convert`](Self::convert) bounded by `deadline`. Outstanding workers
    /// are aborted when it expires.
    pub async fn convert_with_deadline(
        &self,
        transaction_ids: &[TransactionId],
        target_currency: &str,
        deadline: Duration,
    ) -> Result<Vec<ConvertedTransaction>> {
        match tokio::time::timeout(deadline, self.run(transaction_ids, target_currency)).await {
            Ok(result) => result,
            Err(_) => {
                self.metrics.request_failed();
                warn!(
                    currency = target_currency,
                    deadline_ms = deadline.as_millis() as u64,
                    "Conversion deadline exceeded"
                );
                Err(PurchaseError::Timeout(format!(
                    "conversion to {} exceeded {:?}",
                    target_currency, deadline
                )))
            }
        }
    }

    async fn run(
        &self,
        transaction_ids: &[TransactionId],
        target_currency: &str,
    ) -> Result<Vec<ConvertedTransaction>> {
        self.metrics.request_received();
        let result = self.convert_batch(transaction_ids, target_currency).await;
        if result.is_err() {
            self.metrics.request_failed();
        }
        result
    }

    #[instrument(skip(self, transaction_ids), fields(count = transaction_ids.len(), currency = target_currency))]
    async fn convert_batch(
        &self,
        transaction_ids: &[TransactionId],
        target_currency: &str,
    ) -> Result<Vec<ConvertedTransaction>> {
        validate_request(target_currency)?;

        if transaction_ids.is_empty() {
            debug!("No transaction ids requested");
            return Ok(Vec::new());
        }

        info!("Starting currency conversion");

        let transactions = self.loader.load_all(transaction_ids).await?;
        let Some((from, to)) = fetch_window(&transactions) else {
            warn!("No transactions found for the provided IDs");
            return Ok(Vec::new());
        };

        let rates = self.rates.fetch_rates(target_currency, from, to).await?;
        self.metrics.rates_fetched(rates.len() as u64);
        let matcher = Arc::new(RateMatcher::new(rates));

        let results = self
            .fan_out(transactions, matcher, Arc::from(target_currency), convert_one)
            .await?;

        info!(converted = results.len(), "Completed currency conversion");
        Ok(results)
    }

    /// Match and convert every transaction, at most `max_concurrency` at a time.
    async fn fan_out(
        &self,
        transactions: Vec<Transaction>,
        matcher: Arc<RateMatcher>,
        target_currency: Arc<str>,
        convert: ConvertFn,
    ) -> Result<Vec<ConvertedTransaction>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        let total = transactions.len();
        let mut pending: HashMap<task::Id, TransactionId> = HashMap::with_capacity(total);

        for transaction in transactions {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| PurchaseError::InternalError(e.to_string()))?;
            let matcher = matcher.clone();
            let target_currency = target_currency.clone();
            let transaction_id = transaction.id;

            let handle = tasks.spawn(async move {
                let _permit = permit;
                convert(&transaction, &matcher, &target_currency)
            });
            pending.insert(handle.id(), transaction_id);
        }

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, Ok(Conversion::Converted(converted)))) => {
                    self.metrics.transaction_converted();
                    results.push(converted);
                }
                Ok((_, Ok(Conversion::Unconvertible(converted)))) => {
                    self.metrics.transaction_unconvertible();
                    results.push(converted);
                }
                Ok((task_id, Err(e))) => {
                    self.metrics.transaction_failed();
                    error!(
                        transaction_id = ?pending.get(&task_id),
                        currency = %target_currency,
                        error = %e,
                        "Error converting transaction"
                    );
                }
                Err(e) => {
                    self.metrics.transaction_failed();
                    error!(
                        transaction_id = ?pending.get(&e.id()),
                        currency = %target_currency,
                        error = %e,
                        "Conversion worker failed"
                    );
                }
            }
        }

        Ok(results)
    }
}

/// Result of matching one transaction against the rate table.
enum Conversion {
    Converted(ConvertedTransaction),
    Unconvertible(ConvertedTransaction),
}

type ConvertFn = fn(&Transaction, &RateMatcher, &str) -> Result<Conversion>;

/// Reject requests that cannot be served before touching storage.
fn validate_request(target_currency: &str) -> Result<()> {
    if target_currency.trim().is_empty() {
        return Err(PurchaseError::invalid_field(
            "target_currency",
            "Target currency is required",
        ));
    }

    Ok(())
}

/// Rate dates needed to cover every transaction's lookback window.
///
/// `None` for an empty batch.
pub fn fetch_window(transactions: &[Transaction]) -> Option<(NaiveDate, NaiveDate)> {
    let earliest = transactions.iter().map(|t| t.transaction_date).min()?;
    let latest = transactions.iter().map(|t| t.transaction_date).max()?;
    Some((lookback_start(earliest), latest))
}

fn convert_one(
    transaction: &Transaction,
    matcher: &RateMatcher,
    target_currency: &str,
) -> Result<Conversion> {
    match matcher.match_rate(transaction.transaction_date) {
        Some(rate) => {
            debug!(
                transaction_id = %transaction.id,
                rate = %rate.rate,
                effective_date = %rate.effective_date,
                "Matched exchange rate"
            );
            ConvertedTransaction::converted(transaction, rate.rate, target_currency)
                .map(Conversion::Converted)
        }
        None => {
            warn!(
                transaction_id = %transaction.id,
                date = %transaction.transaction_date,
                currency = target_currency,
                "No exchange rate found for transaction"
            );
            Ok(Conversion::Unconvertible(ConvertedTransaction::unconvertible(
                transaction,
                target_currency,
            )))
        }
    }
}
