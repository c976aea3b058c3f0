//! Purchase service: record keeping plus currency conversion.

use std::sync::Arc;

use tracing::{info, instrument};

use purchase_common::{
    ConvertedTransaction, NewTransaction, PurchaseError, Result, Transaction, TransactionId,
};
use purchase_fx::{ExchangeRateSource, PagedRateFetcher};

use crate::config::ConverterConfig;
use crate::orchestrator::ConversionOrchestrator;
use crate::store::TransactionStore;

/// Entry point for callers: create, read and convert purchases.
pub struct PurchaseService {
    store: Arc<dyn TransactionStore>,
    orchestrator: ConversionOrchestrator,
}

impl PurchaseService {
    /// Create a service over a store and a rate source.
    pub fn new(
        store: Arc<dyn TransactionStore>,
        rates: Arc<dyn ExchangeRateSource>,
        config: &ConverterConfig,
    ) -> Self {
        let orchestrator = ConversionOrchestrator::new(store.clone(), rates, config);
        Self {
            store,
            orchestrator,
        }
    }

    /// Service backed by the Treasury API.
    pub fn with_treasury(store: Arc<dyn TransactionStore>, config: &ConverterConfig) -> Result<Self> {
        let fetcher = PagedRateFetcher::treasury(&config.rate_source)?;
        Ok(Self::new(store, Arc::new(fetcher), config))
    }

    /// Validate and store a new purchase.
    #[instrument(skip(self, request), fields(amount = %request.amount_usd, date = %request.transaction_date))]
    pub async fn create_transaction(&self, request: NewTransaction) -> Result<Transaction> {
        request.validate()?;
        let stored = self.store.add(request.into_transaction()).await?;
        info!(transaction_id = %stored.id, "Created transaction");
        Ok(stored)
    }

    /// Fetch one purchase.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(PurchaseError::TransactionNotFound(id))
    }

    /// Every stored purchase.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.store.get_all().await
    }

    /// Convert purchases into `target_currency`.
    pub async fn convert(
        &self,
        transaction_ids: &[TransactionId],
        target_currency: &str,
    ) -> Result<Vec<ConvertedTransaction>> {
        self.orchestrator
            .convert(transaction_ids, target_currency)
            .await
    }

    /// The underlying orchestrator.
    pub fn orchestrator(&self) -> &ConversionOrchestrator {
        &self.orchestrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTransactionStore;
    use chrono::NaiveDate;
    use purchase_fx::{ExchangeRateRecord, StaticRateSource};
    use rust_decimal_macros::dec;

    fn service(rates: Vec<ExchangeRateRecord>) -> PurchaseService {
        PurchaseService::new(
            Arc::new(InMemoryTransactionStore::new()),
            Arc::new(StaticRateSource::new(rates)),
            &ConverterConfig::default(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = service(vec![]);
        let created = service
            .create_transaction(NewTransaction::new("Groceries", date(2025, 7, 4), dec!(42.10)))
            .await
            .unwrap();

        let fetched = service.get_transaction(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(service.list_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid() {
        let service = service(vec![]);
        let result = service
            .create_transaction(NewTransaction::new("Refund", date(2025, 7, 4), dec!(-1)))
            .await;

        assert!(matches!(result, Err(PurchaseError::Validation { .. })));
        assert!(service.list_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let service = service(vec![]);
        let id = TransactionId::new();

        let err = service.get_transaction(id).await.unwrap_err();
        assert!(matches!(err, PurchaseError::TransactionNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_create_then_convert() {
        let service = service(vec![ExchangeRateRecord::new(
            "Euro Zone-Euro",
            dec!(0.92),
            date(2025, 6, 30),
        )]);
        let created = service
            .create_transaction(NewTransaction::new("Train", date(2025, 7, 4), dec!(33.33)))
            .await
            .unwrap();

        let results = service.convert(&[created.id], "Euro Zone-Euro").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].converted_amount, dec!(30.66));
    }
}
