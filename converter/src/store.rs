//! Transaction storage.

use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info};

use purchase_common::{PurchaseError, Result, Transaction, TransactionId};

/// Storage collaborator for purchase transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persist a transaction and return the stored copy.
    async fn add(&self, transaction: Transaction) -> Result<Transaction>;

    /// Look up one transaction.
    async fn get_by_id(&self, id: TransactionId) -> Result<Option<Transaction>>;

    /// Every stored transaction.
    async fn get_all(&self) -> Result<Vec<Transaction>>;

    /// The transactions among `ids` that exist. Missing ids are skipped.
    async fn get_by_ids(&self, ids: &[TransactionId]) -> Result<Vec<Transaction>>;
}

/// In-process transaction store.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    transactions: DashMap<TransactionId, Transaction>,
}

impl InMemoryTransactionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `transactions`.
    pub fn with_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let store = Self::new();
        for transaction in transactions {
            store.transactions.insert(transaction.id, transaction);
        }
        store
    }

    /// Seed a store from a JSON array of transactions.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PurchaseError::StorageError(format!("{}: {}", path.display(), e)))?;
        let transactions: Vec<Transaction> = serde_json::from_str(&text)
            .map_err(|e| PurchaseError::StorageError(format!("{}: {}", path.display(), e)))?;

        info!(
            path = %path.display(),
            count = transactions.len(),
            "Loaded transactions"
        );

        Ok(Self::with_transactions(transactions))
    }

    /// Number of stored transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn add(&self, transaction: Transaction) -> Result<Transaction> {
        if self.transactions.contains_key(&transaction.id) {
            return Err(PurchaseError::StorageError(format!(
                "Transaction {} already exists",
                transaction.id
            )));
        }
        self.transactions.insert(transaction.id, transaction.clone());
        debug!(transaction_id = %transaction.id, "Stored transaction");
        Ok(transaction)
    }

    async fn get_by_id(&self, id: TransactionId) -> Result<Option<Transaction>> {
        Ok(self.transactions.get(&id).map(|t| t.clone()))
    }

    async fn get_all(&self) -> Result<Vec<Transaction>> {
        let mut all: Vec<Transaction> = self.transactions.iter().map(|t| t.clone()).collect();
        all.sort_by_key(|t| t.id);
        Ok(all)
    }

    async fn get_by_ids(&self, ids: &[TransactionId]) -> Result<Vec<Transaction>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.transactions.get(id).map(|t| t.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use purchase_common::NewTransaction;
    use rust_decimal_macros::dec;

    fn sample(description: &str) -> Transaction {
        NewTransaction::new(
            description,
            NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            dec!(10.50),
        )
        .into_transaction()
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let store = InMemoryTransactionStore::new();
        let txn = store.add(sample("Lunch")).await.unwrap();

        let fetched = store.get_by_id(txn.id).await.unwrap();
        assert_eq!(fetched, Some(txn.clone()));
        assert!(store.add(txn).await.is_err());
    }

    #[tokio::test]
    async fn test_get_by_ids_skips_missing() {
        let a = sample("A");
        let b = sample("B");
        let store = InMemoryTransactionStore::with_transactions(vec![a.clone(), b.clone()]);

        let found = store
            .get_by_ids(&[b.id, TransactionId::new(), a.id])
            .await
            .unwrap();

        assert_eq!(found, vec![b, a]);
    }

    #[tokio::test]
    async fn test_get_all() {
        let store = InMemoryTransactionStore::with_transactions(vec![sample("A"), sample("B")]);
        assert_eq!(store.get_all().await.unwrap().len(), 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_from_json_file_missing() {
        let result = InMemoryTransactionStore::from_json_file("/nonexistent/transactions.json").await;
        assert!(matches!(result, Err(PurchaseError::StorageError(_))));
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let txn = sample("Books");
        let path = std::env::temp_dir().join(format!("purchase-store-{}.json", txn.id));
        tokio::fs::write(&path, serde_json::to_string(&vec![txn.clone()]).unwrap())
            .await
            .unwrap();

        let store = InMemoryTransactionStore::from_json_file(&path).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(store.get_by_id(txn.id).await.unwrap(), Some(txn));
    }
}
