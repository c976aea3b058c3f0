//! Chunked transaction retrieval.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use purchase_common::{Result, Transaction, TransactionId};

use crate::store::TransactionStore;

/// Loads transactions in fixed-size chunks so no single storage query grows
/// with the caller's id list.
pub struct BatchLoader {
    store: Arc<dyn TransactionStore>,
    batch_size: usize,
}

impl BatchLoader {
    /// Create a loader. A `batch_size` of 0 is treated as 1.
    pub fn new(store: Arc<dyn TransactionStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Fetch every transaction among `ids` that exists, one chunk at a time.
    ///
    /// Repeated ids are looked up once.
    pub async fn load_all(&self, ids: &[TransactionId]) -> Result<Vec<Transaction>> {
        let mut seen = HashSet::with_capacity(ids.len());
        let unique: Vec<TransactionId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let mut transactions = Vec::with_capacity(unique.len());
        for chunk in unique.chunks(self.batch_size) {
            debug!(batch_size = chunk.len(), "Fetching batch of transactions");
            let found = self.store.get_by_ids(chunk).await?;
            transactions.extend(found);
        }

        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTransactionStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use parking_lot::Mutex;
    use purchase_common::{NewTransaction, PurchaseError};
    use rust_decimal_macros::dec;

    /// Wraps a store and records the size of every `get_by_ids` call.
    struct CountingStore {
        inner: InMemoryTransactionStore,
        calls: Mutex<Vec<usize>>,
        fail: bool,
    }

    impl CountingStore {
        fn new(inner: InMemoryTransactionStore) -> Self {
            Self {
                inner,
                calls: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl TransactionStore for CountingStore {
        async fn add(&self, transaction: Transaction) -> Result<Transaction> {
            self.inner.add(transaction).await
        }

        async fn get_by_id(&self, id: TransactionId) -> Result<Option<Transaction>> {
            self.inner.get_by_id(id).await
        }

        async fn get_all(&self) -> Result<Vec<Transaction>> {
            self.inner.get_all().await
        }

        async fn get_by_ids(&self, ids: &[TransactionId]) -> Result<Vec<Transaction>> {
            self.calls.lock().push(ids.len());
            if self.fail {
                return Err(PurchaseError::StorageError("connection reset".to_string()));
            }
            self.inner.get_by_ids(ids).await
        }
    }

    fn transactions(n: usize) -> Vec<Transaction> {
        (0..n)
            .map(|i| {
                NewTransaction::new(
                    format!("Purchase {}", i),
                    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                    dec!(1),
                )
                .into_transaction()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_chunks_by_batch_size() {
        let txns = transactions(2500);
        let ids: Vec<TransactionId> = txns.iter().map(|t| t.id).collect();
        let store = Arc::new(CountingStore::new(InMemoryTransactionStore::with_transactions(txns)));

        let loader = BatchLoader::new(store.clone(), 1000);
        let loaded = loader.load_all(&ids).await.unwrap();

        assert_eq!(loaded.len(), 2500);
        assert_eq!(*store.calls.lock(), vec![1000, 1000, 500]);
    }

    #[tokio::test]
    async fn test_missing_ids_omitted() {
        let txns = transactions(3);
        let mut ids: Vec<TransactionId> = txns.iter().map(|t| t.id).collect();
        ids.push(TransactionId::new());
        let store = Arc::new(InMemoryTransactionStore::with_transactions(txns));

        let loaded = BatchLoader::new(store, 2).load_all(&ids).await.unwrap();
        assert_eq!(loaded.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_ids_loaded_once() {
        let txns = transactions(2);
        let ids = vec![txns[0].id, txns[1].id, txns[0].id];
        let store = Arc::new(CountingStore::new(InMemoryTransactionStore::with_transactions(txns)));

        let loaded = BatchLoader::new(store.clone(), 2).load_all(&ids).await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(*store.calls.lock(), vec![2]);
    }

    #[tokio::test]
    async fn test_empty_ids_no_calls() {
        let store = Arc::new(CountingStore::new(InMemoryTransactionStore::new()));
        let loaded = BatchLoader::new(store.clone(), 1000).load_all(&[]).await.unwrap();

        assert!(loaded.is_empty());
        assert!(store.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let mut store = CountingStore::new(InMemoryTransactionStore::new());
        store.fail = true;

        let result = BatchLoader::new(Arc::new(store), 10)
            .load_all(&[TransactionId::new()])
            .await;
        assert!(matches!(result, Err(PurchaseError::StorageError(_))));
    }
}
