use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::ledger_store::{LedgerError, LedgerStore};
use crate::ingestion::core::LedgerRecord;

/// Process-local ledger. Same uniqueness contract as the Postgres store,
/// but nothing survives a restart. Meant for local runs and tests.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    records: RwLock<HashMap<String, LedgerRecord>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn find(&self, message_id: &str) -> Result<Option<LedgerRecord>, LedgerError> {
        Ok(self.records.read().await.get(message_id).cloned())
    }

    async fn insert(&self, record: &LedgerRecord) -> Result<(), LedgerError> {
        let mut records = self.records.write().await;
        match records.entry(record.message_id.clone()) {
            Entry::Occupied(_) => Err(LedgerError::Conflict(record.message_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn try_claim(&self, message_id: &str, until: DateTime<Utc>) -> Result<bool, LedgerError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(message_id)
            .ok_or_else(|| LedgerError::NotFound(message_id.to_string()))?;

        if !record.is_claimable(Utc::now()) {
            return Ok(false);
        }
        record.claimed_until = Some(until);
        Ok(true)
    }

    async fn release(&self, message_id: &str) -> Result<(), LedgerError> {
        if let Some(record) = self.records.write().await.get_mut(message_id) {
            record.claimed_until = None;
        }
        Ok(())
    }

    async fn mark_processed(&self, message_id: &str) -> Result<(), LedgerError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(message_id)
            .ok_or_else(|| LedgerError::NotFound(message_id.to_string()))?;
        record.mark_processed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::core::Envelope;

    fn record(id: &str) -> LedgerRecord {
        let envelope = Envelope::new(id, "search", "solicitado", Default::default());
        LedgerRecord::provisional(&envelope).unwrap()
    }

    #[tokio::test]
    async fn test_second_insert_of_same_id_conflicts() {
        let store = InMemoryLedgerStore::new();

        store.insert(&record("dup")).await.unwrap();
        let err = store.insert(&record("dup")).await.unwrap_err();

        assert!(matches!(err, LedgerError::Conflict(id) if id == "dup"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_mark_processed_updates_existing_record() {
        let store = InMemoryLedgerStore::new();
        store.insert(&record("m-1")).await.unwrap();

        store.mark_processed("m-1").await.unwrap();

        let stored = store.find("m-1").await.unwrap().unwrap();
        assert!(stored.processed);
    }

    #[tokio::test]
    async fn test_mark_processed_unknown_id_fails() {
        let store = InMemoryLedgerStore::new();
        let err = store.mark_processed("ghost").await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_claim_is_exclusive_until_released() {
        let store = InMemoryLedgerStore::new();
        store.insert(&record("m-2")).await.unwrap();
        let until = Utc::now() + chrono::Duration::minutes(5);

        assert!(store.try_claim("m-2", until).await.unwrap());
        assert!(!store.try_claim("m-2", until).await.unwrap());

        store.release("m-2").await.unwrap();
        assert!(store.try_claim("m-2", until).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_claim_can_be_taken_over() {
        let store = InMemoryLedgerStore::new();
        let stale = record("m-3").claimed(Utc::now() - chrono::Duration::seconds(1));
        store.insert(&stale).await.unwrap();

        let until = Utc::now() + chrono::Duration::minutes(5);
        assert!(store.try_claim("m-3", until).await.unwrap());
    }

    #[tokio::test]
    async fn test_processed_record_cannot_be_claimed() {
        let store = InMemoryLedgerStore::new();
        store.insert(&record("m-4")).await.unwrap();
        store.mark_processed("m-4").await.unwrap();

        let until = Utc::now() + chrono::Duration::minutes(5);
        assert!(!store.try_claim("m-4", until).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_admit_exactly_one() {
        let store = std::sync::Arc::new(InMemoryLedgerStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(&record("race")).await.is_ok() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
    }
}
