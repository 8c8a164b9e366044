use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::ingestion::core::LedgerRecord;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Another delivery already inserted this id
    #[error("Ledger record already exists for message id {0}")]
    Conflict(String),

    #[error("Ledger record not found for message id {0}")]
    NotFound(String),

    #[error("Ledger storage failed: {0}")]
    Storage(#[source] sqlx::Error),
}

/// Durable record of every envelope id ever received
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn find(&self, message_id: &str) -> Result<Option<LedgerRecord>, LedgerError>;

    /// Insert a new record. Must fail with `LedgerError::Conflict` when a
    /// record with the same message id already exists.
    async fn insert(&self, record: &LedgerRecord) -> Result<(), LedgerError>;

    /// Atomically take the handler lease on an unprocessed record whose
    /// lease is absent or expired. `false` when someone else holds it or the
    /// record is already processed.
    async fn try_claim(&self, message_id: &str, until: DateTime<Utc>) -> Result<bool, LedgerError>;

    /// Give the lease back so the next redelivery can retry at once
    async fn release(&self, message_id: &str) -> Result<(), LedgerError>;

    /// Flip `processed` to true and drop the lease. Never reverses.
    async fn mark_processed(&self, message_id: &str) -> Result<(), LedgerError>;
}
