use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::ledger_store::{LedgerError, LedgerStore};
use crate::ingestion::core::LedgerRecord;

// ============================================================================
// PostgreSQL Ledger Store
// ============================================================================
//
// Table `incoming_events` (see migrations/). `message_id` carries a UNIQUE
// constraint so two racing first deliveries cannot both insert; the loser
// gets SQLSTATE 23505 which is surfaced as LedgerError::Conflict.
//
// The handler lease lives in `claimed_until` and is taken with a single
// conditional UPDATE, so at most one delivery wins it.
//
// ============================================================================

#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations mean another delivery inserted the same id first
fn classify_insert_error(message_id: &str, error: sqlx::Error) -> LedgerError {
    match error {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            LedgerError::Conflict(message_id.to_string())
        }
        other => LedgerError::Storage(other),
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn find(&self, message_id: &str) -> Result<Option<LedgerRecord>, LedgerError> {
        let record = sqlx::query_as::<_, LedgerRecord>(
            r#"SELECT message_id, topic, event_name, "timestamp", payload, received_at,
                      processed, claimed_until
               FROM incoming_events
               WHERE message_id = $1"#,
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LedgerError::Storage)?;

        tracing::debug!(
            message_id = %message_id,
            found = record.is_some(),
            "Ledger lookup"
        );

        Ok(record)
    }

    async fn insert(&self, record: &LedgerRecord) -> Result<(), LedgerError> {
        sqlx::query(
            r#"INSERT INTO incoming_events
                   (message_id, topic, event_name, "timestamp", payload, received_at,
                    processed, claimed_until)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(&record.message_id)
        .bind(&record.topic)
        .bind(&record.event_name)
        .bind(record.timestamp)
        .bind(&record.payload)
        .bind(record.received_at)
        .bind(record.processed)
        .bind(record.claimed_until)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_insert_error(&record.message_id, e))?;

        Ok(())
    }

    async fn try_claim(&self, message_id: &str, until: DateTime<Utc>) -> Result<bool, LedgerError> {
        let result = sqlx::query(
            "UPDATE incoming_events SET claimed_until = $2
             WHERE message_id = $1
               AND NOT processed
               AND (claimed_until IS NULL OR claimed_until <= now())",
        )
        .bind(message_id)
        .bind(until)
        .execute(&self.pool)
        .await
        .map_err(LedgerError::Storage)?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, message_id: &str) -> Result<(), LedgerError> {
        sqlx::query("UPDATE incoming_events SET claimed_until = NULL WHERE message_id = $1")
            .bind(message_id)
            .execute(&self.pool)
            .await
            .map_err(LedgerError::Storage)?;

        Ok(())
    }

    async fn mark_processed(&self, message_id: &str) -> Result<(), LedgerError> {
        let result = sqlx::query(
            "UPDATE incoming_events SET processed = TRUE, claimed_until = NULL WHERE message_id = $1",
        )
        .bind(message_id)
        .execute(&self.pool)
        .await
        .map_err(LedgerError::Storage)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::NotFound(message_id.to_string()));
        }

        Ok(())
    }
}
