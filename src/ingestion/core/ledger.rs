use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::envelope::Envelope;

// ============================================================================
// Ledger Record - One Row per Envelope Id, Forever
// ============================================================================
//
// Lifecycle:
// - created with processed = false the first time an id is seen
// - flipped to processed = true once, after a handler succeeds
// - never deleted; doubles as the delivery audit log
//
// `claimed_until` is a lease held by the delivery currently running the
// handler. Other deliveries of the same id skip while it is in the future;
// an expired lease (crashed worker) can be taken over.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct LedgerRecord {
    pub message_id: String,
    pub topic: String,
    pub event_name: String,
    pub timestamp: DateTime<Utc>,
    /// Envelope payload as JSON text
    pub payload: String,
    pub received_at: DateTime<Utc>,
    pub processed: bool,
    pub claimed_until: Option<DateTime<Utc>>,
}

impl LedgerRecord {
    /// Provisional record for a first sighting
    pub fn provisional(envelope: &Envelope) -> serde_json::Result<Self> {
        Ok(Self {
            message_id: envelope.message_id.clone(),
            topic: envelope.topic().to_string(),
            event_name: envelope.event_name().to_string(),
            timestamp: envelope.timestamp,
            payload: envelope.payload_json()?,
            received_at: Utc::now(),
            processed: false,
            claimed_until: None,
        })
    }

    /// Same record, inserted already holding the handler lease
    pub fn claimed(mut self, until: DateTime<Utc>) -> Self {
        self.claimed_until = Some(until);
        self
    }

    /// Whether a delivery at `now` may take the handler lease
    pub fn is_claimable(&self, now: DateTime<Utc>) -> bool {
        !self.processed && self.claimed_until.map_or(true, |until| until <= now)
    }

    /// Only transition allowed after creation; also drops any lease
    pub fn mark_processed(&mut self) {
        self.processed = true;
        self.claimed_until = None;
    }
}
