use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::core::{Envelope, LedgerRecord};
use super::store::{LedgerError, LedgerStore};
use crate::domain::handlers::{EventHandlers, HandlerKind, HandlerRegistry, RoutingError};
use crate::domain::user::UserService;
use crate::messaging::HubGateway;

// ============================================================================
// Event Dispatcher - Ledger-Guarded Handler Invocation
// ============================================================================
//
// Per delivery:
//   1. resolve the handler kind (unknown name fails before any ledger I/O)
//   2. look the envelope id up in the ledger
//      - absent            -> insert provisional record holding the lease, run handler
//      - processed = false -> take the lease, run handler again
//                             (lease held elsewhere -> in flight, skip)
//      - processed = true  -> duplicate of a completed delivery, skip
//   3. on handler success flip the record to processed, on failure give the
//      lease back
//
// The insert and the lease are the authoritative duplicate checks: a
// concurrent delivery that loses the insert race, or arrives while another
// delivery is still inside the handler, is skipped whatever the earlier
// lookup said. A worker that dies mid-handler leaves a lease that expires
// after `claim_lease`, after which redelivery retries. Handlers run
// at-least-once per id until one succeeds, so the domain operations must
// tolerate being retried.
//
// ============================================================================

/// Result of one delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handler completed and the ledger record is now processed
    Processed,
    /// Id already fully processed, or a concurrent delivery owns it
    Duplicate,
    /// Handler ran and failed; record stays unprocessed for a retry
    HandlerFailed,
    /// Could not read or write the ledger; no handler was invoked
    NotPersisted,
}

impl DispatchOutcome {
    /// Whether this delivery fully processed the event
    pub fn is_processed(&self) -> bool {
        matches!(self, DispatchOutcome::Processed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Processed => "processed",
            DispatchOutcome::Duplicate => "duplicate",
            DispatchOutcome::HandlerFailed => "handler_failed",
            DispatchOutcome::NotPersisted => "not_persisted",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The handler's effects are applied but the record is still unprocessed
    #[error("Event {message_id} was handled but could not be marked processed: {source}")]
    MarkProcessed {
        message_id: String,
        #[source]
        source: LedgerError,
    },
}

/// How long a delivery may sit inside a handler before others may take over
pub const DEFAULT_CLAIM_LEASE: Duration = Duration::from_secs(300);

pub struct EventDispatcher {
    ledger: Arc<dyn LedgerStore>,
    registry: HandlerRegistry,
    handlers: EventHandlers,
    claim_lease: Duration,
}

impl EventDispatcher {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        registry: HandlerRegistry,
        users: Arc<dyn UserService>,
        hub: Arc<dyn HubGateway>,
    ) -> Self {
        Self {
            ledger,
            registry,
            handlers: EventHandlers::new(users, hub),
            claim_lease: DEFAULT_CLAIM_LEASE,
        }
    }

    pub fn with_claim_lease(mut self, lease: Duration) -> Self {
        self.claim_lease = lease;
        self
    }

    fn lease_deadline(&self) -> DateTime<Utc> {
        let lease = chrono::Duration::from_std(self.claim_lease)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_CLAIM_LEASE.as_secs() as i64));
        Utc::now() + lease
    }

    pub async fn dispatch(&self, envelope: &Envelope) -> Result<DispatchOutcome, DispatchError> {
        let message_id = envelope.message_id.as_str();

        let kind = self.registry.resolve(envelope.event_name())?;
        tracing::debug!(
            message_id = %message_id,
            event_name = %envelope.event_name(),
            handler = kind.as_str(),
            "Resolved handler"
        );

        let existing = match self.ledger.find(message_id).await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::error!(message_id = %message_id, error = %e, "Ledger lookup failed");
                return Ok(DispatchOutcome::NotPersisted);
            }
        };

        match existing {
            None => {
                tracing::info!(message_id = %message_id, "Starting event processing");
                if let Some(outcome) = self.record_first_sighting(envelope).await {
                    return Ok(outcome);
                }
                self.run_handler(kind, envelope).await
            }
            Some(record) if record.processed => {
                tracing::info!(
                    message_id = %message_id,
                    "Received duplicated event. Skipping processing"
                );
                Ok(DispatchOutcome::Duplicate)
            }
            Some(_) => match self.ledger.try_claim(message_id, self.lease_deadline()).await {
                Ok(true) => {
                    tracing::info!(
                        message_id = %message_id,
                        "Received duplicated event not yet processed. Retrying handler"
                    );
                    self.run_handler(kind, envelope).await
                }
                Ok(false) => {
                    tracing::info!(
                        message_id = %message_id,
                        "Event is being processed by another delivery. Skipping processing"
                    );
                    Ok(DispatchOutcome::Duplicate)
                }
                Err(e) => {
                    tracing::error!(message_id = %message_id, error = %e, "Failed to claim event");
                    Ok(DispatchOutcome::NotPersisted)
                }
            },
        }
    }

    /// Insert the provisional record. `Some(outcome)` means stop here.
    async fn record_first_sighting(&self, envelope: &Envelope) -> Option<DispatchOutcome> {
        let message_id = envelope.message_id.as_str();

        let record = match LedgerRecord::provisional(envelope) {
            Ok(record) => record.claimed(self.lease_deadline()),
            Err(e) => {
                tracing::error!(
                    message_id = %message_id,
                    error = %e,
                    "An error occurred while serializing incoming event payload"
                );
                return Some(DispatchOutcome::NotPersisted);
            }
        };

        match self.ledger.insert(&record).await {
            Ok(()) => {
                tracing::info!(message_id = %message_id, "Saved incoming event");
                None
            }
            Err(LedgerError::Conflict(_)) => {
                tracing::warn!(
                    message_id = %message_id,
                    "Concurrent delivery already recorded this event. Skipping processing"
                );
                Some(DispatchOutcome::Duplicate)
            }
            Err(e) => {
                tracing::error!(
                    message_id = %message_id,
                    error = %e,
                    "An error occurred while saving incoming event"
                );
                Some(DispatchOutcome::NotPersisted)
            }
        }
    }

    async fn run_handler(
        &self,
        kind: HandlerKind,
        envelope: &Envelope,
    ) -> Result<DispatchOutcome, DispatchError> {
        let message_id = envelope.message_id.as_str();

        if !self.handlers.run(kind, envelope).await {
            tracing::warn!(
                message_id = %message_id,
                handler = kind.as_str(),
                "Handler failed. Event left unprocessed for redelivery"
            );
            self.release_claim(message_id).await;
            return Ok(DispatchOutcome::HandlerFailed);
        }

        if let Err(source) = self.ledger.mark_processed(message_id).await {
            self.release_claim(message_id).await;
            return Err(DispatchError::MarkProcessed {
                message_id: message_id.to_string(),
                source,
            });
        }

        tracing::info!(message_id = %message_id, handler = kind.as_str(), "✅ Event processed");
        Ok(DispatchOutcome::Processed)
    }

    /// A lease that cannot be released still expires on its own
    async fn release_claim(&self, message_id: &str) {
        if let Err(e) = self.ledger.release(message_id).await {
            tracing::warn!(message_id = %message_id, error = %e, "Failed to release event claim");
        }
    }
}
