// ============================================================================
// Ingestion Core - Wire and Ledger Types
// ============================================================================

pub mod envelope;
pub mod ledger;

pub use envelope::{Destination, Envelope, Payload};
pub use ledger::LedgerRecord;
