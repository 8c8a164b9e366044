// ============================================================================
// Ledger Stores - Dedup Ledger Persistence
// ============================================================================
//
// One trait, two backends. Both enforce uniqueness on the envelope id at
// insert time; a conflict there is the authoritative duplicate signal.
//
// ============================================================================

pub mod ledger_store;
pub mod memory;
pub mod postgres;

pub use ledger_store::{LedgerError, LedgerStore};
pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
