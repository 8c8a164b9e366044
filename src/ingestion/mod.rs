// ============================================================================
// Event Ingestion Infrastructure
// ============================================================================
//
// Receiving side of the hub integration: envelope types, the dedup ledger
// and the dispatcher that ties ledger, registry and handlers together.
// User-specific translation and handlers live in src/domain/
//
// ============================================================================

mod core;
mod dispatcher;
mod store;

pub use self::core::*;
pub use dispatcher::{DispatchError, DispatchOutcome, EventDispatcher};
pub use self::store::*;
