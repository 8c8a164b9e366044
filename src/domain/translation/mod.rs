// ============================================================================
// Payload Translation
// ============================================================================
//
// Normalizes topic-specific payloads into the canonical requests:
// - search:  payload already is the canonical shape
// - catalog: localized field names, flattened address, implied role
//
// Unknown topics never fall back to either shape.
//
// ============================================================================

mod catalog;
mod errors;
mod fields;
mod search;
mod topic;
mod translator;

pub use errors::TranslationError;
pub use topic::Topic;
pub use translator::{deactivation_target, to_registration_request, to_update_request};
