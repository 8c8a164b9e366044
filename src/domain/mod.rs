// ============================================================================
// Domain Layer - User Events
// ============================================================================
//
// - user/        canonical requests, projection, the UserService seam
// - translation/ topic-specific payloads -> canonical requests
// - handlers/    event-name registry and the register/update/deactivate handlers
//
// Independent of how envelopes are received or deduplicated.
//
// ============================================================================

pub mod handlers;
pub mod translation;
pub mod user;
