// ============================================================================
// User Domain Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Email is already registered: {0}")]
    EmailAlreadyRegistered(String),

    #[error("User {0} not found")]
    NotFound(i64),

    #[error("Cannot deactivate an inactive user. User id: {0}")]
    AlreadyInactive(i64),

    #[error("Invalid user data: {0}")]
    Invalid(String),

    #[error("User storage failed: {0}")]
    Storage(#[from] sqlx::Error),
}
