use async_trait::async_trait;

use super::errors::UserError;
use super::requests::{RegistrationRequest, UpdateRequest};
use super::value_objects::UserProjection;

/// Domain operations the event handlers call into.
///
/// Implementations are expected to guard against duplicate mutation on
/// their own (existing email, already inactive user), because a ledger
/// record left unprocessed is retried from scratch on redelivery.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Fails on duplicate email or invalid data
    async fn create_user(&self, request: &RegistrationRequest) -> Result<UserProjection, UserError>;

    /// Fails when the target does not exist or the new email is taken
    async fn apply_partial_update(&self, request: &UpdateRequest) -> Result<UserProjection, UserError>;

    /// Fails when the user does not exist or is already inactive
    async fn deactivate_user(&self, user_id: i64) -> Result<(), UserError>;
}
