use super::HandlerError;
use crate::domain::translation::deactivation_target;
use crate::domain::user::UserService;
use crate::ingestion::Envelope;
use crate::messaging::HubGateway;

// Deactivating an already inactive user is a failure, not a no-op.

async fn deactivate(users: &dyn UserService, envelope: &Envelope) -> Result<i64, HandlerError> {
    let user_id = deactivation_target(&envelope.payload)?;
    users.deactivate_user(user_id).await?;
    Ok(user_id)
}

pub(super) async fn handle(users: &dyn UserService, hub: &dyn HubGateway, envelope: &Envelope) -> bool {
    tracing::info!(message_id = %envelope.message_id, "Starting user deactivation from event");

    match deactivate(users, envelope).await {
        Ok(user_id) => {
            hub.notify_deactivated(user_id).await;
            true
        }
        Err(e) => {
            tracing::error!(
                message_id = %envelope.message_id,
                error = %e,
                retryable = e.is_retryable(),
                "An error occurred while deactivating user from event"
            );
            false
        }
    }
}
