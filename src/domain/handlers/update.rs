use super::HandlerError;
use crate::domain::translation::to_update_request;
use crate::domain::user::{UpdateRequest, UserProjection, UserService};
use crate::ingestion::Envelope;
use crate::messaging::HubGateway;

// Unlike registration, a failed update is not compensated with a
// notification; the sender only sees the failed delivery.

async fn update(
    users: &dyn UserService,
    envelope: &Envelope,
) -> Result<(UserProjection, UpdateRequest), HandlerError> {
    let request = to_update_request(envelope.topic(), &envelope.payload)?;
    let user = users.apply_partial_update(&request).await?;
    Ok((user, request))
}

pub(super) async fn handle(users: &dyn UserService, hub: &dyn HubGateway, envelope: &Envelope) -> bool {
    tracing::info!(message_id = %envelope.message_id, "Starting user update from event");

    match update(users, envelope).await {
        Ok((user, request)) => {
            hub.notify_updated(&user, &request.zones, &request.skills).await;
            true
        }
        Err(e) => {
            tracing::error!(
                message_id = %envelope.message_id,
                error = %e,
                retryable = e.is_retryable(),
                "User update from event failed"
            );
            false
        }
    }
}
