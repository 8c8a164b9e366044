use serde_json::Value;

use super::HandlerError;
use crate::domain::translation::to_registration_request;
use crate::domain::user::{RegistrationRequest, UserProjection, UserService};
use crate::ingestion::Envelope;
use crate::messaging::HubGateway;

// The sender always hears back: either user_created or user_rejected.

async fn register(
    users: &dyn UserService,
    envelope: &Envelope,
) -> Result<(UserProjection, RegistrationRequest), HandlerError> {
    let request = to_registration_request(envelope.topic(), &envelope.payload)?;
    let user = users.create_user(&request).await?;
    Ok((user, request))
}

pub(super) async fn handle(users: &dyn UserService, hub: &dyn HubGateway, envelope: &Envelope) -> bool {
    tracing::info!(
        message_id = %envelope.message_id,
        topic = %envelope.topic(),
        "Starting user registration from event"
    );

    match register(users, envelope).await {
        Ok((user, request)) => {
            tracing::info!(
                message_id = %envelope.message_id,
                user_id = user.user_id,
                "✅ User registered from event"
            );
            hub.notify_created(&user, &request.zones, &request.skills).await;
            true
        }
        Err(e) => {
            tracing::error!(
                message_id = %envelope.message_id,
                error = %e,
                retryable = e.is_retryable(),
                "User registration from event failed"
            );
            let email = envelope.payload.get("email").and_then(Value::as_str);
            hub.notify_rejected(email, &e.to_string()).await;
            false
        }
    }
}
