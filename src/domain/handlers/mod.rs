// ============================================================================
// Event Handlers
// ============================================================================
//
// Event name -> HandlerKind via a fixed table (registry.rs), then one of:
// - register:   create user, notify created or rejected
// - update:     partial update, notify updated (no compensation on failure)
// - deactivate: deactivate user, notify deactivated
//
// Handlers swallow their own errors and report a plain success flag; the
// dispatcher only needs to know whether to flip the ledger record.
//
// ============================================================================

mod deactivate;
mod register;
mod registry;
mod update;

use std::sync::Arc;

pub use registry::{HandlerKind, HandlerRegistry, RoutingError};

use super::translation::TranslationError;
use super::user::{UserError, UserService};
use crate::ingestion::Envelope;
use crate::messaging::HubGateway;

#[derive(Debug, thiserror::Error)]
pub(crate) enum HandlerError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Domain(#[from] UserError),
}

impl HandlerError {
    /// False when redelivering the same payload cannot succeed
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            HandlerError::Translation(e) => e.is_retryable(),
            HandlerError::Domain(_) => true,
        }
    }
}

/// Collaborators every handler runs against
#[derive(Clone)]
pub struct EventHandlers {
    users: Arc<dyn UserService>,
    hub: Arc<dyn HubGateway>,
}

impl EventHandlers {
    pub fn new(users: Arc<dyn UserService>, hub: Arc<dyn HubGateway>) -> Self {
        Self { users, hub }
    }

    /// Run the handler of the given kind. `true` only when the domain
    /// operation completed.
    pub async fn run(&self, kind: HandlerKind, envelope: &Envelope) -> bool {
        let (users, hub) = (self.users.as_ref(), self.hub.as_ref());
        match kind {
            HandlerKind::Register => register::handle(users, hub, envelope).await,
            HandlerKind::Update => update::handle(users, hub, envelope).await,
            HandlerKind::Deactivate => deactivate::handle(users, hub, envelope).await,
        }
    }
}
