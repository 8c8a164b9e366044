use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::user::UserProjection;

// ============================================================================
// Hub Gateway - Outbound Side of the Hub Integration
// ============================================================================
//
// Fire-and-forget: callers never inspect the result. Implementations log
// their own failures.
//
// ============================================================================

#[async_trait]
pub trait HubGateway: Send + Sync {
    /// Acknowledge receipt of an inbound message
    async fn ack(&self, message_id: &str);

    async fn notify_created(&self, user: &UserProjection, zones: &[Value], skills: &[Value]);

    async fn notify_updated(&self, user: &UserProjection, zones: &[Value], skills: &[Value]);

    /// `email` is whatever the rejected payload carried, if anything
    async fn notify_rejected(&self, email: Option<&str>, reason: &str);

    async fn notify_deactivated(&self, user_id: i64);
}

/// Outbound notification kinds and where they are published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubChannel {
    UserCreated,
    UserUpdated,
    UserRejected,
    UserDeactivated,
}

impl HubChannel {
    pub fn channel(&self) -> &'static str {
        match self {
            HubChannel::UserCreated => "users.user.user_created",
            HubChannel::UserUpdated => "users.user.user_updated",
            HubChannel::UserRejected => "users.user.user_rejected",
            HubChannel::UserDeactivated => "users.user.user_deactivated",
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            HubChannel::UserCreated => "user_created",
            HubChannel::UserUpdated => "user_updated",
            HubChannel::UserRejected => "user_rejected",
            HubChannel::UserDeactivated => "user_deactivated",
        }
    }
}

/// Message shape the hub expects for published events
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub destination: OutboundDestination,
    pub payload: Value,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OutboundDestination {
    pub channel: String,
    pub event_name: String,
}

impl OutboundMessage {
    pub fn new(source: &str, channel: HubChannel, payload: Value) -> Self {
        Self::addressed(source, channel.channel(), channel.event_name(), payload)
    }

    pub fn addressed(source: &str, channel: &str, event_name: &str, payload: Value) -> Self {
        Self {
            message_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            source: source.to_string(),
            destination: OutboundDestination {
                channel: channel.to_string(),
                event_name: event_name.to_string(),
            },
            payload,
        }
    }
}

// ============================================================================
// Payload Builders
// ============================================================================

pub fn user_payload(user: &UserProjection, zones: &[Value], skills: &[Value]) -> Value {
    json!({
        "user": user,
        "zones": zones,
        "skills": skills,
    })
}

pub fn rejected_payload(email: Option<&str>, reason: &str) -> Value {
    json!({
        "message": format!("User rejected. Reason: {}", reason),
        "email": email,
    })
}

pub fn deactivated_payload(user_id: i64) -> Value {
    json!({ "userId": user_id })
}

pub const ACK_EVENT_NAME: &str = "ack";

pub fn ack_payload(message_id: &str, source: &str) -> Value {
    json!({
        "msgId": message_id,
        "source": source,
        "ackedAt": Utc::now(),
    })
}
