use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Envelope - Inbound Hub Message
// ============================================================================
//
// Wire shape posted by the hub:
//
//   {
//     "messageId": "...",
//     "timestamp": "<ISO-8601>",
//     "destination": { "topic": "...", "eventName": "..." },
//     "payload": { ... }
//   }
//
// Handed around by reference once received; nothing in the pipeline
// mutates it.
//
// ============================================================================

/// Free-form event payload as sent by the hub.
pub type Payload = Map<String, Value>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Sender-assigned id, unique per business event
    pub message_id: String,
    pub timestamp: DateTime<Utc>,

    /// Producing module, when the hub includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub destination: Destination,

    #[serde(default)]
    pub payload: Payload,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub topic: String,
    pub event_name: String,
}

impl Envelope {
    pub fn new(
        message_id: impl Into<String>,
        topic: impl Into<String>,
        event_name: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            timestamp: Utc::now(),
            source: None,
            destination: Destination {
                topic: topic.into(),
                event_name: event_name.into(),
            },
            payload,
        }
    }

    pub fn topic(&self) -> &str {
        &self.destination.topic
    }

    pub fn event_name(&self) -> &str {
        &self.destination.event_name
    }

    /// Payload rendered as JSON text for the ledger
    pub fn payload_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.payload)
    }
}
