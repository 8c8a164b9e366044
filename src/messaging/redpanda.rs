use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use serde_json::Value;

use super::hub::{
    ack_payload, deactivated_payload, rejected_payload, user_payload, HubChannel, HubGateway,
    OutboundMessage, ACK_EVENT_NAME,
};
use crate::domain::user::UserProjection;
use crate::metrics::Metrics;
use crate::utils::{retry_on_transient, Backoff, BreakerError, BreakerSettings, CircuitBreaker, IsTransient};

// ============================================================================
// Redpanda Hub Gateway
// ============================================================================
//
// Publishes hub messages as JSON to a Kafka-compatible broker. Channel name is
// the topic, the outbound message id is the key. Each publish goes through
// transient-failure retry inside the circuit breaker, so one logical publish
// counts as a single breaker success or failure.
//
// ============================================================================

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Hub publisher circuit is open")]
    CircuitOpen,

    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Failed to serialize hub message: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IsTransient for HubError {
    fn is_transient(&self) -> bool {
        match self {
            HubError::Kafka(KafkaError::MessageProduction(code)) => !matches!(
                code,
                RDKafkaErrorCode::MessageSizeTooLarge
                    | RDKafkaErrorCode::InvalidMessage
                    | RDKafkaErrorCode::TopicAuthorizationFailed
                    | RDKafkaErrorCode::UnknownTopicOrPartition
            ),
            HubError::Kafka(_) => true,
            HubError::CircuitOpen | HubError::Serialization(_) => false,
        }
    }
}

pub struct RedpandaHubGateway {
    producer: FutureProducer,
    source: String,
    ack_topic: String,
    breaker: CircuitBreaker,
    backoff: Backoff,
    metrics: Arc<Metrics>,
}

impl RedpandaHubGateway {
    pub fn new(
        brokers: &str,
        source: impl Into<String>,
        ack_topic: impl Into<String>,
        metrics: Arc<Metrics>,
    ) -> Result<Self, HubError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        let breaker_settings = BreakerSettings {
            close_after: 3,
            ..BreakerSettings::default()
        };

        Ok(Self {
            producer,
            source: source.into(),
            ack_topic: ack_topic.into(),
            breaker: CircuitBreaker::new("hub_publisher", breaker_settings),
            backoff: Backoff::default(),
            metrics,
        })
    }

    async fn send(&self, topic: &str, key: &str, body: &str) -> Result<(), HubError> {
        let outcome = self
            .breaker
            .call(retry_on_transient(&self.backoff, |attempt| async move {
                tracing::debug!(topic = %topic, attempt, "Publishing to hub");
                self.producer
                    .send(
                        FutureRecord::to(topic).key(key).payload(body),
                        Timeout::After(SEND_TIMEOUT),
                    )
                    .await
                    .map(|_| ())
                    .map_err(|(e, _)| HubError::Kafka(e))
            }))
            .await;

        self.metrics
            .set_breaker_state(self.breaker.state().await.gauge_value());

        outcome.map_err(|e| match e {
            BreakerError::Open(_) => HubError::CircuitOpen,
            BreakerError::Inner(e) => e,
        })
    }

    /// Serialize and publish; failures are logged and counted, never returned
    async fn publish(&self, topic: &str, message: OutboundMessage) {
        let key = message.message_id.to_string();
        let result = match serde_json::to_string(&message) {
            Ok(body) => self.send(topic, &key, &body).await,
            Err(e) => Err(HubError::from(e)),
        };

        self.metrics.record_notification(topic, result.is_ok());
        match result {
            Ok(()) => tracing::info!(
                topic = %topic,
                hub_message_id = %key,
                event_name = %message.destination.event_name,
                "📤 Published to hub"
            ),
            Err(e) => tracing::error!(
                topic = %topic,
                hub_message_id = %key,
                error = %e,
                "Failed to publish to hub"
            ),
        }
    }

    async fn notify(&self, channel: HubChannel, payload: Value) {
        let message = OutboundMessage::new(&self.source, channel, payload);
        self.publish(channel.channel(), message).await;
    }
}

#[async_trait]
impl HubGateway for RedpandaHubGateway {
    async fn ack(&self, message_id: &str) {
        let payload = ack_payload(message_id, &self.source);
        let message =
            OutboundMessage::addressed(&self.source, &self.ack_topic, ACK_EVENT_NAME, payload);
        self.publish(&self.ack_topic, message).await;
    }

    async fn notify_created(&self, user: &UserProjection, zones: &[Value], skills: &[Value]) {
        self.notify(HubChannel::UserCreated, user_payload(user, zones, skills))
            .await;
    }

    async fn notify_updated(&self, user: &UserProjection, zones: &[Value], skills: &[Value]) {
        self.notify(HubChannel::UserUpdated, user_payload(user, zones, skills))
            .await;
    }

    async fn notify_rejected(&self, email: Option<&str>, reason: &str) {
        self.notify(HubChannel::UserRejected, rejected_payload(email, reason))
            .await;
    }

    async fn notify_deactivated(&self, user_id: i64) {
        self.notify(HubChannel::UserDeactivated, deactivated_payload(user_id))
            .await;
    }
}
