use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::{web, HttpResponse, Responder};

use crate::ingestion::{Envelope, EventDispatcher};
use crate::messaging::HubGateway;
use crate::metrics::Metrics;

// ============================================================================
// Inbound Webhook
// ============================================================================
//
// One delivery per request, dispatched inline. The hub only learns the
// result from the status code and text body:
//   200 "Event <id> processed successfully"
//   500 "An error occurred while processing event <id>"
// Every delivery is acknowledged to the hub once dispatch returns. The ack
// is bounded by `ack_timeout`; a slow broker never holds the response.
//
// ============================================================================

pub struct WebhookState {
    pub dispatcher: EventDispatcher,
    pub hub: Arc<dyn HubGateway>,
    pub metrics: Arc<Metrics>,
    pub ack_timeout: Duration,
}

pub async fn receive_event(
    state: web::Data<WebhookState>,
    envelope: web::Json<Envelope>,
) -> impl Responder {
    let envelope = envelope.into_inner();
    let message_id = envelope.message_id.clone();

    tracing::info!(
        message_id = %message_id,
        topic = %envelope.topic(),
        event_name = %envelope.event_name(),
        "📥 Received event from hub"
    );
    state.metrics.record_received(envelope.event_name());

    let started = Instant::now();
    let outcome = state.dispatcher.dispatch(&envelope).await;
    let elapsed = started.elapsed().as_secs_f64();

    let processed = match &outcome {
        Ok(outcome) => {
            state.metrics.record_dispatch(outcome.as_str(), elapsed);
            tracing::debug!(message_id = %message_id, outcome = outcome.as_str(), "Dispatch finished");
            outcome.is_processed()
        }
        Err(e) => {
            state.metrics.record_dispatch("error", elapsed);
            tracing::error!(message_id = %message_id, error = %e, "Dispatch failed");
            false
        }
    };

    if tokio::time::timeout(state.ack_timeout, state.hub.ack(&message_id))
        .await
        .is_err()
    {
        tracing::warn!(
            message_id = %message_id,
            timeout_ms = state.ack_timeout.as_millis() as u64,
            "⏱️ Hub ack timed out; responding without it"
        );
    }

    if processed {
        HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(format!("Event {} processed successfully", message_id))
    } else {
        HttpResponse::InternalServerError()
            .content_type("text/plain; charset=utf-8")
            .body(format!("An error occurred while processing event {}", message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::handlers::HandlerRegistry;
    use crate::ingestion::InMemoryLedgerStore;
    use crate::testing::{search_registration, FakeUserService, HubCall, RecordingHub};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    struct Harness {
        state: web::Data<WebhookState>,
        users: Arc<FakeUserService>,
        hub: Arc<RecordingHub>,
    }

    fn harness() -> Harness {
        let users = Arc::new(FakeUserService::new());
        let hub = Arc::new(RecordingHub::new());
        let dispatcher = EventDispatcher::new(
            Arc::new(InMemoryLedgerStore::new()),
            HandlerRegistry::default(),
            users.clone(),
            hub.clone(),
        );
        let state = web::Data::new(WebhookState {
            dispatcher,
            hub: hub.clone(),
            metrics: Arc::new(Metrics::new().unwrap()),
            ack_timeout: Duration::from_millis(200),
        });
        Harness { state, users, hub }
    }

    fn body(message_id: &str, topic: &str, event_name: &str, payload: Value) -> Value {
        json!({
            "messageId": message_id,
            "timestamp": "2024-05-01T12:00:00Z",
            "destination": { "topic": topic, "eventName": event_name },
            "payload": payload
        })
    }

    async fn post(h: &Harness, json: Value) -> (StatusCode, String) {
        let app = test::init_service(
            App::new()
                .app_data(h.state.clone())
                .route("/webhook/core-usuarios", web::post().to(receive_event)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/webhook/core-usuarios")
            .set_json(json)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let bytes = test::read_body(resp).await;
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[actix_web::test]
    async fn test_successful_event_returns_200_and_acks() {
        let h = harness();

        let (status, text) = post(
            &h,
            body("abc-1", "search", "ALTA_USUARIO", search_registration("a@b.com")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, "Event abc-1 processed successfully");
        assert_eq!(h.users.count(), 1);
        assert!(h.hub.calls().contains(&HubCall::Ack("abc-1".to_string())));
    }

    #[actix_web::test]
    async fn test_replay_returns_500_without_second_create() {
        let h = harness();
        let event = body("abc-1", "search", "solicitado", search_registration("a@b.com"));

        post(&h, event.clone()).await;
        let (status, text) = post(&h, event).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(text, "An error occurred while processing event abc-1");
        assert_eq!(h.users.create_calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        let acks = h
            .hub
            .calls()
            .into_iter()
            .filter(|c| matches!(c, HubCall::Ack(_)))
            .count();
        assert_eq!(acks, 2);
    }

    #[actix_web::test]
    async fn test_unknown_event_name_returns_500() {
        let h = harness();

        let (status, text) = post(&h, body("m-9", "search", "mystery_event", json!({}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(text.contains("m-9"));
        assert_eq!(h.hub.calls(), vec![HubCall::Ack("m-9".to_string())]);
    }

    #[actix_web::test]
    async fn test_slow_ack_does_not_hold_the_response() {
        let h = harness();
        h.hub.set_ack_delay(Duration::from_secs(10));

        let started = Instant::now();
        let (status, text) = post(
            &h,
            body("slow-1", "search", "solicitado", search_registration("s@b.com")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, "Event slow-1 processed successfully");
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(h.users.count(), 1);
        assert!(h.hub.calls().iter().all(|c| !matches!(c, HubCall::Ack(_))));
    }

    #[actix_web::test]
    async fn test_malformed_envelope_is_rejected_by_extractor() {
        let h = harness();

        let (status, _) = post(&h, json!({ "messageId": "x" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(h.hub.calls().is_empty());
    }
}
