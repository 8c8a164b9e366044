mod webhook;

use actix_web::{web, HttpResponse, Responder};

pub use webhook::{receive_event, WebhookState};

/// Register the webhook at `webhook_path` plus `/health`
pub fn routes(cfg: &mut web::ServiceConfig, webhook_path: &str) {
    cfg.route(webhook_path, web::post().to(receive_event))
        .route("/health", web::get().to(health_handler));
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "hub-user-events"
    }))
}
