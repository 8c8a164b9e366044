use std::sync::Arc;

use actix_web::{App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod db;
mod domain;
mod ingestion;
mod messaging;
mod metrics;
mod utils;
mod web;

#[cfg(test)]
mod testing;

use config::{AppConfig, LedgerBackend};
use domain::handlers::HandlerRegistry;
use domain::user::PostgresUserService;
use ingestion::{EventDispatcher, InMemoryLedgerStore, LedgerStore, PostgresLedgerStore};
use messaging::{HubGateway, RedpandaHubGateway};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Local .env is optional
    let _ = dotenvy::dotenv();

    // Default to INFO, override with RUST_LOG
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hub_user_events=debug")),
        )
        .init();

    tracing::info!("🚀 Starting hub user events receiver");

    let config = AppConfig::from_env()?;

    // === 1. Storage ===
    let pool = db::connect(&config).await?;

    let ledger: Arc<dyn LedgerStore> = match config.ledger_backend {
        LedgerBackend::Postgres => {
            tracing::info!("Using PostgreSQL ledger");
            Arc::new(PostgresLedgerStore::new(pool.clone()))
        }
        LedgerBackend::Memory => {
            tracing::warn!("Using in-memory ledger; delivery history is lost on restart");
            Arc::new(InMemoryLedgerStore::new())
        }
    };
    let users = Arc::new(PostgresUserService::new(pool));

    // === 2. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        metrics.registry().gather().len()
    );

    // === 3. Hub gateway (Redpanda, circuit breaker + retry) ===
    let hub: Arc<dyn HubGateway> = Arc::new(RedpandaHubGateway::new(
        &config.hub_brokers,
        config.hub_source.clone(),
        config.hub_ack_topic.clone(),
        metrics.clone(),
    )?);
    tracing::info!(brokers = %config.hub_brokers, ack_topic = %config.hub_ack_topic, "Hub gateway ready");

    // === 4. Dispatcher ===
    let dispatcher = EventDispatcher::new(ledger, HandlerRegistry::default(), users, hub.clone())
        .with_claim_lease(config.ledger_claim_lease);
    let state = actix_web::web::Data::new(web::WebhookState {
        dispatcher,
        hub,
        metrics: metrics.clone(),
        ack_timeout: config.hub_ack_timeout,
    });

    // === 5. HTTP ===
    let webhook_path = config.webhook_path.clone();
    tracing::info!(
        bind = %config.webhook_bind,
        path = %webhook_path,
        "📡 Webhook listening"
    );
    let webhook_server = HttpServer::new(move || {
        let path = webhook_path.clone();
        App::new()
            .app_data(state.clone())
            .configure(move |cfg| web::routes(cfg, &path))
    })
    .bind(config.webhook_bind)?
    .run();

    let metrics_server =
        metrics::start_metrics_server(metrics.registry().clone(), config.metrics_port);

    tokio::try_join!(webhook_server, metrics_server)?;

    tracing::info!("👋 Shutdown complete");
    Ok(())
}
