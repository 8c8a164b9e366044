use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;

/// Connect the shared pool and apply embedded migrations
pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    tracing::info!(
        max_connections = config.database_max_connections,
        "Connecting to PostgreSQL..."
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations completed");

    Ok(pool)
}
