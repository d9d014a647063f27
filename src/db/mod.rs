use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::AppConfig;

pub mod alerts;
pub mod telemetry;
pub mod users;
pub mod vehicles;

/// Build the shared connection pool. One pool per process, cloned into
/// handlers through `AppState`.
pub async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    info!("created database pool (max_connections={})", config.database_max_connections);
    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
