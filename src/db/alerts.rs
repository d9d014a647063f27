use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};

#[derive(Debug)]
pub struct NewAlert {
    pub ts: DateTime<Utc>,
    pub alert_type: String,
    pub severity: i32,
    pub message: String,
    pub details: Option<Value>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct AlertRow {
    pub id: i64,
    pub ts: DateTime<Utc>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub alert_type: String,
    pub severity: i32,
    pub message: String,
    pub details: Option<Value>,
    pub vehicle_code: String,
    pub label: String,
}

/// Same lookup-plus-insert transaction as telemetry ingestion. `None` means
/// unknown vehicle code, nothing written.
pub async fn insert_alert(
    pool: &PgPool,
    vehicle_code: &str,
    alert: &NewAlert,
) -> Result<Option<()>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let vehicle_id: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM vehicles WHERE vehicle_code = $1")
            .bind(vehicle_code)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((vehicle_id,)) = vehicle_id else {
        return Ok(None);
    };

    sqlx::query(
        "INSERT INTO alerts (vehicle_id, ts, type, severity, message, details) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(vehicle_id)
    .bind(alert.ts)
    .bind(&alert.alert_type)
    .bind(alert.severity)
    .bind(&alert.message)
    .bind(&alert.details)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(()))
}

pub async fn latest_alerts(pool: &PgPool, limit: i64) -> Result<Vec<AlertRow>, sqlx::Error> {
    sqlx::query_as::<_, AlertRow>(
        "SELECT a.id, a.ts, a.type, a.severity, a.message, a.details, \
                v.vehicle_code, v.label \
         FROM alerts a \
         JOIN vehicles v ON v.id = a.vehicle_id \
         ORDER BY a.ts DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
