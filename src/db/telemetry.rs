use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};

/// A validated reading ready for insertion.
#[derive(Debug)]
pub struct NewReading {
    pub ts: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub fuel_rate: Option<f64>,
    pub engine_temp: Option<f64>,
    pub raw: Option<Value>,
}

/// A reading joined with its vehicle for display.
#[derive(Debug, Serialize, FromRow)]
pub struct ReadingRow {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub fuel_rate: Option<f64>,
    pub engine_temp: Option<f64>,
    pub vehicle_code: String,
    pub label: String,
}

/// Resolve the vehicle code and insert the reading in one transaction, so a
/// vehicle cannot disappear between the lookup and the insert. Returns `None`
/// when the code is unknown; nothing is written in that case.
pub async fn insert_reading(
    pool: &PgPool,
    vehicle_code: &str,
    reading: &NewReading,
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
        "INSERT INTO telemetry (vehicle_id, ts, lat, lon, speed_kmh, fuel_rate, engine_temp, raw) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(vehicle_id)
    .bind(reading.ts)
    .bind(reading.lat)
    .bind(reading.lon)
    .bind(reading.speed_kmh)
    .bind(reading.fuel_rate)
    .bind(reading.engine_temp)
    .bind(&reading.raw)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(()))
}

pub async fn latest_readings(pool: &PgPool, limit: i64) -> Result<Vec<ReadingRow>, sqlx::Error> {
    sqlx::query_as::<_, ReadingRow>(
        "SELECT t.id, t.ts, t.lat, t.lon, t.speed_kmh, t.fuel_rate, t.engine_temp, \
                v.vehicle_code, v.label \
         FROM telemetry t \
         JOIN vehicles v ON v.id = t.vehicle_id \
         ORDER BY t.ts DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
