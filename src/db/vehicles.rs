use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Serialize, FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub vehicle_code: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

/// All vehicles, newest-id-first. No pagination; the fleet is small.
pub async fn list_vehicles(pool: &PgPool) -> Result<Vec<Vehicle>, sqlx::Error> {
    sqlx::query_as::<_, Vehicle>(
        "SELECT id, vehicle_code, label, created_at FROM vehicles ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn insert_vehicle(
    pool: &PgPool,
    vehicle_code: &str,
    label: &str,
) -> Result<Vehicle, sqlx::Error> {
    sqlx::query_as::<_, Vehicle>(
        "INSERT INTO vehicles (vehicle_code, label) VALUES ($1, $2) \
         RETURNING id, vehicle_code, label, created_at",
    )
    .bind(vehicle_code)
    .bind(label)
    .fetch_one(pool)
    .await
}
