use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::telemetry::{self, NewReading, ReadingRow};
use crate::error::ApiError;
use crate::state::AppState;

use super::{clamp_limit, LatestQuery};

#[derive(Debug, Deserialize)]
pub struct IngestReadingRequest {
    pub vehicle_code: String,
    /// ISO-8601 datetime; accepted as a string so a malformed value produces
    /// a field error instead of a body-deserialization rejection.
    pub ts: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub fuel_rate: Option<f64>,
    pub engine_temp: Option<f64>,
    pub raw: Option<Value>,
}

impl IngestReadingRequest {
    fn validate(&self) -> Result<NewReading, ApiError> {
        let ts = parse_ts(&self.ts).ok_or_else(|| {
            let mut field_errors = HashMap::new();
            field_errors.insert("ts".to_string(), "must be an ISO-8601 datetime".to_string());
            ApiError::validation("Invalid reading", field_errors)
        })?;

        Ok(NewReading {
            ts,
            lat: self.lat,
            lon: self.lon,
            speed_kmh: self.speed_kmh,
            fuel_rate: self.fuel_rate,
            engine_temp: self.engine_temp,
            raw: self.raw.clone(),
        })
    }
}

/// POST /api/telemetry/ingest - append one reading for a known vehicle
pub async fn ingest(
    State(state): State<AppState>,
    Json(payload): Json<IngestReadingRequest>,
) -> Result<Json<Value>, ApiError> {
    let reading = payload.validate()?;

    telemetry::insert_reading(&state.pool, &payload.vehicle_code, &reading)
        .await?
        .ok_or_else(|| ApiError::bad_request("Unknown vehicle_code"))?;

    Ok(Json(json!({ "ok": true })))
}

/// GET /api/telemetry/latest?limit=N - most recent readings, joined with
/// vehicle code and label
pub async fn latest(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<Vec<ReadingRow>>, ApiError> {
    let rows = telemetry::latest_readings(&state.pool, clamp_limit(query.limit)).await?;
    Ok(Json(rows))
}

pub(super) fn parse_ts(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc))
}
