use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::alerts::{self, AlertRow, NewAlert};
use crate::error::ApiError;
use crate::state::AppState;

use super::telemetry::parse_ts;
use super::{clamp_limit, LatestQuery};

pub const MIN_SEVERITY: i32 = 1;
pub const MAX_SEVERITY: i32 = 5;
const DEFAULT_SEVERITY: i32 = 2;

#[derive(Debug, Deserialize)]
pub struct IngestAlertRequest {
    pub vehicle_code: String,
    pub ts: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    #[serde(default = "default_severity")]
    pub severity: i32,
    pub message: String,
    pub details: Option<Value>,
}

fn default_severity() -> i32 {
    DEFAULT_SEVERITY
}

impl IngestAlertRequest {
    fn validate(&self) -> Result<NewAlert, ApiError> {
        let mut field_errors = HashMap::new();

        let ts = parse_ts(&self.ts);
        if ts.is_none() {
            field_errors.insert("ts".to_string(), "must be an ISO-8601 datetime".to_string());
        }
        if self.alert_type.is_empty() {
            field_errors.insert("type".to_string(), "must not be empty".to_string());
        }
        if self.message.is_empty() {
            field_errors.insert("message".to_string(), "must not be empty".to_string());
        }
        if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&self.severity) {
            field_errors.insert(
                "severity".to_string(),
                format!("must be between {} and {}", MIN_SEVERITY, MAX_SEVERITY),
            );
        }

        match (ts, field_errors.is_empty()) {
            (Some(ts), true) => Ok(NewAlert {
                ts,
                alert_type: self.alert_type.clone(),
                severity: self.severity,
                message: self.message.clone(),
                details: self.details.clone(),
            }),
            _ => Err(ApiError::validation("Invalid alert", field_errors)),
        }
    }
}

/// POST /api/alerts/ingest - append one severity-tagged event for a known
/// vehicle. Severity bounds are enforced here, never by the store.
pub async fn ingest(
    State(state): State<AppState>,
    Json(payload): Json<IngestAlertRequest>,
) -> Result<Json<Value>, ApiError> {
    let alert = payload.validate()?;

    alerts::insert_alert(&state.pool, &payload.vehicle_code, &alert)
        .await?
        .ok_or_else(|| ApiError::bad_request("Unknown vehicle_code"))?;

    Ok(Json(json!({ "ok": true })))
}

/// GET /api/alerts/latest?limit=N - most recent alerts, joined with vehicle
/// code and label
pub async fn latest(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<Vec<AlertRow>>, ApiError> {
    let rows = alerts::latest_alerts(&state.pool, clamp_limit(query.limit)).await?;
    Ok(Json(rows))
}
