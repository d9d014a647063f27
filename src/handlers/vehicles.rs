use std::collections::HashMap;

use axum::{extract::State, response::Json};
use serde::Deserialize;

use crate::db::vehicles::{self, Vehicle};
use crate::error::ApiError;
use crate::state::AppState;

pub const MIN_CODE_LENGTH: usize = 2;

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub vehicle_code: String,
    pub label: String,
}

impl CreateVehicleRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();

        if self.vehicle_code.len() < MIN_CODE_LENGTH {
            field_errors.insert(
                "vehicle_code".to_string(),
                format!("must be at least {} characters", MIN_CODE_LENGTH),
            );
        }
        if self.label.is_empty() {
            field_errors.insert("label".to_string(), "must not be empty".to_string());
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation("Invalid vehicle", field_errors))
        }
    }
}

/// GET /api/vehicles - all vehicles, newest-id-first
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, ApiError> {
    let vehicles = vehicles::list_vehicles(&state.pool).await?;
    Ok(Json(vehicles))
}

/// POST /api/vehicles - register a vehicle under a unique code
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateVehicleRequest>,
) -> Result<Json<Vehicle>, ApiError> {
    payload.validate()?;

    let vehicle = vehicles::insert_vehicle(&state.pool, &payload.vehicle_code, &payload.label)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "Vehicle exists or invalid"))?;

    Ok(Json(vehicle))
}
