use serde::Deserialize;

pub mod alerts;
pub mod auth;
pub mod telemetry;
pub mod vehicles;

pub const DEFAULT_LATEST_LIMIT: i64 = 50;
pub const MAX_LATEST_LIMIT: i64 = 500;

/// Query parameters shared by the two `latest` endpoints.
#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    pub limit: Option<i64>,
}

/// Default 50, never more than 500, never negative.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LATEST_LIMIT).clamp(0, MAX_LATEST_LIMIT)
}
