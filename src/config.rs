use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

/// Process configuration, read once at startup and passed down through
/// `AppState` rather than held in a global.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub cors_origin: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub bcrypt_cost: u32,
    pub jwt_expiry_days: i64,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            database_url,
            jwt_secret,
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            port: parse_or("PORT", 8080),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            bcrypt_cost: parse_or("BCRYPT_COST", 12),
            jwt_expiry_days: parse_or("JWT_EXPIRY_DAYS", 7),
            max_body_bytes: parse_or("MAX_BODY_BYTES", 1024 * 1024),
        })
    }
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    env::var(var).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
