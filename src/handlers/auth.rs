use std::collections::HashMap;

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, Claims};
use crate::db::users::{self, PublicUser};
use crate::error::ApiError;
use crate::state::AppState;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const DEFAULT_ROLE: &str = "manager";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();

        if !is_valid_email(&self.email) {
            field_errors.insert("email".to_string(), "must be a valid email address".to_string());
        }
        if self.password.len() < MIN_PASSWORD_LENGTH {
            field_errors.insert(
                "password".to_string(),
                format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation("Invalid registration request", field_errors))
        }
    }
}

/// POST /api/auth/register - create a user account
///
/// Returns the public user fields, never the password hash. A duplicate email
/// surfaces the store's unique violation as a conflict rather than a crash.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let role = payload.role.as_deref().unwrap_or(DEFAULT_ROLE).to_string();

    // bcrypt at cost 12 is deliberately slow; keep it off the async runtime
    let cost = state.config.bcrypt_cost;
    let password = payload.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password, cost))
        .await
        .map_err(|e| ApiError::internal(format!("hashing task failed: {}", e)))??;

    let user = users::insert_user(&state.pool, &payload.email, &password_hash, &role)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "User exists or invalid"))?;

    Ok(Json(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login - verify credentials and issue a bearer token
///
/// Unknown email and wrong password return the identical 401 so the endpoint
/// cannot be used to enumerate accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let invalid = || ApiError::unauthorized("Invalid credentials");

    let user = users::find_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(invalid)?;

    let password = payload.password;
    let hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal(format!("verify task failed: {}", e)))??;

    if !verified {
        return Err(invalid());
    }

    let claims = Claims::new(&user, state.config.jwt_expiry_days);
    let token = auth::issue_token(&claims, &state.config.jwt_secret)?;

    Ok(Json(json!({ "token": token, "user": PublicUser::from(&user) })))
}

/// Syntactic check only: non-empty local part, domain with a dot. Anything
/// stricter belongs to a confirmation flow, not this boundary.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && domain.contains('.') && !domain.starts_with('.')
}
