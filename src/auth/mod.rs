use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::users::User;

/// Claims embedded in every bearer token. Self-contained: protected routes
/// verify the signature and expiry only, no session lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, expiry_days: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(expiry_days)).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,

    #[error("token generation failed: {0}")]
    TokenGeneration(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry; any failure collapses to `InvalidToken` so
/// callers cannot distinguish why a token was rejected.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Hashing(e.to_string()))
}
