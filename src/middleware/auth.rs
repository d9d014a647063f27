use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity extracted from a verified bearer token. Attached to
/// request extensions for downstream handlers; currently only the gate itself
/// consumes it (role checks are a deferred feature).
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self { id: claims.sub, email: claims.email, role: claims.role }
    }
}

/// Bearer-token gate for all protected routes. Every failure mode returns the
/// same 401 so callers learn nothing about why a token was rejected.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Invalid or missing token"))?;

    let claims = auth::verify_token(&token, &state.config.jwt_secret)
        .map_err(|_| ApiError::unauthorized("Invalid or missing token"))?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
