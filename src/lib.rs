use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use state::AppState;

/// Build the full application router: public auth routes, the protected API
/// behind the bearer-token gate, and the global middleware stack.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/vehicles", get(handlers::vehicles::list).post(handlers::vehicles::create))
        .route("/api/telemetry/latest", get(handlers::telemetry::latest))
        .route("/api/telemetry/ingest", post(handlers::telemetry::ingest))
        .route("/api/alerts/latest", get(handlers::alerts::latest))
        .route("/api/alerts/ingest", post(handlers::alerts::ingest))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors_layer(&state.config.cors_origin))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }

    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(_) => {
            tracing::warn!("invalid CORS_ORIGIN {:?}, falling back to permissive", origin);
            CorsLayer::permissive()
        }
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match db::health_check(&state.pool).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "ok": true }))),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "ok": false })))
        }
    }
}
