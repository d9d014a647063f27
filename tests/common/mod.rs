use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde_json::json;

use fleet_api::{app, config::AppConfig, state::AppState};

pub struct TestServer {
    pub base_url: String,
}

/// Spin up an in-process server against TEST_DATABASE_URL. Returns None (with
/// a notice) when the variable is unset so the suite passes without a store.
pub async fn spawn_server() -> Result<Option<TestServer>> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return Ok(None);
    };

    let config = AppConfig {
        database_url: database_url.clone(),
        jwt_secret: "integration-test-secret".to_string(),
        cors_origin: "*".to_string(),
        port: 0,
        database_max_connections: 5,
        // Minimum bcrypt cost keeps registration fast during tests
        bcrypt_cost: 4,
        jwt_expiry_days: 7,
        max_body_bytes: 1024 * 1024,
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&database_url)
        .await
        .context("failed to connect to test database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app(AppState::new(pool, config)))
            .await
            .expect("test server");
    });

    Ok(Some(TestServer { base_url }))
}

/// Unique suffix so repeated runs against a persistent database never collide.
pub fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}{}", prefix, nanos)
}

/// Register a fresh user and return a bearer token for it.
pub async fn login_token(client: &reqwest::Client, base_url: &str) -> Result<String> {
    let email = format!("{}@fleet.test", unique("user"));

    let res = client
        .post(format!("{}/api/auth/register", base_url))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await?;
    anyhow::ensure!(res.status().is_success(), "register failed: {}", res.status());

    let res = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await?;
    anyhow::ensure!(res.status().is_success(), "login failed: {}", res.status());

    let body = res.json::<serde_json::Value>().await?;
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("login response missing token")
}
