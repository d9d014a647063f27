use fleet_api::{app, config::AppConfig, db, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().unwrap_or_else(|e| panic!("configuration error: {}", e));

    let pool = db::connect(&config)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .unwrap_or_else(|e| panic!("migration failed: {}", e));

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("fleet-api listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(pool, config)))
        .await
        .expect("server");
}
