mod common;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde_json::json;

/// The dashboard scenario end to end: register, login, create a vehicle,
/// ingest one reading, see it come back joined with the vehicle.
#[tokio::test]
async fn register_login_create_ingest_latest() -> Result<()> {
    let Some(server) = common::spawn_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let token = common::login_token(&client, &server.base_url).await?;
    let code = common::unique("V");

    client
        .post(format!("{}/api/vehicles", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "vehicle_code": code, "label": "Truck 1" }))
        .send()
        .await?
        .error_for_status()?;

    // Far-future timestamp so this reading tops the shared table's ordering
    let ts = (Utc::now() + Duration::days(365)).to_rfc3339();
    let ingest = client
        .post(format!("{}/api/telemetry/ingest", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "vehicle_code": code, "ts": ts, "speed_kmh": 60 }))
        .send()
        .await?;
    assert_eq!(ingest.status(), StatusCode::OK);
    assert_eq!(ingest.json::<serde_json::Value>().await?["ok"], true);

    let rows = client
        .get(format!("{}/api/telemetry/latest?limit=1", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Vec<serde_json::Value>>()
        .await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["vehicle_code"], code.as_str());
    assert_eq!(rows[0]["label"], "Truck 1");
    assert_eq!(rows[0]["speed_kmh"].as_f64(), Some(60.0));
    assert!(rows[0]["lat"].is_null());
    Ok(())
}

#[tokio::test]
async fn unknown_vehicle_code_rejected_without_insert() -> Result<()> {
    let Some(server) = common::spawn_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let token = common::login_token(&client, &server.base_url).await?;
    let ghost = common::unique("GHOST");

    let res = client
        .post(format!("{}/api/telemetry/ingest", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "vehicle_code": ghost, "ts": "2024-01-01T00:00:00Z", "speed_kmh": 10 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<serde_json::Value>().await?["error"], "Unknown vehicle_code");

    let rows = client
        .get(format!("{}/api/telemetry/latest?limit=500", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Vec<serde_json::Value>>()
        .await?;
    assert!(rows.iter().all(|r| r["vehicle_code"] != ghost.as_str()));
    Ok(())
}

#[tokio::test]
async fn latest_caps_limit_and_orders_by_timestamp() -> Result<()> {
    let Some(server) = common::spawn_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let token = common::login_token(&client, &server.base_url).await?;
    let code = common::unique("V");

    client
        .post(format!("{}/api/vehicles", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "vehicle_code": code, "label": "Van" }))
        .send()
        .await?
        .error_for_status()?;

    let base = Utc::now();
    for minutes in [0i64, 5, 10] {
        client
            .post(format!("{}/api/telemetry/ingest", server.base_url))
            .bearer_auth(&token)
            .json(&json!({
                "vehicle_code": code,
                "ts": (base + Duration::minutes(minutes)).to_rfc3339(),
            }))
            .send()
            .await?
            .error_for_status()?;
    }

    let rows = client
        .get(format!("{}/api/telemetry/latest?limit=9000", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Vec<serde_json::Value>>()
        .await?;
    assert!(rows.len() <= 500, "limit must be capped at 500");

    let timestamps: Vec<DateTime<Utc>> = rows
        .iter()
        .map(|r| r["ts"].as_str().expect("ts").parse().expect("rfc3339 ts"))
        .collect();
    assert!(
        timestamps.windows(2).all(|w| w[0] >= w[1]),
        "timestamps must be non-increasing"
    );

    let one = client
        .get(format!("{}/api/telemetry/latest?limit=1", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Vec<serde_json::Value>>()
        .await?;
    assert!(one.len() <= 1);
    Ok(())
}

#[tokio::test]
async fn alert_severity_bounds_and_default() -> Result<()> {
    let Some(server) = common::spawn_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let token = common::login_token(&client, &server.base_url).await?;
    let code = common::unique("V");

    client
        .post(format!("{}/api/vehicles", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "vehicle_code": code, "label": "Bus" }))
        .send()
        .await?
        .error_for_status()?;

    // Out-of-range severity rejected before any insert
    let rejected = client
        .post(format!("{}/api/alerts/ingest", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "vehicle_code": code,
            "ts": "2024-01-01T00:00:00Z",
            "type": "overheat",
            "severity": 9,
            "message": "too hot",
        }))
        .send()
        .await?;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    let body = rejected.json::<serde_json::Value>().await?;
    assert!(body["field_errors"]["severity"].is_string());

    // Omitted severity defaults to 2
    let ts = (Utc::now() + Duration::days(365)).to_rfc3339();
    client
        .post(format!("{}/api/alerts/ingest", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "vehicle_code": code,
            "ts": ts,
            "type": "low_fuel",
            "message": "fuel below reserve",
        }))
        .send()
        .await?
        .error_for_status()?;

    let rows = client
        .get(format!("{}/api/alerts/latest?limit=500", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Vec<serde_json::Value>>()
        .await?;

    let ours: Vec<_> = rows.iter().filter(|r| r["vehicle_code"] == code.as_str()).collect();
    assert_eq!(ours.len(), 1, "the rejected alert must not have been inserted");
    assert_eq!(ours[0]["type"], "low_fuel");
    assert_eq!(ours[0]["severity"], 2);
    assert_eq!(ours[0]["message"], "fuel below reserve");
    assert_eq!(ours[0]["label"], "Bus");
    Ok(())
}
