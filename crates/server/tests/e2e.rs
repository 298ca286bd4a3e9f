use std::net::SocketAddr;

use axum::{extract::Request, ServiceExt};
use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use models::db::{connect_with_config, DatabaseConfig};
use server::{build_app, AppState};

struct TestApp {
    base_url: String,
}

impl TestApp {
    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }
}

/// Fresh in-memory database (or `TEST_DATABASE_URL`) behind a server on an ephemeral port.
async fn start_server() -> anyhow::Result<TestApp> {
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db = connect_with_config(&DatabaseConfig { url, ..Default::default() }).await?;
    migration::Migrator::up(&db, None).await?;

    let state = AppState::new(db, configs::BookingConfig::default())?;
    let app = build_app(state);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url })
}

async fn post(c: &reqwest::Client, url: String, body: Value) -> anyhow::Result<(HttpStatusCode, Value)> {
    let res = c.post(url).json(&body).send().await?;
    let status = res.status();
    let body = res.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, body))
}

async fn get(c: &reqwest::Client, url: String) -> anyhow::Result<(HttpStatusCode, Value)> {
    let res = c.get(url).send().await?;
    let status = res.status();
    let body = res.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, body))
}

#[tokio::test]
async fn e2e_health_and_metrics() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let (status, body) = get(&c, app.url("/health")).await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["status"], "ok");

    let res = c.get(app.url("/metrics")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let (status, doc) = get(&c, app.url("/api-docs/openapi.json")).await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert!(doc["paths"]["/api/bookings/slots"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_booking_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let (status, svc) = post(&c, app.url("/api/services/"), json!({"name": "Yoga", "duration_minutes": 60, "price": "25.00"})).await?;
    assert_eq!(status, HttpStatusCode::CREATED);
    assert_eq!(svc["price"], "25.00");
    let (status, staff) = post(&c, app.url("/api/staff"), json!({"name": "Aly", "email": "aly@example.com"})).await?;
    assert_eq!(status, HttpStatusCode::CREATED);
    let (svc_id, staff_id) = (svc["id"].as_i64().unwrap_or_default(), staff["id"].as_i64().unwrap_or_default());

    // 2031-01-06 is a Monday: 09:00..16:00 in 30 minute steps.
    let (status, slots) = get(&c, app.url(&format!("/api/bookings/slots/?staff_id={}&service_id={}&date=2031-01-06", staff_id, svc_id))).await?;
    assert_eq!(status, HttpStatusCode::OK);
    let list = slots["slots"].as_array().cloned().unwrap_or_default();
    assert_eq!(list.len(), 15);
    assert!(list.iter().all(|s| s["available"] == true));

    let booking = json!({
        "service": svc_id, "staff": staff_id, "date": "2031-01-06", "time": "10:00",
        "client_name": "Jo Bloggs", "client_email": "jo@example.com", "client_phone": "0777"
    });
    let (status, created) = post(&c, app.url("/api/bookings"), booking.clone()).await?;
    assert_eq!(status, HttpStatusCode::CREATED);
    assert_eq!(created["status"], "confirmed");
    assert_eq!(created["client_name"], "Jo Bloggs");

    let mut clash = booking.clone();
    clash["time"] = json!("10:30");
    clash["client_email"] = json!("sam@example.com");
    let (status, err) = post(&c, app.url("/api/bookings"), clash).await?;
    assert_eq!(status, HttpStatusCode::CONFLICT);
    assert_eq!(err["error"], "Conflict");

    let (_, slots) = get(&c, app.url(&format!("/api/bookings/slots?staff_id={}&service_id={}&date=2031-01-06", staff_id, svc_id))).await?;
    let ten = slots["slots"].as_array().and_then(|s| s.iter().find(|s| s["time"] == "10:00").cloned()).unwrap_or(Value::Null);
    assert_eq!(ten["available"], false);
    assert_eq!(ten["reason"], "booked");

    let (_, clients) = get(&c, app.url("/api/clients?search=bloggs")).await?;
    assert_eq!(clients.as_array().map(|a| a.len()), Some(1));
    assert_eq!(clients[0]["total_bookings"], 1);

    let id = created["id"].as_i64().unwrap_or_default();
    let (status, cancelled) = post(&c, app.url(&format!("/api/bookings/{}/cancel", id)), json!({})).await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, err) = post(&c, app.url("/api/bookings/bulk-status"), json!({"ids": [id], "status": "confirmed"})).await?;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Validation Error");

    let (status, affected) = post(&c, app.url("/api/bookings/bulk-status"), json!({"ids": [id], "status": "completed"})).await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(affected["updated"], 1);

    let res = c.get(app.url("/api/bookings/export")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let disposition = res.headers().get("content-disposition").and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    assert!(disposition.starts_with("attachment; filename=\"bookings_"));
    let body = res.text().await?;
    assert!(body.starts_with("Booking ID,Client Name"));
    assert!(body.contains("Jo Bloggs,jo@example.com,0777,Yoga,Aly,2031-01-06,10:00,11:00,60 min,£25.00,completed"));
    Ok(())
}

#[tokio::test]
async fn e2e_validation_and_not_found_bodies() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let (status, err) = post(&c, app.url("/api/services"), json!({"name": "Too long", "duration_minutes": 600, "price": 10})).await?;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Validation Error");
    assert!(err["detail"].as_str().unwrap_or_default().contains("duration_minutes"));

    let (status, err) = get(&c, app.url("/api/bookings/999")).await?;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
    assert_eq!(err["error"], "Not Found");
    Ok(())
}

#[tokio::test]
async fn e2e_intake_and_disclaimer() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let (status, _) = get(&c, app.url("/api/intake/status")).await?;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);

    let (status, missing) = get(&c, app.url("/api/intake/status?email=jo@example.com")).await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(missing["exists"], false);

    let profile = json!({
        "full_name": "Jo Bloggs", "email": "jo@example.com", "experience_level": "beginner",
        "consent_booking": true, "consent_privacy": true
    });
    let (status, created) = post(&c, app.url("/api/intake-profiles/"), profile).await?;
    assert_eq!(status, HttpStatusCode::CREATED);
    assert_eq!(created["is_valid_for_booking"], true);

    let (_, st) = get(&c, app.url("/api/intake/status/?email=jo@example.com")).await?;
    assert_eq!(st["exists"], true);
    assert_eq!(st["profile_id"], created["id"]);

    let (status, expired) = post(&c, app.url("/api/intake/expire-all"), json!({})).await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(expired["updated"], 1);
    let (_, by_email) = get(&c, app.url("/api/intake-profiles/by_email?email=jo@example.com")).await?;
    assert_eq!(by_email["is_valid_for_booking"], false);

    let (status, _) = get(&c, app.url("/api/intake-disclaimer/active")).await?;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
    let (status, _) = post(&c, app.url("/api/intake-disclaimer"), json!({"version": "1.0", "content": "Terms", "active": true})).await?;
    assert_eq!(status, HttpStatusCode::CREATED);
    let (status, active) = get(&c, app.url("/api/intake-disclaimer/active")).await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(active["version"], "1.0");
    Ok(())
}
