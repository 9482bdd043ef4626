mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::TestDatabase;
use gain_rpg::api::{create_routes, AppState};

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let db = TestDatabase::new().await;
    let (status, body) = send(&db.router(), Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

async fn allowed_origin(app: Router) -> Option<String> {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header("Origin", "http://elsewhere.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    response
        .headers()
        .get("access-control-allow-origin")
        .map(|v| v.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_cors_is_open_only_in_development() {
    let db = TestDatabase::new().await;
    assert_eq!(allowed_origin(db.router()).await.as_deref(), Some("*"));

    let mut config = db.config.clone();
    config.environment = "production".to_string();
    let app = create_routes(AppState::new(db.pool.clone(), config));
    assert_eq!(allowed_origin(app).await, None);
}

#[tokio::test]
async fn test_today_view() {
    let db = TestDatabase::new().await;
    let (status, body) = send(&db.router(), Method::GET, "/api/v1/today", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player"]["name"], "Adventurer");
    assert_eq!(body["minimum_set"]["pushups"], 5);
    assert_eq!(body["meets_minimum"], false);
    assert_eq!(body["preview_grit"], 0);
    assert!(body["encounter"]["threat_name"].is_string());
}

#[tokio::test]
async fn test_today_survives_invalid_encounter_json() {
    let db = TestDatabase::new().await;
    db.store_raw_encounter(Utc::now().date_naive(), "{not valid json")
        .await;

    let (status, body) = send(&db.router(), Method::GET, "/api/v1/today", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["encounter"]["threat_name"], "Unknown threat");
}

#[tokio::test]
async fn test_today_survives_non_list_stakes() {
    let db = TestDatabase::new().await;
    db.store_raw_encounter(
        Utc::now().date_naive(),
        r#"{"threat_name":"x","tag":"y","stakes":"bad"}"#,
    )
    .await;

    let (status, body) = send(&db.router(), Method::GET, "/api/v1/today", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["encounter"]["threat_name"], "x");
    assert_eq!(body["encounter"]["stakes"], json!([]));
}

#[tokio::test]
async fn test_workout_save_lock_in_and_conflict() {
    let db = TestDatabase::new().await;
    let app = db.router();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/workout/save",
        Some(json!({"pushups": 20, "situps": -4, "squats": 20, "pullups": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["situps"], 0);
    assert_eq!(body["minimum_set_done"], false);

    let (status, body) = send(&app, Method::POST, "/api/v1/workout/minimum-set", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["situps"], 10);
    assert_eq!(body["minimum_set_done"], true);

    let (status, body) = send(&app, Method::POST, "/api/v1/workout/lock-in", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["already_locked"], false);
    assert!(body["workout"]["locked_in_at"].is_string());

    let (status, body) = send(&app, Method::POST, "/api/v1/workout/lock-in", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["already_locked"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/workout/save",
        Some(json!({"pushups": 50, "situps": 50, "squats": 50, "pullups": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_workout_by_date() {
    let db = TestDatabase::new().await;
    let app = db.router();

    let (status, _) = send(&app, Method::GET, "/api/v1/workout/2020-01-01", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/v1/workout/yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_encounter_endpoints() {
    let db = TestDatabase::new().await;
    let app = db.router();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/encounter/manual",
        Some(json!({"action": "flee"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("expected strike or guard"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/encounter/manual",
        Some(json!({"action": "strike"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["round"], 1);

    let (status, body) = send(&app, Method::POST, "/api/v1/encounter/auto", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["complete"], true);
    assert!(body["outcome"].is_string());
}

#[tokio::test]
async fn test_reroll_requires_testing_mode() {
    let db = TestDatabase::new().await;
    let app = db.router();

    let (status, body) = send(&app, Method::POST, "/api/v1/encounter/reroll", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    db.set_testing_mode(true).await;
    let (status, body) = send(&app, Method::POST, "/api/v1/encounter/reroll", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reroll_count"], 1);

    // Once a round is fought the roll is fixed
    send(
        &app,
        Method::POST,
        "/api/v1/encounter/manual",
        Some(json!({"action": "guard"})),
    )
    .await;
    let (status, _) = send(&app, Method::POST, "/api/v1/encounter/reroll", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_settings_validation() {
    let db = TestDatabase::new().await;
    let app = db.router();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/settings",
        Some(json!({"name": "  ", "theme_pack": "", "day_timezone": "Europe/Berlin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Adventurer");
    assert_eq!(body["theme_pack"], "default");
    assert_eq!(body["day_timezone"], "Europe/Berlin");
    assert_eq!(body["available_theme_packs"], json!(["default"]));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/settings",
        Some(json!({"name": "Rook", "theme_pack": "default", "day_timezone": "Mars/Olympus_Mons"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/settings",
        Some(json!({"name": "Rook", "theme_pack": "default", "ntfy_topic_url": "ftp://example.com/topic"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, "/api/v1/settings", None).await;
    assert_eq!(body["name"], "Adventurer");
    assert_eq!(body["ntfy_topic_url"], Value::Null);
}

#[tokio::test]
async fn test_settings_without_name_or_theme_pack() {
    let db = TestDatabase::new().await;
    let app = db.router();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/settings",
        Some(json!({"day_timezone": "Europe/Berlin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Adventurer");
    assert_eq!(body["theme_pack"], "default");
    assert_eq!(body["day_timezone"], "Europe/Berlin");
}

#[tokio::test]
async fn test_summaries_limit_bounds() {
    let db = TestDatabase::new().await;
    let app = db.router();

    let (status, body) = send(&app, Method::GET, "/api/v1/summaries", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send(&app, Method::GET, "/api/v1/summaries?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/v1/summaries?limit=101", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inventory_endpoints_feed_progress() {
    let db = TestDatabase::new().await;
    let app = db.router();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/inventory",
        Some(json!({"name": "Sword", "type": "weapon", "effects": {"attack": 2}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["type"], "weapon");
    assert_eq!(body["equipped"], false);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::POST, &format!("/api/v1/inventory/{}/equip", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["equipped"], true);

    let (_, body) = send(&app, Method::GET, "/api/v1/progress", None).await;
    assert_eq!(body["combat_stats"]["attack"], 4);

    let (status, _) = send(&app, Method::POST, "/api/v1/inventory/999/equip", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::POST, &format!("/api/v1/inventory/{}/unequip", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["equipped"], false);

    let (_, body) = send(&app, Method::GET, "/api/v1/inventory", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["effects"]["attack"], 2);
}
