//! End-to-end handler tests against the embedded store.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use datarest::registry;
use datarest::settings::{DbProfile, Settings};
use datarest::{app_router, AppState, MemStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_settings() -> Settings {
    Settings::from_lookup(|key| match key {
        "APP_TITLE" => Some("Datarest Demo".to_string()),
        _ => None,
    })
    .expect("test settings")
}

fn app() -> Router {
    let state = AppState::new(Arc::new(MemStore::new()), registry::sample(), test_settings());
    app_router(state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.expect("request");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request")
}

fn json_req(method: &str, path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn cats_reflected_in_read() {
    let app = app();
    for name in ["Felix", "Garfield", "Whiskers"] {
        let (status, _) = send(&app, json_req("POST", "/cats", json!({"name": name}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, get("/cats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], json!(3));
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Felix", "Garfield", "Whiskers"]);
}

#[tokio::test]
async fn create_returns_row_with_camel_case_timestamps() {
    let app = app();
    let (status, body) = send(&app, json_req("POST", "/cats", json!({"name": "Felix"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], json!("Felix"));
    assert_eq!(body["data"]["id"], json!(1));
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"]["updatedAt"].is_string());
    assert!(body["data"].get("created_at").is_none());
}

#[tokio::test]
async fn read_update_delete_round_trip() {
    let app = app();
    let (_, created) = send(&app, json_req("POST", "/cats", json!({"name": "Felix"}))).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, get(&format!("/cats/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Felix"));

    let (status, body) = send(
        &app,
        json_req("PATCH", &format!("/cats/{}", id), json!({"name": "Tom"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Tom"));

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/cats/{}", id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get(&format!("/cats/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("not_found"));
}

#[tokio::test]
async fn car_make_filter_ignores_case() {
    let app = app();
    send(
        &app,
        json_req(
            "POST",
            "/cars",
            json!({"make": "Ford", "model": "Focus", "year": 2010, "color": "blue"}),
        ),
    )
    .await;
    send(
        &app,
        json_req(
            "POST",
            "/cars",
            json!({"make": "Opel", "model": "Astra", "year": 2012}),
        ),
    )
    .await;

    let (status, body) = send(&app, get("/cars?make=ford")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], json!(1));
    assert_eq!(body["data"][0]["model"], json!("Focus"));

    // model has no ignore-case flag: exact match only
    let (_, body) = send(&app, get("/cars?model=focus")).await;
    assert_eq!(body["meta"]["count"], json!(0));
}

#[tokio::test]
async fn list_supports_limit_and_offset() {
    let app = app();
    for name in ["a", "b", "c", "d"] {
        send(&app, json_req("POST", "/cats", json!({"name": name}))).await;
    }
    let (status, body) = send(&app, get("/cats?limit=2&offset=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], json!(2));
    assert_eq!(body["data"][0]["name"], json!("b"));
}

#[tokio::test]
async fn validation_failures_are_422() {
    let app = app();
    let (status, body) = send(&app, json_req("POST", "/cats", json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], json!("validation_error"));

    let (status, body) = send(
        &app,
        json_req(
            "POST",
            "/cars",
            json!({"make": "Benz", "model": "Motorwagen", "year": 1700}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("year"));
}

#[tokio::test]
async fn missing_non_nullable_column_is_422() {
    // model is nullable: false with no default; both backends must reject
    // its absence the same way instead of the SQL backend alone surfacing
    // a constraint error
    let app = app();
    let (status, body) = send(
        &app,
        json_req("POST", "/cars", json!({"make": "Ford", "year": 2010})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], json!("validation_error"));
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("model"));

    let (status, _) = send(
        &app,
        json_req(
            "POST",
            "/cars",
            json!({"make": "Ford", "model": null, "year": 2010}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn disallowed_operation_is_400() {
    use datarest::registry::{resolve, sample_defs};

    // restrict cats to read-only and rebuild the router around it
    let mut defs = sample_defs();
    for def in &mut defs {
        if def.path_segment == "cats" {
            def.operations = vec!["read".into()];
        }
    }
    let state = AppState::new(
        Arc::new(MemStore::new()),
        resolve(&defs).expect("restricted defs"),
        test_settings(),
    );
    let app = app_router(state);

    let (status, body) = send(&app, json_req("POST", "/cats", json!({"name": "Felix"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("bad_request"));

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/cats/1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // read stays available
    let (status, _) = send(&app, get("/cats")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_resource_is_404_and_bad_id_is_400() {
    let app = app();
    let (status, body) = send(&app, get("/dogs")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("not_found"));

    let (status, body) = send(&app, get("/cats/not-a-number")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("bad_request"));
}

#[tokio::test]
async fn config_endpoints_echo_settings() {
    let app = app();
    let (status, body) = send(&app, get("/config/app-title")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["key"], json!("app.title"));
    assert_eq!(body["data"]["value"], json!("Datarest Demo"));

    let (_, body) = send(&app, get("/config/active-profile")).await;
    assert_eq!(body["data"]["value"], json!("embedded"));

    let (_, body) = send(&app, get("/config/database-url")).await;
    assert_eq!(body["data"]["value"], Value::Null);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, body) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], json!("ok"));

    let (status, body) = send(&app, get("/info")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("datarest"));

    let (status, body) = send(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"], json!("embedded"));
    assert_eq!(body["resources"], json!(2));
    assert!(body["uptime_seconds"].is_number());
}

#[tokio::test]
async fn static_routes_win_over_resource_segment() {
    // /health and /config/* must not be swallowed by /:path_segment
    let app = app();
    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get("/config/app-title")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn settings_profile_is_exercised() {
    let settings = test_settings();
    assert_eq!(settings.profile, DbProfile::Embedded);
    assert_eq!(settings.app_title, "Datarest Demo");
}
