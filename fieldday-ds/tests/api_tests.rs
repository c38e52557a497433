//! HTTP API tests
//!
//! Drives the router directly with tower's oneshot, the same way the HTTP
//! layer would be exercised in production minus the socket.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use fieldday_common::db::init::init_database;
use fieldday_ds::mediafs::MediaStore;
use fieldday_ds::snapshot::SnapshotStore;
use fieldday_ds::{build_router, AppState};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

async fn test_app(admin_secret: &str) -> (TempDir, Router) {
    let dir = TempDir::new().expect("temp dir");
    let pool = init_database(&dir.path().join("test.db"))
        .await
        .expect("database init");
    let state = AppState::new(
        pool,
        SnapshotStore::new(dir.path().join("students")),
        MediaStore::new(dir.path().join("media")),
        admin_secret.to_string(),
    );
    (dir, build_router(state))
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn submission() -> serde_json::Value {
    json!({
        "teamInfo": {
            "school": "PS1",
            "grade": "5",
            "className": "A",
            "stationId": "3",
            "memberCount": 4,
            "memberNames": "An, Bo, Chen, Du"
        },
        "processRecord": {
            "stages": {"PREPARATION": {"isCompleted": true}}
        }
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, app) = test_app("").await;
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_submit_then_read_back() {
    let (_dir, app) = test_app("").await;

    let response = app
        .clone()
        .oneshot(json_post("/api/submit", submission()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/team/PS1_5_A_3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/teams")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_submit_without_identity_is_bad_request() {
    let (_dir, app) = test_app("").await;

    let response = app
        .oneshot(json_post("/api/submit", json!({"exportTime": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_team_is_not_found() {
    let (_dir, app) = test_app("").await;

    let response = app.oneshot(get("/api/team/absent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_evaluation_round_trip() {
    let (_dir, app) = test_app("").await;

    app.clone()
        .oneshot(json_post("/api/submit", submission()))
        .await
        .unwrap();

    let body = json!({
        "teamName": "PS1 5 A 3",
        "evaluations": {
            "PREPARATION": {
                "stage": "PREPARATION",
                "positiveTags": ["quick"],
                "improvementTags": [],
                "otherComment": "good start"
            }
        }
    });
    let response = app
        .clone()
        .oneshot(json_post("/api/team/PS1_5_A_3/evaluation", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/team/PS1_5_A_3/evaluation"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/evaluation/teams?page=1&page_size=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_media_upload_and_download() {
    let (_dir, app) = test_app("").await;

    let upload = Request::builder()
        .method("POST")
        .uri("/api/team/PS1_5_A_3/media/photo_001.jpg")
        .body(Body::from("jpeg bytes"))
        .unwrap();
    let response = app.clone().oneshot(upload).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/team/PS1_5_A_3/media/photo_001.jpg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/team/PS1_5_A_3/media/missing.jpg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_requires_admin_secret() {
    let (_dir, app) = test_app("sekrit").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/clear")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/clear")
                .header("x-admin-secret", "sekrit")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_status_and_statistics() {
    let (_dir, app) = test_app("").await;

    let response = app.clone().oneshot(get("/api/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/statistics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
