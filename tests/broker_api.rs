//! End-to-end tests driving the HTTP router in memory.
//!
//! No listener is bound; requests go through `tower::ServiceExt::oneshot`
//! against the fully wired router, with snapshots landing in a tempdir.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use waitroom_api::state::AppState;
use waitroom_broker::AllocationEngine;
use waitroom_core::config::AppConfig;
use waitroom_core::config::app::ServerConfig;
use waitroom_core::config::auth::AuthConfig;
use waitroom_core::config::broker::BrokerConfig;
use waitroom_core::config::logging::LoggingConfig;
use waitroom_core::config::persistence::PersistenceConfig;
use waitroom_core::traits::snapshot_store::SnapshotStore;
use waitroom_store::JsonSnapshotStore;

const SECRET: &str = "test-secret";

fn test_config(state_file: &Path) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: "static".to_string(),
        },
        auth: AuthConfig {
            secret: SECRET.to_string(),
        },
        broker: BrokerConfig {
            client_timeout_seconds: 10,
        },
        persistence: PersistenceConfig {
            state_file: state_file.display().to_string(),
        },
        logging: LoggingConfig::default(),
    }
}

/// Build the app the same way `main` does, minus the listener.
async fn build_app(state_file: &Path) -> Router {
    let config = test_config(state_file);
    let store = Arc::new(JsonSnapshotStore::new(state_file));
    let snapshot = store.load().await.unwrap();
    let engine = AllocationEngine::new(snapshot, store, &config.broker);
    waitroom_api::build_router(AppState {
        config: Arc::new(config),
        engine,
    })
}

async fn fresh_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&dir.path().join("rooms.json")).await;
    (app, dir)
}

async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post(router: &Router, uri: &str) -> (StatusCode, String) {
    send(router, Method::POST, uri).await
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    send(router, Method::GET, uri).await
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn test_room_mutations_require_the_secret() {
    let (app, _dir) = fresh_app().await;

    for uri in [
        "/api/register?url=r1&count=2",
        "/api/free?url=r1&count=1",
        "/api/delete?url=r1",
        "/api/register?key=wrong&url=r1&count=2",
    ] {
        let (status, body) = post(&app, uri).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "uri: {uri}");
        assert_eq!(json(&body)["error"], "UNAUTHORIZED");
    }

    // nothing leaked into the table
    let (_, body) = get(&app, "/api/state").await;
    assert_eq!(json(&body), serde_json::json!({}));
}

#[tokio::test]
async fn test_state_is_readable_without_the_secret() {
    let (app, _dir) = fresh_app().await;

    post(&app, &format!("/api/register?key={SECRET}&url=r1&count=2")).await;
    let (status, body) = get(&app, "/api/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({"r1": 2}));
}

#[tokio::test]
async fn test_register_validates_parameters() {
    let (app, _dir) = fresh_app().await;

    for uri in [
        format!("/api/register?key={SECRET}&count=2"),
        format!("/api/register?key={SECRET}&url=r1"),
        format!("/api/register?key={SECRET}&url=r1&count=0"),
        format!("/api/register?key={SECRET}&url=r1&count=-3"),
        format!("/api/register?key={SECRET}&url=r1&count=nope"),
    ] {
        let (status, body) = post(&app, &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(json(&body)["error"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (app, _dir) = fresh_app().await;

    post(&app, &format!("/api/register?key={SECRET}&url=r1&count=2")).await;
    let (status, _) = post(&app, &format!("/api/register?key={SECRET}&url=r1&count=5")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = get(&app, "/api/state").await;
    assert_eq!(json(&body), serde_json::json!({"r1": 2}));
}

#[tokio::test]
async fn test_free_creates_and_returns_the_table() {
    let (app, _dir) = fresh_app().await;

    let (status, body) = post(&app, &format!("/api/free?key={SECRET}&url=r1&count=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({"r1": 3}));
}

#[tokio::test]
async fn test_delete_unknown_room_is_a_successful_noop() {
    let (app, _dir) = fresh_app().await;

    post(&app, &format!("/api/register?key={SECRET}&url=r1&count=1")).await;
    let (status, body) = post(&app, &format!("/api/delete?key={SECRET}&url=ghost")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({"r1": 1}));
}

#[tokio::test]
async fn test_poll_with_unknown_or_malformed_token() {
    let (app, _dir) = fresh_app().await;

    let unknown = uuid::Uuid::new_v4();
    let (status, body) = post(&app, &format!("/api/poll?uuid={unknown}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "nouuid");

    let (status, body) = post(&app, "/api/poll?uuid=not-a-token").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "nouuid");

    let (status, _) = post(&app, "/api/poll").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // sentinel answers never mutate the table
    let (_, body) = get(&app, "/api/state").await;
    assert_eq!(json(&body), serde_json::json!({}));
}

#[tokio::test]
async fn test_client_flow_end_to_end() {
    let (app, _dir) = fresh_app().await;

    post(&app, &format!("/api/register?key={SECRET}&url=r1&count=2")).await;

    let (_, c1) = post(&app, "/api/register_client").await;
    let (_, assigned) = post(&app, &format!("/api/poll?uuid={c1}")).await;
    assert_eq!(assigned, "r1");

    let (_, c2) = post(&app, "/api/register_client").await;
    let (_, assigned) = post(&app, &format!("/api/poll?uuid={c2}")).await;
    assert_eq!(assigned, "r1");

    let (_, body) = get(&app, "/api/state").await;
    assert_eq!(json(&body), serde_json::json!({"r1": 0}));

    // capacity exhausted: the next client waits
    let (_, c3) = post(&app, "/api/register_client").await;
    let (_, answer) = post(&app, &format!("/api/poll?uuid={c3}")).await;
    assert_eq!(answer, "wait");

    // freeing one slot reserves it for the waiting client
    let (_, body) = post(&app, &format!("/api/free?key={SECRET}&url=r1&count=1")).await;
    assert_eq!(json(&body), serde_json::json!({"r1": 0}));
    let (_, answer) = post(&app, &format!("/api/poll?uuid={c3}")).await;
    assert_eq!(answer, "r1");

    // the delivered token is spent
    let (_, answer) = post(&app, &format!("/api/poll?uuid={c3}")).await;
    assert_eq!(answer, "nouuid");
}

#[tokio::test]
async fn test_room_table_survives_restart_but_clients_do_not() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("rooms.json");

    let app = build_app(&state_file).await;
    post(&app, &format!("/api/register?key={SECRET}&url=r1&count=2")).await;
    let (_, token) = post(&app, "/api/register_client").await;
    drop(app);

    let app = build_app(&state_file).await;
    let (_, body) = get(&app, "/api/state").await;
    assert_eq!(json(&body), serde_json::json!({"r1": 2}));

    let (_, answer) = post(&app, &format!("/api/poll?uuid={token}")).await;
    assert_eq!(answer, "nouuid");
}
