//! Shared helpers for API integration tests.
//!
//! `build_test_app` mirrors the production router construction so tests
//! exercise the same middleware stack (CORS, request ID, timeout,
//! tracing, panic recovery) that `main.rs` uses.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use reelforge_api::config::ServerConfig;
use reelforge_api::router::build_app_router;
use reelforge_api::state::AppState;
use reelforge_db::models::job::CreateJob;
use reelforge_db::repositories::JobRepo;
use reelforge_events::Ingest;
use reelforge_worker::PipelineClient;

/// Build a test `ServerConfig` with safe defaults.
///
/// The pipeline URL points at a port nothing listens on, so any
/// forward call fails fast with a connection error; tests that need a
/// reachable pipeline use [`spawn_stub_pipeline`] and override it.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        pipeline_url: "http://127.0.0.1:1".to_string(),
        webhook_secret: None,
        stream_poll_interval_ms: 10,
        stream_max_polls: 600,
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_config(pool, test_config())
}

/// Build the application router with a caller-supplied config (used by
/// tests that need a webhook secret, a reachable pipeline, or tight
/// stream poll bounds).
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let pipeline = Arc::new(PipelineClient::new(
        config.pipeline_url.clone(),
        config.webhook_secret.clone(),
    ));
    let ingest = Arc::new(Ingest::new(pool.clone()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ingest,
        pipeline,
    };

    build_app_router(state, &config)
}

/// Spawn a stub pipeline service that answers 200 `{"success": true}`
/// to everything. Returns its base URL; the task dies with the test
/// runtime.
pub async fn spawn_stub_pipeline() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub pipeline");
    let addr = listener.local_addr().expect("stub pipeline addr");

    let app = Router::new().fallback(|| async {
        axum::Json(serde_json::json!({ "success": true }))
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without an identity header.
pub async fn get(app: Router, path: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("build request"),
    )
    .await
    .expect("send request")
}

/// Send a GET request as `user`.
pub async fn get_as(app: Router, path: &str, user: Uuid) -> Response {
    app.oneshot(
        Request::builder()
            .uri(path)
            .header("x-user-id", user.to_string())
            .body(Body::empty())
            .expect("build request"),
    )
    .await
    .expect("send request")
}

/// Send a POST request with a JSON body as `user`.
pub async fn post_json_as(app: Router, path: &str, user: Uuid, body: Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .header("x-user-id", user.to_string())
            .body(Body::from(body.to_string()))
            .expect("build request"),
    )
    .await
    .expect("send request")
}

/// Send a raw-body request with the given method and extra headers
/// (used by webhook tests, which sign the exact body bytes).
pub async fn send_raw(
    app: Router,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Vec<u8>,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.oneshot(builder.body(Body::from(body)).expect("build request"))
        .await
        .expect("send request")
}

/// Read a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is valid JSON")
}

/// Read a response body as a UTF-8 string (SSE streams).
pub async fn body_string(response: Response) -> String {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body is valid UTF-8")
}

/// Assert an error response has the standard shape and code.
pub async fn assert_error(response: Response, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code);
    assert!(json["error"].is_string());
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Insert a fresh queued job owned by `user_id` and return its id.
pub async fn seed_job(pool: &PgPool, user_id: Uuid) -> Uuid {
    let input = CreateJob {
        id: Uuid::new_v4(),
        chat_id: Uuid::new_v4(),
        avatar_dna: None,
        avatar_ref_images: None,
        generation_settings: None,
    };
    let job = JobRepo::create(pool, user_id, &input, None)
        .await
        .expect("seed job");
    job.id
}
