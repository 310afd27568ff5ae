//! Shared utilities for integration tests.

use std::fs;
use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use mockservice::config::ServerConfig;
use mockservice::lifecycle::startup;
use mockservice::HttpServer;

/// Write `content` to `root/rel`, creating parent directories.
pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Config for a mock tree at `dir` without the artificial delay.
pub fn config_for(dir: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.mock.dir = Some(dir.to_path_buf());
    config.mock.response_delay_ms = 0;
    config
}

/// Build the full router (middleware included) for `config`.
pub fn router(config: &ServerConfig) -> Router {
    let service = startup::build_service(config).unwrap();
    HttpServer::new(config.clone(), service).router()
}

/// Send `request` through `router`, returning status, JSON body and request ID.
#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body, request_id)
}

/// `GET uri`
#[allow(dead_code)]
pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body, _) = send(router, request).await;
    (status, body)
}

/// `POST uri` with a form body.
#[allow(dead_code)]
pub async fn post_form(router: &Router, uri: &str, form: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    let (status, body, _) = send(router, request).await;
    (status, body)
}
