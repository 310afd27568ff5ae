//! Response envelopes and serialization.
//!
//! # Responsibilities
//! - Build the fixed bodies for client errors, misses and failures
//! - Strip the transient `_status` / `_timeout` control fields from results
//! - Serialize bodies as pretty JSON with the mock content type
//!
//! # Design Decisions
//! - The missing-path body keeps its historical `staus` field name; existing
//!   clients read it
//! - Control fields are removed before serialization, never sent

use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Result field overriding the HTTP status.
pub const STATUS_OVERRIDE: &str = "_status";

/// Result field overriding the response delay, in milliseconds.
pub const TIMEOUT_OVERRIDE: &str = "_timeout";

/// Status used when neither query nor body name a path.
pub const MISSING_PATH_STATUS: StatusCode = StatusCode::MULTIPLE_CHOICES;

pub fn missing_path() -> Value {
    json!({ "staus": 300, "data": "request path undefined" })
}

pub fn not_found() -> Value {
    json!({ "status": 404, "msg": "service not found" })
}

pub fn handler_failed(message: &str) -> Value {
    json!({ "status": 500, "msg": message })
}

pub fn no_result(path: &str) -> Value {
    json!({ "status": 500, "path": path, "data": "no result defined" })
}

pub fn invalid_param(message: &str) -> Value {
    json!({ "status": 400, "msg": message })
}

/// `{ "status": <code>, "data": <result> }`
pub fn envelope(status: StatusCode, data: Value) -> Value {
    json!({ "status": status.as_u16(), "data": data })
}

/// Remove `_status` and return it if it names a valid HTTP status.
pub fn take_status(value: &mut Value) -> Option<StatusCode> {
    let raw = value.as_object_mut()?.remove(STATUS_OVERRIDE)?;
    raw.as_u64()
        .and_then(|code| u16::try_from(code).ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
}

/// Remove `_timeout` and return it as a delay.
pub fn take_timeout(value: &mut Value) -> Option<Duration> {
    let raw = value.as_object_mut()?.remove(TIMEOUT_OVERRIDE)?;
    raw.as_u64().map(Duration::from_millis)
}

/// JSON truthiness: `null`, `false`, `0` and `""` count as no result.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Serialize `body` as the HTTP response.
pub fn render(status: StatusCode, body: &Value) -> Response {
    let text = serde_json::to_string_pretty(body).unwrap_or_else(|_| "null".to_string());
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        text,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_status_strips_field() {
        let mut v = json!({ "_status": 201, "a": 1 });
        assert_eq!(take_status(&mut v), Some(StatusCode::CREATED));
        assert_eq!(v, json!({ "a": 1 }));
    }

    #[test]
    fn test_take_status_invalid_still_stripped() {
        let mut v = json!({ "_status": "teapot", "a": 1 });
        assert_eq!(take_status(&mut v), None);
        assert_eq!(v, json!({ "a": 1 }));

        let mut v = json!({ "_status": 70000 });
        assert_eq!(take_status(&mut v), None);

        let mut v = json!([1]);
        assert_eq!(take_status(&mut v), None);
    }

    #[test]
    fn test_take_timeout() {
        let mut v = json!({ "_timeout": 0, "b": true });
        assert_eq!(take_timeout(&mut v), Some(Duration::ZERO));
        assert_eq!(v, json!({ "b": true }));
        assert_eq!(take_timeout(&mut json!({ "b": true })), None);
    }

    #[test]
    fn test_falsy_values() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(is_falsy(&v), "{} should be falsy", v);
        }
        for v in [json!(true), json!(1), json!("x"), json!([]), json!({})] {
            assert!(!is_falsy(&v), "{} should be truthy", v);
        }
    }

    #[tokio::test]
    async fn test_render_sets_content_type() {
        let response = render(StatusCode::NOT_FOUND, &not_found());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=UTF-8"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "status": 404, "msg": "service not found" }));
    }
}
