//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! query string + form body
//!     → params.rs (path, param; body wins)
//!     → normalize path ('/' → '_')
//!     → ServiceResolver (cold → project hot → global hot)
//!     → invoke / serve static
//!     → DispatchOutcome { status, body, delay }
//!     → sleep(delay) → pretty JSON response
//! ```
//!
//! # Design Decisions
//! - Every failure is contained in this request's response
//! - Handler errors are reported; empty results are not
//! - `dispatch` is synchronous; only `respond` awaits (the delay)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::handler::Handler;
use crate::http::params::RequestInput;
use crate::http::response;
use crate::observability::errors::ErrorReporter;
use crate::observability::metrics;
use crate::routing::ServiceResolver;

/// Default response delay.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

/// Dispatcher tuning.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Delay applied when the result carries no `_timeout`.
    pub default_delay: Duration,

    /// Pass undecodable `param` strings through instead of rejecting them.
    pub lenient_params: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            default_delay: DEFAULT_DELAY,
            lenient_params: false,
        }
    }
}

/// One inbound request, already buffered.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchRequest<'a> {
    pub query: Option<&'a str>,
    pub body: &'a [u8],
    pub project: Option<&'a str>,
}

/// How a request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    MissingPath,
    InvalidParam,
    NotFound,
    Static,
    Invoked,
    HandlerFailed,
    NoResult,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::MissingPath => "missing_path",
            Outcome::InvalidParam => "invalid_param",
            Outcome::NotFound => "not_found",
            Outcome::Static => "static",
            Outcome::Invoked => "invoked",
            Outcome::HandlerFailed => "handler_failed",
            Outcome::NoResult => "no_result",
        }
    }
}

/// Status, body and delay decided for a request.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub outcome: Outcome,
    pub status: StatusCode,
    pub body: Value,
    pub delay: Duration,
    /// Normalized service key, once known.
    pub key: Option<String>,
}

/// Turns requests into responses through the resolver.
pub struct RequestDispatcher {
    resolver: Arc<ServiceResolver>,
    reporter: ErrorReporter,
    options: DispatchOptions,
}

impl RequestDispatcher {
    pub fn new(
        resolver: Arc<ServiceResolver>,
        reporter: ErrorReporter,
        options: DispatchOptions,
    ) -> Self {
        Self {
            resolver,
            reporter,
            options,
        }
    }

    pub fn resolver(&self) -> &ServiceResolver {
        &self.resolver
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Decide the response for `request` without waiting.
    pub fn dispatch(&self, request: DispatchRequest<'_>) -> DispatchOutcome {
        let input = RequestInput::extract(request.query, request.body);

        let param = match input.decode_param(self.options.lenient_params) {
            Ok(param) => param,
            Err(e) => {
                tracing::warn!(error = %e, "Rejecting request with undecodable param");
                let body = response::invalid_param(&e.to_string());
                return self.fixed(Outcome::InvalidParam, StatusCode::BAD_REQUEST, body, None);
            }
        };

        // Answered immediately, without the default delay.
        let Some(path) = input.path else {
            return DispatchOutcome {
                delay: Duration::ZERO,
                ..self.fixed(
                    Outcome::MissingPath,
                    response::MISSING_PATH_STATUS,
                    response::missing_path(),
                    None,
                )
            };
        };

        let key = normalize_path(&path);

        // A definition that is itself empty counts as undefined.
        let handler = match self.resolver.resolve(&key, request.project) {
            Some(Handler::Static(value)) if response::is_falsy(&value) => None,
            other => other,
        };
        let Some(handler) = handler else {
            tracing::debug!(key = %key, project = ?request.project, "Service not found");
            let body = response::not_found();
            return self.fixed(Outcome::NotFound, StatusCode::NOT_FOUND, body, Some(key));
        };

        match handler {
            Handler::Static(mut value) => {
                let delay = response::take_timeout(&mut value);
                let status = response::take_status(&mut value).unwrap_or(StatusCode::OK);
                self.finish(Outcome::Static, status, value, delay, key)
            }
            Handler::Invocable(f) => match f(&key, &param) {
                Err(e) => {
                    self.reporter.report(&key, &e);
                    let body = response::handler_failed(e.message());
                    self.fixed(
                        Outcome::HandlerFailed,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        body,
                        Some(key),
                    )
                }
                Ok(result) if response::is_falsy(&result) => {
                    tracing::warn!(key = %key, "Handler returned no result");
                    let body = response::no_result(&key);
                    self.fixed(
                        Outcome::NoResult,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        body,
                        Some(key),
                    )
                }
                Ok(mut result) => {
                    let delay = response::take_timeout(&mut result);
                    let status = response::take_status(&mut result).unwrap_or(StatusCode::OK);
                    let body = response::envelope(status, result);
                    self.finish(Outcome::Invoked, status, body, delay, key)
                }
            },
        }
    }

    /// Dispatch, wait out the delay, and serialize.
    pub async fn respond(&self, request: DispatchRequest<'_>) -> Response {
        let start = Instant::now();
        let outcome = self.dispatch(request);

        tracing::debug!(
            key = ?outcome.key,
            outcome = outcome.outcome.as_str(),
            status = outcome.status.as_u16(),
            delay_ms = outcome.delay.as_millis() as u64,
            "Dispatched mock request"
        );

        if !outcome.delay.is_zero() {
            tokio::time::sleep(outcome.delay).await;
        }

        metrics::record_dispatch(outcome.outcome.as_str(), outcome.status.as_u16(), start);
        response::render(outcome.status, &outcome.body)
    }

    fn fixed(
        &self,
        outcome: Outcome,
        status: StatusCode,
        body: Value,
        key: Option<String>,
    ) -> DispatchOutcome {
        DispatchOutcome {
            outcome,
            status,
            body,
            delay: self.options.default_delay,
            key,
        }
    }

    fn finish(
        &self,
        outcome: Outcome,
        status: StatusCode,
        body: Value,
        delay: Option<Duration>,
        key: String,
    ) -> DispatchOutcome {
        DispatchOutcome {
            outcome,
            status,
            body,
            delay: delay.unwrap_or(self.options.default_delay),
            key: Some(key),
        }
    }
}

/// Fold path separators into a flat service key.
pub fn normalize_path(path: &str) -> String {
    path.replace('/', "_")
}
