//! Handler definitions and loading.
//!
//! # Data Flow
//! ```text
//! definition file (.json)
//!     → loader.rs (read, parse, unwrap same-named property)
//!     → script.rs ("$mock" object → invocable script)
//!     → Handler::Static | Handler::Invocable
//!
//! On invocation:
//!     script.rs (pick case by params)
//!     → template.rs (render reply strings against {path, param})
//!     → JSON result with optional `_status` / `_timeout`
//! ```
//!
//! # Design Decisions
//! - Loading is an explicit capability (`HandlerLoader`), never a hidden cache
//! - Handlers are a closed enum, not duck-typed values
//! - Invocation errors carry a message only; reporting is the caller's job

pub mod loader;
pub mod script;
pub mod template;

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

pub use loader::{HandlerLoader, JsonLoader, LoadError};

/// Signature of an invocable handler: `(service key, params) -> result`.
pub type InvokeFn = dyn Fn(&str, &Value) -> Result<Value, HandlerError> + Send + Sync;

/// A resolved service.
#[derive(Clone)]
pub enum Handler {
    /// Called with the normalized path and decoded params on every request.
    Invocable(Arc<InvokeFn>),
    /// Served as-is.
    Static(Value),
}

impl Handler {
    /// Wrap a closure as an invocable handler.
    pub fn invocable<F>(f: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        Handler::Invocable(Arc::new(f))
    }

    pub fn is_invocable(&self) -> bool {
        matches!(self, Handler::Invocable(_))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Invocable(_) => f.write_str("Handler::Invocable(..)"),
            Handler::Static(value) => f.debug_tuple("Handler::Static").field(value).finish(),
        }
    }
}

/// Error raised by a handler while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Handler served in place of a hot file that failed to load.
pub fn module_load_failed() -> Handler {
    Handler::invocable(|path, _param| {
        Ok(json!({
            "_status": 500,
            "path": path,
            "msg": "module require fail",
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_load_failed_reports_500() {
        let handler = module_load_failed();
        let Handler::Invocable(f) = handler else {
            panic!("fallback must be invocable");
        };
        let result = f("foo_bar", &json!({})).unwrap();
        assert_eq!(result["_status"], 500);
        assert_eq!(result["path"], "foo_bar");
        assert_eq!(result["msg"], "module require fail");
    }

    #[test]
    fn test_debug_hides_closure() {
        let handler = Handler::invocable(|_, _| Ok(Value::Null));
        assert_eq!(format!("{:?}", handler), "Handler::Invocable(..)");
        assert!(handler.is_invocable());
        assert!(!Handler::Static(json!(1)).is_invocable());
    }
}
