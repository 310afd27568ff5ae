//! Definition file loading.
//!
//! # Responsibilities
//! - Read a definition file from disk on every call (no module cache)
//! - Unwrap an object whose own property matches the service key
//! - Compile `"$mock"` objects into invocable scripts
//! - Load aggregation files (`index.json`) as a batch of named handlers

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::handler::script::{MockScript, SCRIPT_KEY};
use crate::handler::template::Templates;
use crate::handler::Handler;

/// File extension of definition files; stripped to form the service key.
pub const DEFINITION_EXTENSION: &str = ".json";

/// Error produced while turning a definition file into a handler.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed definition {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid handler script for '{key}': {reason}")]
    Script { key: String, reason: String },

    #[error("aggregation file {path} must contain a JSON object")]
    NotAnObject { path: PathBuf },
}

/// Capability to compile definition sources into handlers.
///
/// Implementations must not cache: every `load_file` call reflects the file
/// as it is on disk at that moment.
pub trait HandlerLoader: Send + Sync {
    /// Compile an already-parsed definition for `key`.
    fn compile(&self, key: &str, value: Value) -> Result<Handler, LoadError>;

    /// Read and compile the definition file at `path`.
    fn load_file(&self, path: &Path, key: &str) -> Result<Handler, LoadError>;

    /// Read an aggregation file and compile each of its entries.
    fn load_aggregate(&self, path: &Path) -> Result<Vec<(String, Handler)>, LoadError>;
}

/// Loader for `.json` definition files.
#[derive(Clone)]
pub struct JsonLoader {
    templates: Arc<Templates>,
}

impl JsonLoader {
    pub fn new() -> Self {
        Self {
            templates: Arc::new(Templates::new()),
        }
    }

    fn read_json(path: &Path) -> Result<Value, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for JsonLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerLoader for JsonLoader {
    fn compile(&self, key: &str, value: Value) -> Result<Handler, LoadError> {
        let value = unwrap_named(key, value);

        let script = match value {
            Value::Object(mut fields) if fields.contains_key(SCRIPT_KEY) => {
                fields.remove(SCRIPT_KEY).unwrap_or(Value::Null)
            }
            other => return Ok(Handler::Static(other)),
        };

        let script = MockScript::from_value(script).map_err(|reason| LoadError::Script {
            key: key.to_string(),
            reason,
        })?;
        let templates = Arc::clone(&self.templates);

        Ok(Handler::invocable(move |path, param| {
            script.run(&templates, path, param)
        }))
    }

    fn load_file(&self, path: &Path, key: &str) -> Result<Handler, LoadError> {
        let value = Self::read_json(path)?;
        self.compile(key, value)
    }

    fn load_aggregate(&self, path: &Path) -> Result<Vec<(String, Handler)>, LoadError> {
        let Value::Object(entries) = Self::read_json(path)? else {
            return Err(LoadError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        entries
            .into_iter()
            .map(|(key, value)| {
                let handler = self.compile(&key, value)?;
                Ok((key, handler))
            })
            .collect()
    }
}

/// `{"foo_bar": X, ...}` loaded for key `foo_bar` becomes `X`.
fn unwrap_named(key: &str, value: Value) -> Value {
    match value {
        Value::Object(mut fields) if fields.contains_key(key) => {
            fields.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Derive the service key from a file name.
pub fn service_key(file_name: &str) -> &str {
    file_name
        .strip_suffix(DEFINITION_EXTENSION)
        .unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn invoke(handler: &Handler, path: &str, param: Value) -> Value {
        match handler {
            Handler::Invocable(f) => f(path, &param).unwrap(),
            Handler::Static(_) => panic!("expected invocable handler"),
        }
    }

    #[test]
    fn test_service_key_strips_extension() {
        assert_eq!(service_key("foo_bar.json"), "foo_bar");
        assert_eq!(service_key("foo_bar.json.bak"), "foo_bar.json.bak");
        assert_eq!(service_key("scookie"), "scookie");
    }

    #[test]
    fn test_plain_value_is_static() {
        let handler = JsonLoader::new().compile("k", json!({ "a": 1 })).unwrap();
        match handler {
            Handler::Static(v) => assert_eq!(v, json!({ "a": 1 })),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_same_named_property_is_unwrapped() {
        let loader = JsonLoader::new();
        let handler = loader
            .compile(
                "foo_bar",
                json!({ "foo_bar": { "$mock": { "reply": "{{path}}" } }, "other": 1 }),
            )
            .unwrap();
        assert_eq!(invoke(&handler, "foo_bar", json!({})), json!("foo_bar"));
    }

    #[test]
    fn test_bad_script_is_load_error() {
        let err = JsonLoader::new()
            .compile("k", json!({ "$mock": { "cases": "nope" } }))
            .unwrap_err();
        assert!(matches!(err, LoadError::Script { .. }));
    }

    #[test]
    fn test_load_file_reads_fresh_content() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("foo_bar.json");
        let loader = JsonLoader::new();

        fs::write(&file, r#"{"v": 1}"#).unwrap();
        let first = loader.load_file(&file, "foo_bar").unwrap();
        fs::write(&file, r#"{"v": 2}"#).unwrap();
        let second = loader.load_file(&file, "foo_bar").unwrap();

        assert!(matches!(first, Handler::Static(ref v) if v["v"] == 1));
        assert!(matches!(second, Handler::Static(ref v) if v["v"] == 2));
    }

    #[test]
    fn test_load_file_errors() {
        let dir = TempDir::new().unwrap();
        let loader = JsonLoader::new();

        let missing = loader.load_file(&dir.path().join("gone.json"), "gone");
        assert!(matches!(missing, Err(LoadError::Io { .. })));

        let broken = dir.path().join("broken_one.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            loader.load_file(&broken, "broken_one"),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_aggregate_requires_object() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("index.json");
        let loader = JsonLoader::new();

        fs::write(&index, "[1, 2]").unwrap();
        assert!(matches!(
            loader.load_aggregate(&index),
            Err(LoadError::NotAnObject { .. })
        ));

        fs::write(&index, r#"{"a_b": {"x": 1}, "c_d": {"$mock": {"reply": 2}}}"#).unwrap();
        let entries = loader.load_aggregate(&index).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|(k, h)| k == "c_d" && h.is_invocable()));
    }
}
