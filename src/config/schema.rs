//! Configuration schema definitions.
//!
//! This module defines the server configuration (`mockservice.toml`).
//! All types derive Serde traits for deserialization from config files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration for the mock server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Mock directories and dispatch behavior.
    pub mock: MockConfig,

    /// URL prefixes served with a project scope.
    pub locations: Vec<LocationConfig>,

    /// Error log settings.
    pub log_error: LogErrorConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Start/stop behavior.
    pub lifecycle: LifecycleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServerConfig {
    /// Resolve relative directories against `base` (the config file's directory).
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        if let Some(dir) = self.mock.dir.as_mut() {
            resolve(dir);
        }
        for entry in &mut self.mock.projects {
            if let Some(dir) = entry.dir.as_mut() {
                resolve(dir);
            }
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,
}

impl ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8181").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8181,
        }
    }
}

/// Mock tree and dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MockConfig {
    /// Root of the default service tables.
    pub dir: Option<PathBuf>,

    /// Delay applied to responses without `_timeout`, in milliseconds.
    pub response_delay_ms: u64,

    /// Pass undecodable `param` strings through as JSON strings.
    pub lenient_params: bool,

    /// Project-scoped mock trees, registered in order.
    pub projects: Vec<ProjectEntry>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dir: None,
            response_delay_ms: 50,
            lenient_params: false,
            projects: Vec::new(),
        }
    }
}

/// A `{project, dir}` pair. Entries missing either field are skipped.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProjectEntry {
    pub project: Option<String>,
    pub dir: Option<PathBuf>,
}

/// URL prefix routed to the mock service with a project scope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    /// Path prefix to match (e.g., "/get").
    pub prefix: String,

    /// Project whose hot table is consulted before the global one.
    #[serde(default)]
    pub project: Option<String>,
}

/// Error log configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LogErrorConfig {
    /// File handler failures are appended to.
    pub log_file: Option<PathBuf>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to receive a request body, in seconds. Response delays
    /// are not counted.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Delay between a stop request and closing the listener, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address the exporter listens on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9181".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.bind_address(), "0.0.0.0:8181");
        assert_eq!(config.mock.response_delay_ms, 50);
        assert_eq!(config.lifecycle.shutdown_grace_secs, 10);
        assert!(config.mock.dir.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            port = 8848

            [mock]
            dir = "response"
            response_delay_ms = 0

            [[mock.projects]]
            project = "aproject"
            dir = "aproject"

            [[mock.projects]]
            dir = "orphan"

            [[locations]]
            prefix = "/get"
            project = "aproject"

            [log_error]
            log_file = "ms-error-log"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 8848);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.mock.response_delay_ms, 0);
        assert_eq!(config.mock.projects.len(), 2);
        assert!(config.mock.projects[1].project.is_none());
        assert_eq!(config.locations[0].project.as_deref(), Some("aproject"));
        assert_eq!(config.log_error.log_file, Some(PathBuf::from("ms-error-log")));
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = ServerConfig::default();
        config.mock.dir = Some(PathBuf::from("response"));
        config.mock.projects.push(ProjectEntry {
            project: Some("a".into()),
            dir: Some(PathBuf::from("/abs/a")),
        });

        config.resolve_paths(Path::new("/srv/mocks"));
        assert_eq!(config.mock.dir, Some(PathBuf::from("/srv/mocks/response")));
        assert_eq!(config.mock.projects[0].dir, Some(PathBuf::from("/abs/a")));
    }
}
