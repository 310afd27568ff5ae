//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the error reporter from `[log_error]`
//! - Scan the mock tree and register projects
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: a broken mock tree aborts startup
//! - Subsystems initialize in order, not concurrently

use std::io;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::schema::{ListenerConfig, ServerConfig};
use crate::observability::errors::ErrorReporter;
use crate::routing::ScanError;
use crate::service::MockService;

/// Fatal startup failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build service tables: {0}")]
    Scan(#[from] ScanError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}

/// Error reporter described by the configuration.
pub fn error_reporter(config: &ServerConfig) -> ErrorReporter {
    match &config.log_error.log_file {
        Some(path) => ErrorReporter::with_log_file(path),
        None => ErrorReporter::new(),
    }
}

/// Scan the mock tree and register every configured project.
pub fn build_service(config: &ServerConfig) -> Result<MockService, StartupError> {
    let service = MockService::configure(&config.mock, error_reporter(config))?;

    if let Some(effective) = service.effective_config() {
        tracing::info!(
            cache = effective.cache,
            custom = effective.custom,
            rules = effective.match_rules.len(),
            "Root mock configuration"
        );
    }

    Ok(service)
}

/// Bind the TCP listener.
pub async fn bind(listener: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let address = listener.bind_address();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_service_fails_fast_on_broken_tree() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.json"), "{ nope").unwrap();

        let mut config = ServerConfig::default();
        config.mock.dir = Some(dir.path().to_path_buf());
        assert!(matches!(build_service(&config), Err(StartupError::Scan(_))));
    }

    #[test]
    fn test_table_sizes_reach_installed_recorder() {
        use metrics_exporter_prometheus::PrometheusBuilder;

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.json"), r#"{"a_b": 1, "c_d": 2}"#).unwrap();
        std::fs::write(dir.path().join("user_list.json"), "[]").unwrap();

        let mut config = ServerConfig::default();
        config.mock.dir = Some(dir.path().to_path_buf());

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        ::metrics::with_local_recorder(&recorder, || build_service(&config)).unwrap();

        let rendered = handle.render();
        assert!(rendered.contains("mockservice_cold_services 2"), "{}", rendered);
        assert!(rendered.contains("mockservice_hot_services 1"), "{}", rendered);
    }

    #[test]
    fn test_error_reporter_from_config() {
        let mut config = ServerConfig::default();
        assert!(error_reporter(&config).log_file().is_none());

        config.log_error.log_file = Some("/tmp/ms-error-log".into());
        assert_eq!(
            error_reporter(&config).log_file(),
            Some(std::path::Path::new("/tmp/ms-error-log"))
        );
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let config = ListenerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        };
        let listener = bind(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
