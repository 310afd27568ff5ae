//! Error reporting for handler failures.
//!
//! Every report is emitted as a `tracing` error event. When an error log file
//! is configured, the report is also appended to it as
//! `<context>\n<error chain>\n\n`.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Shared error-reporting collaborator.
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    log_file: Option<PathBuf>,
}

impl ErrorReporter {
    /// Reporter that only logs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reporter that also appends to `path` (relative paths are taken from
    /// the working directory).
    pub fn with_log_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = if path.is_relative() {
            std::env::current_dir()
                .map(|cwd| cwd.join(&path))
                .unwrap_or(path)
        } else {
            path
        };
        Self {
            log_file: Some(path),
        }
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Report `error` raised while serving `context` (usually a service key).
    pub fn report(&self, context: &str, error: &dyn std::error::Error) {
        tracing::error!(context, error = %error, "Mock handler failed");

        if let Some(path) = &self.log_file {
            if let Err(e) = append(path, context, error) {
                tracing::warn!(file = %path.display(), error = %e, "Failed to append error log");
            }
        }
    }
}

fn append(path: &Path, context: &str, error: &dyn std::error::Error) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", context)?;
    writeln!(file, "{}", error)?;
    let mut source = error.source();
    while let Some(cause) = source {
        writeln!(file, "caused by: {}", cause)?;
        source = cause.source();
    }
    writeln!(file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerError;
    use tempfile::TempDir;

    #[test]
    fn test_report_appends_to_log_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ms-error-log");
        let reporter = ErrorReporter::with_log_file(&path);

        reporter.report("foo_bar", &HandlerError::new("boom"));
        reporter.report("baz_qux", &HandlerError::new("bang"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "foo_bar\nboom\n\nbaz_qux\nbang\n\n");
    }

    #[test]
    fn test_report_without_file_only_logs() {
        let reporter = ErrorReporter::new();
        assert!(reporter.log_file().is_none());
        reporter.report("foo_bar", &HandlerError::new("boom"));
    }

    #[test]
    fn test_unwritable_log_file_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let reporter = ErrorReporter::with_log_file(dir.path().join("missing/dir/log"));
        reporter.report("foo_bar", &HandlerError::new("boom"));
    }
}
