//! Service resolution.
//!
//! # Responsibilities
//! - Look a service key up in the cold table, then the project's hot table,
//!   then the global hot table
//! - Load hot entries fresh on every call
//! - Contain load failures behind a fallback handler
//!
//! # Design Decisions
//! - Cold hits are returned as-is, never reloaded
//! - A broken hot file is reported and answered with a 500 handler; the
//!   request still completes
//! - Explicit `None` rather than a silent default when nothing matches

use std::path::Path;
use std::sync::Arc;

use crate::handler::{self, Handler, HandlerLoader};
use crate::observability::errors::ErrorReporter;
use crate::observability::metrics;
use crate::routing::{ColdTable, HotTable, ProjectRegistry, ServiceTables};

/// Resolves service keys to handlers.
pub struct ServiceResolver {
    cold: ColdTable,
    hot: HotTable,
    projects: Arc<ProjectRegistry>,
    loader: Arc<dyn HandlerLoader>,
    reporter: ErrorReporter,
}

impl ServiceResolver {
    pub fn new(
        tables: ServiceTables,
        projects: Arc<ProjectRegistry>,
        loader: Arc<dyn HandlerLoader>,
        reporter: ErrorReporter,
    ) -> Self {
        Self {
            cold: tables.cold,
            hot: tables.hot,
            projects,
            loader,
            reporter,
        }
    }

    /// Resolve `key`, optionally scoped to `project`.
    pub fn resolve(&self, key: &str, project: Option<&str>) -> Option<Handler> {
        if let Some(handler) = self.cold.get(key) {
            return Some(handler.clone());
        }

        if let Some(project) = project {
            if let Some(path) = self.projects.lookup(project, key) {
                tracing::debug!(key, project, file = %path.display(), "Reloading project service");
                metrics::record_hot_load("project");
                return Some(self.load_hot(&path, key));
            }
        }

        let path = self.hot.get(key)?;
        tracing::debug!(key, file = %path.display(), "Reloading service");
        metrics::record_hot_load("global");
        Some(self.load_hot(path, key))
    }

    fn load_hot(&self, path: &Path, key: &str) -> Handler {
        match self.loader.load_file(path, key) {
            Ok(handler) => handler,
            Err(e) => {
                tracing::warn!(key, file = %path.display(), "Module error");
                self.reporter.report(key, &e);
                handler::module_load_failed()
            }
        }
    }

    pub fn cold_len(&self) -> usize {
        self.cold.len()
    }

    pub fn hot_len(&self) -> usize {
        self.hot.len()
    }
}
