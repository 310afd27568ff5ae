//! The mock service facade.
//!
//! Builds the service tables from a [`MockConfig`], registers projects, and
//! exposes request handling both to the standalone server and to host
//! applications that mount the service inside their own axum router.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::RawQuery;
use axum::response::Response;
use axum::routing::{any, MethodRouter};

use crate::config::dir::DirConfig;
use crate::config::schema::{MockConfig, ProjectEntry};
use crate::handler::{HandlerLoader, JsonLoader};
use crate::http::dispatch::{DispatchOptions, DispatchRequest, RequestDispatcher};
use crate::observability::errors::ErrorReporter;
use crate::observability::metrics;
use crate::routing::{DirectoryScanner, ProjectRegistry, ScanError, ServiceResolver, ServiceTables};

/// Configured mock service, cheap to clone.
#[derive(Clone)]
pub struct MockService {
    inner: Arc<Inner>,
}

struct Inner {
    dispatcher: RequestDispatcher,
    projects: Arc<ProjectRegistry>,
    effective: Option<DirConfig>,
}

impl MockService {
    /// Scan `config.dir` and register `config.projects` with the JSON loader.
    pub fn configure(config: &MockConfig, reporter: ErrorReporter) -> Result<Self, ScanError> {
        Self::with_loader(config, Arc::new(JsonLoader::new()), reporter)
    }

    /// Same as [`MockService::configure`] with a custom loader.
    pub fn with_loader(
        config: &MockConfig,
        loader: Arc<dyn HandlerLoader>,
        reporter: ErrorReporter,
    ) -> Result<Self, ScanError> {
        let (tables, effective) = match &config.dir {
            Some(dir) => {
                let mut scanner = DirectoryScanner::new(loader.as_ref());
                let effective = scanner.scan(dir)?;
                (scanner.into_tables(), Some(effective))
            }
            None => (ServiceTables::default(), None),
        };

        tracing::info!(
            dir = ?config.dir,
            cold = tables.cold.len(),
            hot = tables.hot.len(),
            "Service tables built"
        );
        metrics::record_table_sizes(tables.cold.len(), tables.hot.len());

        let projects = Arc::new(ProjectRegistry::new());
        let resolver =
            ServiceResolver::new(tables, Arc::clone(&projects), loader, reporter.clone());
        let options = DispatchOptions {
            default_delay: Duration::from_millis(config.response_delay_ms),
            lenient_params: config.lenient_params,
        };

        let service = Self {
            inner: Arc::new(Inner {
                dispatcher: RequestDispatcher::new(Arc::new(resolver), reporter, options),
                projects,
                effective,
            }),
        };
        service.register_projects(&config.projects)?;
        Ok(service)
    }

    /// Register each complete `{project, dir}` pair in order.
    pub fn register_projects(&self, entries: &[ProjectEntry]) -> Result<(), ScanError> {
        for entry in entries {
            match (entry.project.as_deref(), entry.dir.as_deref()) {
                (Some(project), Some(dir)) if !project.is_empty() => {
                    self.register_project(project, dir)?;
                }
                _ => {
                    tracing::warn!(
                        project = ?entry.project,
                        dir = ?entry.dir,
                        "Skipping incomplete project entry"
                    );
                }
            }
        }
        Ok(())
    }

    /// Register one project; a second registration of the same name is ignored.
    pub fn register_project(&self, project: &str, dir: &Path) -> Result<bool, ScanError> {
        self.inner.projects.register(project, dir)
    }

    /// Configuration that was active for the mock root, if one was scanned.
    pub fn effective_config(&self) -> Option<&DirConfig> {
        self.inner.effective.as_ref()
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.inner.dispatcher
    }

    pub fn projects(&self) -> &ProjectRegistry {
        &self.inner.projects
    }

    /// Answer one buffered request.
    pub async fn handle(
        &self,
        query: Option<&str>,
        body: &[u8],
        project: Option<&str>,
    ) -> Response {
        let request = DispatchRequest {
            query,
            body,
            project,
        };
        self.inner.dispatcher.respond(request).await
    }

    /// Request handler for mounting in a host router.
    ///
    /// The returned route answers every method itself, so no other route or
    /// fallback of the host sees the request.
    pub fn request(&self, project: Option<&str>) -> MethodRouter {
        let service = self.clone();
        let project: Option<Arc<str>> = project.map(Arc::from);

        any(move |RawQuery(query): RawQuery, body: Bytes| {
            let service = service.clone();
            let project = project.clone();
            async move {
                service
                    .handle(query.as_deref(), &body, project.as_deref())
                    .await
            }
        })
    }
}
