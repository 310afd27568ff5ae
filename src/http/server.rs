//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the mock handlers
//! - Mount project-scoped locations ahead of the default handler
//! - Wire up middleware (tracing, request ID, body read timeout)
//!
//! # Design Decisions
//! - The timeout bounds receiving the request body only; a mocked
//!   `_timeout` delay is never cut short
//! - Run until the shutdown signal fires

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::RequestBodyTimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::request::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use crate::service::MockService;

/// HTTP server for the mock service.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig, service: MockService) -> Self {
        let router = Self::build_router(&config, &service);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &ServerConfig, service: &MockService) -> Router {
        let mut router = Router::new();

        for location in &config.locations {
            let handler = service.request(location.project.as_deref());
            router = router
                .route(&location.prefix, handler.clone())
                .route(&format!("{}/{{*rest}}", location.prefix), handler);
        }

        router
            .fallback_service(service.request(None))
            .layer(RequestBodyTimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "mockservice start on port:{}", addr.port());

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the router, e.g. for driving it without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
