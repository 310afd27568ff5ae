//! mockservice server.
//!
//! # Architecture Overview
//!
//! ```text
//!   startup                                   per request
//!   ───────                                   ───────────
//!   mockservice.toml                          ?path=foo/bar&param={...}
//!        │                                         │
//!        ▼                                         ▼
//!   DirectoryScanner ──▶ ColdTable           RequestDispatcher
//!        │          └──▶ HotTable                  │  path → foo_bar
//!        ▼                    │                    ▼
//!   ProjectRegistry ──▶ project HotTables ──▶ ServiceResolver
//!                                                  │  cold → project → global
//!                                                  ▼
//!                                           Handler (static | script)
//!                                                  │
//!                                                  ▼
//!                                    delay → { "status": 200, "data": ... }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use mockservice::config::{load_config, ServerConfig};
use mockservice::lifecycle::{signals, startup, Shutdown};
use mockservice::observability::{logging, metrics};
use mockservice::HttpServer;

#[derive(Parser)]
#[command(name = "mockservice")]
#[command(about = "Serve programmable mock responses from a directory tree", long_about = None)]
struct Cli {
    /// Server configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file).
    #[arg(short, long)]
    port: Option<u16>,

    /// Mock root directory (overrides the config file).
    #[arg(short, long)]
    dir: Option<PathBuf>,
}

impl Cli {
    fn load(&self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(dir) = &self.dir {
            config.mock.dir = Some(dir.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(logging::DEFAULT_FILTER);

    tracing::info!("mockservice v{} starting", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = cli.load()?;

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        mock_dir = ?config.mock.dir,
        projects = config.mock.projects.len(),
        response_delay_ms = config.mock.response_delay_ms,
        "Configuration loaded"
    );

    // Installed first so the table-size gauges recorded by the scan are kept.
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let service = startup::build_service(&config)?;

    let listener = startup::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let grace = Duration::from_secs(config.lifecycle.shutdown_grace_secs);
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger_after(grace).await;
    });

    let server = HttpServer::new(config, service);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
