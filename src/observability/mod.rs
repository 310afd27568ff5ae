//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → errors.rs (handler failure reports, optional error log file)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//!     → ms-error-log style append-only file
//! ```
//!
//! # Design Decisions
//! - Structured logging with key/value fields
//! - Request ID flows through the trace layer
//! - Metrics are cheap (no-ops until an exporter is installed)

pub mod errors;
pub mod logging;
pub mod metrics;

pub use errors::ErrorReporter;
