//! Programmable mock responses for frontend development.
//!
//! Services are discovered from a directory tree of JSON definition files.
//! Most are reloaded on every request, so edits take effect immediately;
//! directories marked `cache = true` and `index.json` aggregates are loaded
//! once at startup.

pub mod config;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod service;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use service::MockService;
