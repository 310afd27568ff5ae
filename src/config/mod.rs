//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! mockservice.toml
//!     → loader.rs (parse & deserialize, resolve relative dirs)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!
//! mock tree, per directory:
//!     ms-config.toml
//!     → dir.rs (override, inherit parent rules)
//!     → DirConfig passed down the scan
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod dir;
pub mod loader;
pub mod schema;
pub mod validation;

pub use dir::DirConfig;
pub use loader::{load_config, ConfigError};
pub use schema::{LocationConfig, MockConfig, ProjectEntry, ServerConfig};
