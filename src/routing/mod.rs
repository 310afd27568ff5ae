//! Service discovery and resolution.
//!
//! # Data Flow
//! ```text
//! Table Construction (at startup):
//!     mock root dir
//!     → scanner.rs (walk tree, apply ms-config.toml, index.json)
//!     → matcher.rs (file name qualifies?)
//!     → ColdTable (loaded handlers) + HotTable (file paths)
//!
//!     [[mock.projects]]
//!     → registry.rs (walk tree with fallback rules)
//!     → one HotTable per project
//!
//! Per Request:
//!     service key (+ optional project)
//!     → resolver.rs (cold → project hot → global hot)
//!     → Handler or NoMatch
//! ```
//!
//! # Design Decisions
//! - Cold and global hot tables are immutable once built
//! - Hot entries are loaded fresh on every resolution
//! - Cold always wins over hot for the same key
//! - Service keys are flat; directory depth is not part of the key

pub mod matcher;
pub mod registry;
pub mod resolver;
pub mod scanner;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::handler::Handler;

pub use registry::ProjectRegistry;
pub use resolver::ServiceResolver;
pub use scanner::{DirectoryScanner, ScanError};

/// Service key → handler loaded once at startup.
pub type ColdTable = HashMap<String, Handler>;

/// Service key → definition file reloaded on every resolution.
pub type HotTable = HashMap<String, PathBuf>;

/// Tables produced by a directory scan.
#[derive(Debug, Default)]
pub struct ServiceTables {
    pub cold: ColdTable,
    pub hot: HotTable,
}
