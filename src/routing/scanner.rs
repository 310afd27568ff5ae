//! Directory scanning.
//!
//! # Responsibilities
//! - Walk the mock root recursively, skipping dot entries
//! - Register every `index.json` entry as a cold service
//! - Apply `ms-config.toml` overrides to a directory and its descendants
//! - Route matched files to the cold table (cache on) or hot table (cache off)
//!
//! # Design Decisions
//! - The active configuration is passed by value into each recursive call,
//!   so a subtree's override can never leak into siblings or the parent
//! - Entries are visited in name order; later duplicates overwrite earlier ones
//! - Any failure aborts the scan: a half-built table must not be served

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::dir::{DirConfig, AGGREGATE_FILE, LOCAL_CONFIG_FILE};
use crate::handler::loader::service_key;
use crate::handler::{HandlerLoader, LoadError};
use crate::routing::{matcher, HotTable, ServiceTables};

/// Error aborting a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read local config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed local config {path}: {source}")]
    LocalConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Builds the default service tables from a mock directory tree.
pub struct DirectoryScanner<'a> {
    loader: &'a dyn HandlerLoader,
    tables: ServiceTables,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(loader: &'a dyn HandlerLoader) -> Self {
        Self {
            loader,
            tables: ServiceTables::default(),
        }
    }

    /// Scan `root` starting from the default configuration.
    ///
    /// Returns the configuration that was active for `root` itself.
    pub fn scan(&mut self, root: &Path) -> Result<DirConfig, ScanError> {
        self.scan_with(root, &DirConfig::default())
    }

    /// Scan `dir` with `inherited` as the ancestor configuration.
    pub fn scan_with(&mut self, dir: &Path, inherited: &DirConfig) -> Result<DirConfig, ScanError> {
        let aggregate = dir.join(AGGREGATE_FILE);
        if aggregate.is_file() {
            for (key, handler) in self.loader.load_aggregate(&aggregate)? {
                tracing::debug!(key = %key, file = %aggregate.display(), "Registered cold service");
                self.tables.cold.insert(key, handler);
            }
        }

        let local = dir.join(LOCAL_CONFIG_FILE);
        let active = if local.is_file() {
            let config = read_local_config(&local, inherited)?;
            tracing::debug!(
                dir = %dir.display(),
                cache = config.cache,
                rules = config.match_rules.len(),
                "Applying local config"
            );
            config
        } else {
            inherited.clone()
        };

        for entry in list_entries(dir)? {
            if entry.is_dir {
                self.scan_with(&entry.path, &active)?;
                continue;
            }

            if !matcher::matches(&entry.name, Some(&active.match_rules)) {
                continue;
            }

            let key = service_key(&entry.name).to_string();
            if active.cache {
                let handler = self.loader.load_file(&entry.path, &key)?;
                tracing::debug!(
                    key = %key,
                    file = %entry.path.display(),
                    "Registered cold service"
                );
                self.tables.cold.insert(key, handler);
            } else {
                tracing::debug!(key = %key, file = %entry.path.display(), "Registered hot service");
                self.tables.hot.insert(key, entry.path);
            }
        }

        Ok(active)
    }

    pub fn tables(&self) -> &ServiceTables {
        &self.tables
    }

    pub fn into_tables(self) -> ServiceTables {
        self.tables
    }
}

/// Collect every matching file under `dir` into `table`, ignoring local
/// configuration and aggregation files. `rules` of `None` uses the matcher's
/// fallback rules.
pub fn collect_hot(
    dir: &Path,
    rules: Option<&[matcher::MatchRule]>,
    table: &mut HotTable,
) -> Result<(), ScanError> {
    for entry in list_entries(dir)? {
        if entry.is_dir {
            collect_hot(&entry.path, rules, table)?;
        } else if matcher::matches(&entry.name, rules) {
            table.insert(service_key(&entry.name).to_string(), entry.path);
        }
    }
    Ok(())
}

fn read_local_config(path: &Path, inherited: &DirConfig) -> Result<DirConfig, ScanError> {
    let content = fs::read_to_string(path).map_err(|source| ScanError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    DirConfig::from_local_toml(&content, inherited).map_err(|source| ScanError::LocalConfig {
        path: path.to_path_buf(),
        source,
    })
}

struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Visible entries of `dir` in name order, minus the reserved files.
fn list_entries(dir: &Path) -> Result<Vec<Entry>, ScanError> {
    let read_err = |source: std::io::Error| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let Ok(name) = entry.file_name().into_string() else {
            tracing::debug!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        let is_dir = entry.file_type().map_err(read_err)?.is_dir();
        if !is_dir && (name == AGGREGATE_FILE || name == LOCAL_CONFIG_FILE) {
            continue;
        }

        entries.push(Entry {
            path: entry.path(),
            name,
            is_dir,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
