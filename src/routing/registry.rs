//! Per-project hot tables.
//!
//! # Responsibilities
//! - Scan a project directory into an isolated hot table
//! - Register each project name at most once (first write wins)
//! - Look up a project's file for a service key
//!
//! # Design Decisions
//! - Project trees ignore `ms-config.toml` and `index.json` entirely
//! - Files are matched with the matcher's fallback rules
//! - Backed by `DashMap` so projects can be added after the server starts

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::routing::scanner::{collect_hot, ScanError};
use crate::routing::HotTable;

/// Registry of project-scoped hot tables.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    projects: DashMap<String, Arc<HotTable>>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `project` with the files found under `dir`.
    ///
    /// Returns `Ok(false)` without touching the disk when either argument is
    /// empty or the project is already registered.
    pub fn register(&self, project: &str, dir: &Path) -> Result<bool, ScanError> {
        if project.is_empty() || dir.as_os_str().is_empty() {
            return Ok(false);
        }

        if self.projects.contains_key(project) {
            tracing::debug!(project, dir = %dir.display(), "Project already registered, ignoring");
            return Ok(false);
        }

        let mut table = HotTable::new();
        collect_hot(dir, None, &mut table)?;

        match self.projects.entry(project.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                tracing::info!(
                    project,
                    dir = %dir.display(),
                    services = table.len(),
                    "Project registered"
                );
                slot.insert(Arc::new(table));
                Ok(true)
            }
        }
    }

    /// File registered for `key` in `project`, if any.
    pub fn lookup(&self, project: &str, key: &str) -> Option<PathBuf> {
        self.projects
            .get(project)
            .and_then(|table| table.get(key).cloned())
    }

    pub fn is_registered(&self, project: &str) -> bool {
        self.projects.contains_key(project)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
