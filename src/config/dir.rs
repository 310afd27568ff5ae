//! Directory-local configuration (`ms-config.toml`).
//!
//! A directory's own file overrides its ancestor's configuration for that
//! subtree only. If it omits `match_rules`, the ancestor's rules are kept.

use serde::Deserialize;

use crate::routing::matcher::{default_rules, MatchRule};

/// Name of the local configuration file.
pub const LOCAL_CONFIG_FILE: &str = "ms-config.toml";

/// Name of the aggregation file whose entries are always cached.
pub const AGGREGATE_FILE: &str = "index.json";

/// Configuration active while scanning a directory.
#[derive(Debug, Clone)]
pub struct DirConfig {
    /// Load matched files eagerly into the cold table.
    pub cache: bool,

    /// Rules a file name must satisfy to become a service.
    pub match_rules: Vec<MatchRule>,

    /// True when the configuration came from an `ms-config.toml`.
    pub custom: bool,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            cache: false,
            match_rules: default_rules(),
            custom: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LocalConfigFile {
    cache: bool,
    match_rules: Option<Vec<MatchRule>>,
}

impl DirConfig {
    /// Parse a local override, inheriting `parent`'s rules when none are given.
    pub fn from_local_toml(content: &str, parent: &DirConfig) -> Result<Self, toml::de::Error> {
        let file: LocalConfigFile = toml::from_str(content)?;
        Ok(Self {
            cache: file.cache,
            match_rules: file
                .match_rules
                .unwrap_or_else(|| parent.match_rules.clone()),
            custom: true,
        })
    }
}
