//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check location prefixes and project names
//! - Validate value ranges (timeouts > 0, metrics address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Incomplete `[[mock.projects]]` entries are not errors; they are skipped
//!   at registration time

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let mut prefixes = HashSet::new();
    for (i, location) in config.locations.iter().enumerate() {
        let field = format!("locations[{}].prefix", i);
        let prefix = location.prefix.as_str();

        if !prefix.starts_with('/') {
            errors.push(ValidationError::new(&field, "must start with '/'"));
        }
        if prefix == "/" || prefix.ends_with('/') {
            errors.push(ValidationError::new(&field, "must not end with '/'"));
        }
        if prefix.contains(['{', '}', '*']) {
            errors.push(ValidationError::new(&field, "must be a literal path"));
        }
        if !prefixes.insert(prefix) {
            errors.push(ValidationError::new(&field, format!("duplicate prefix '{}'", prefix)));
        }
        if location.project.as_deref() == Some("") {
            errors.push(ValidationError::new(
                format!("locations[{}].project", i),
                "must not be empty",
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LocationConfig;

    fn location(prefix: &str, project: Option<&str>) -> LocationConfig {
        LocationConfig {
            prefix: prefix.to_string(),
            project: project.map(String::from),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServerConfig::default();
        config.timeouts.request_secs = 0;
        config.locations.push(location("get", None));
        config.locations.push(location("/set/", Some("")));
        config.locations.push(location("/a/{id}", None));
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nope".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"timeouts.request_secs"));
        assert!(fields.contains(&"locations[0].prefix"));
        assert!(fields.contains(&"locations[1].prefix"));
        assert!(fields.contains(&"locations[1].project"));
        assert!(fields.contains(&"locations[2].prefix"));
        assert!(fields.contains(&"observability.metrics_address"));
    }

    #[test]
    fn test_duplicate_prefix() {
        let mut config = ServerConfig::default();
        config.locations.push(location("/get", Some("a")));
        config.locations.push(location("/get", Some("b")));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "locations[1].prefix: duplicate prefix '/get'");
    }
}
