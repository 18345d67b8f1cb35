//! Client configuration types.

use std::fs;
use std::path::Path;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::doc_ref::PermissionInheritance;
use crate::error::ConfigError;

/// Configuration for talking to the explorer service.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ClientConfig {
    /// Base URL of the explorer service, e.g. `http://localhost:8080/api/explorer/v1`.
    pub explorer_service_url: String,

    /// Per-request timeout in seconds.
    #[builder(default = "30")]
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Permission handling for copies and moves.
    #[builder(default)]
    #[serde(default)]
    pub permission_inheritance: PermissionInheritance,

    /// User agent sent with every request.
    #[builder(default = "default_user_agent()")]
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("doctree/", env!("CARGO_PKG_VERSION")).to_string()
}

fn validate_url(url: &str) -> Result<(), String> {
    if url.trim().is_empty() {
        return Err("Explorer service URL cannot be empty".to_string());
    }
    let parsed = Url::parse(url).map_err(|e| format!("Invalid explorer service URL {url}: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("Explorer service URL must be http(s): {url}"));
    }
    if parsed.cannot_be_a_base() {
        return Err(format!("Explorer service URL cannot be a base: {url}"));
    }
    Ok(())
}

impl ClientConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.explorer_service_url {
            Some(ref url) => validate_url(url),
            None => Err("Explorer service URL is required".to_string()),
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Create a config for a service URL with default settings.
    pub fn new(explorer_service_url: impl Into<String>) -> Self {
        Self {
            explorer_service_url: explorer_service_url.into(),
            request_timeout_secs: default_timeout_secs(),
            permission_inheritance: PermissionInheritance::default(),
            user_agent: default_user_agent(),
        }
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configured values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url(&self.explorer_service_url).map_err(|message| ConfigError::Invalid { message })
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .explorer_service_url("http://localhost:8080/explorer")
            .request_timeout_secs(5u64)
            .permission_inheritance(PermissionInheritance::Destination)
            .build()
            .unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(
            config.permission_inheritance,
            PermissionInheritance::Destination
        );
        assert!(config.user_agent.starts_with("doctree/"));
    }

    #[test]
    fn test_builder_requires_url() {
        assert!(ClientConfig::builder().build().is_err());
        assert!(
            ClientConfig::builder()
                .explorer_service_url("ftp://host")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_validate_parses_url() {
        assert!(ClientConfig::new("http://").validate().is_err());
        assert!(ClientConfig::new("http://host:port/api").validate().is_err());
        assert!(ClientConfig::new("mailto:admin@example.com").validate().is_err());
        assert!(ClientConfig::new("https://host:8443/api/explorer/v1").validate().is_ok());
    }
}
