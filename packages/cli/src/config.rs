//! Client Configuration
//!
//! Endpoint and credentials for the management API, resolved from the
//! environment with ~/.funcpack/config.toml as the fallback.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub token: Option<String>,
}

impl Config {
    /// Get the config file path (~/.funcpack/config.toml)
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".funcpack").join("config.toml"))
    }

    /// Load config from disk
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Default resolution chain: the config file, with environment
    /// variables taking precedence.
    pub fn resolve() -> Result<Self> {
        let mut config = Self::load()?;
        if let Ok(endpoint) = std::env::var("FUNCPACK_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }
        if let Ok(region) = std::env::var("AWS_REGION") {
            config.region = Some(region);
        }
        if let Ok(token) = std::env::var("FUNCPACK_TOKEN") {
            config.token = Some(token);
        }
        Ok(config)
    }

    /// Management API base URL, without a trailing slash.
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!(
                "https://lambda.{}.amazonaws.com",
                self.region.as_deref().unwrap_or(DEFAULT_REGION)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_uses_the_default_region() {
        let config = Config::default();
        assert_eq!(config.endpoint(), "https://lambda.us-east-1.amazonaws.com");
    }

    #[test]
    fn region_feeds_the_derived_endpoint() {
        let config = Config {
            region: Some("eu-west-1".to_string()),
            ..Config::default()
        };
        assert_eq!(config.endpoint(), "https://lambda.eu-west-1.amazonaws.com");
    }

    #[test]
    fn explicit_endpoint_wins_and_loses_its_trailing_slash() {
        let config = Config {
            endpoint: Some("http://localhost:9001/".to_string()),
            region: Some("eu-west-1".to_string()),
            ..Config::default()
        };
        assert_eq!(config.endpoint(), "http://localhost:9001");
    }

    #[test]
    fn parse_minimal_config() {
        let toml_content = r#"
            token = "abc123"
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.token.as_deref(), Some("abc123"));
        assert!(config.endpoint.is_none());
    }
}
