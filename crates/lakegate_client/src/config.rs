//! Workspace connection settings.
//!
//! Read once from the environment at startup and threaded into the client
//! at construction; nothing in this crate reads ambient state afterwards.

use tracing::warn;

use crate::error::{Error, Result};

const HOST_VAR: &str = "DATABRICKS_HOST";
const TOKEN_VAR: &str = "DATABRICKS_TOKEN";
const WAREHOUSE_VAR: &str = "DATABRICKS_WAREHOUSE_ID";

/// Connection settings for one Databricks workspace.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace URL, scheme included, no trailing slash.
    pub host: String,
    /// Pre-provisioned personal access token.
    pub token: String,
    /// Default SQL warehouse for statements that don't name one.
    pub warehouse_id: Option<String>,
}

impl Config {
    /// Build a config, validating the host URL.
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let host = host.into();
        if !host.starts_with("https://") && !host.starts_with("http://") {
            return Err(Error::Config(format!(
                "{} must start with http:// or https://",
                HOST_VAR
            )));
        }
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            token: token.into(),
            warehouse_id: None,
        })
    }

    /// Load settings from the environment.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var(HOST_VAR)
            .map_err(|_| Error::Config(format!("{} is not set", HOST_VAR)))?;
        let token = std::env::var(TOKEN_VAR)
            .map_err(|_| Error::Config(format!("{} is not set", TOKEN_VAR)))?;

        let mut config = Self::new(host, token)?;
        config.warehouse_id = std::env::var(WAREHOUSE_VAR).ok().filter(|v| !v.is_empty());

        if let Some(ref id) = config.warehouse_id {
            if id.len() < 10 {
                warn!("Warehouse ID '{}' seems unusually short", id);
            }
        }

        Ok(config)
    }

    pub fn with_warehouse_id(mut self, warehouse_id: impl Into<String>) -> Self {
        self.warehouse_id = Some(warehouse_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_must_carry_scheme() {
        let err = Config::new("example.databricks.net", "dapi123").unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = Config::new("https://example.databricks.net/", "dapi123").unwrap();
        assert_eq!(config.host, "https://example.databricks.net");
    }

    #[test]
    fn warehouse_id_defaults_to_none() {
        let config = Config::new("https://example.databricks.net", "dapi123").unwrap();
        assert!(config.warehouse_id.is_none());
        let config = config.with_warehouse_id("abc123def456");
        assert_eq!(config.warehouse_id.as_deref(), Some("abc123def456"));
    }
}
