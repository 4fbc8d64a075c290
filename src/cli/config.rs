//! Application configuration
//!
//! A single JSON file; every section and field is optional. Secrets are
//! read from the environment (after `.env`), never from the file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http_server::{HttpServerConfig, RateLimitConfig};
use crate::observability::LogFormat;
use crate::providers::ProvidersConfig;

use super::errors::{CliError, CliResult};

/// Audit pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Upper bound on every single remote collaborator call
    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,
}

fn default_remote_timeout_secs() -> u64 {
    20
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            remote_timeout_secs: default_remote_timeout_secs(),
        }
    }
}

impl AuditConfig {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
                })?;
                Self::from_json(&content)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse without validating.
    pub fn from_json(content: &str) -> CliResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.rate_limit.max_requests == 0 {
            return Err(CliError::config_error("rate_limit.max_requests must be > 0"));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(CliError::config_error("rate_limit.window_secs must be > 0"));
        }
        if self.rate_limit.max_tracked_callers == 0 {
            return Err(CliError::config_error("rate_limit.max_tracked_callers must be > 0"));
        }
        if self.audit.remote_timeout_secs == 0 {
            return Err(CliError::config_error("audit.remote_timeout_secs must be > 0"));
        }
        if self.providers.gemini_model.trim().is_empty() {
            return Err(CliError::config_error("providers.gemini_model must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.audit.remote_timeout(), Duration::from_secs(20));
        assert_eq!(config.providers.gemini_api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_json(
            r#"{"server": {"port": 9100}, "audit": {"remote_timeout_secs": 5}, "log_format": "json"}"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.audit.remote_timeout_secs, 5);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = AppConfig::from_json(r#"{"rate_limit": {"max_requests": 0}}"#).unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_json(r#"{"audit": {"remote_timeout_secs": 0}}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.message().contains("remote_timeout_secs"));
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        assert!(AppConfig::from_json(r#"{"log_format": "xml"}"#).is_err());
    }
}
