//! Configuration management with layered hierarchy
//!
//! Sources, lowest priority first: global config file
//! (`~/.config/partbench/config.yaml`), environment variables, CLI flags.
//! Server credentials are only required by commands that actually talk to
//! the server; those fail at startup, before any batch work begins.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable names shared with the legacy tooling
pub const ENV_BASE_URL: &str = "INVENTREE_BASE_URL";
pub const ENV_TOKEN: &str = "INVENTREE_API_TOKEN";
pub const ENV_TIMEOUT: &str = "PARTBENCH_TIMEOUT_SECS";
pub const ENV_RULES: &str = "PARTBENCH_RULES";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no server URL configured: set {ENV_BASE_URL}, pass --base-url, or add base_url to the config file")]
    MissingBaseUrl,

    #[error("no API token configured: set {ENV_TOKEN}, pass --token, or add token to the config file")]
    MissingToken,
}

/// partbench configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// InvenTree API root, e.g. `https://inventory.example.com/api/`
    pub base_url: Option<String>,

    /// API token for the `Authorization: Token` header
    pub token: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Naming rules file (YAML, keyed by category pk)
    pub rules_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/partbench/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 2. Environment variables
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            config.base_url = Some(base_url);
        }
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            config.token = Some(token);
        }
        if let Ok(timeout) = std::env::var(ENV_TIMEOUT) {
            if let Ok(secs) = timeout.parse() {
                config.timeout_secs = Some(secs);
            }
        }
        if let Ok(rules) = std::env::var(ENV_RULES) {
            config.rules_file = Some(PathBuf::from(rules));
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "partbench")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.rules_file.is_some() {
            self.rules_file = other.rules_file;
        }
    }

    /// Resolve the settings a server-backed command needs, or fail fast
    pub fn api(&self) -> Result<ApiConfig, ConfigError> {
        let base_url = self.base_url.clone().ok_or(ConfigError::MissingBaseUrl)?;
        let token = self.token.clone().ok_or(ConfigError::MissingToken)?;
        Ok(ApiConfig {
            base_url,
            token,
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

/// Fully resolved transport settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            base_url: Some("https://a.example/api/".to_string()),
            token: Some("aaa".to_string()),
            ..Default::default()
        };
        base.merge(Config {
            token: Some("bbb".to_string()),
            timeout_secs: Some(5),
            ..Default::default()
        });
        assert_eq!(base.base_url.as_deref(), Some("https://a.example/api/"));
        assert_eq!(base.token.as_deref(), Some("bbb"));
        assert_eq!(base.timeout_secs, Some(5));
    }

    #[test]
    fn test_api_requires_url_and_token() {
        let config = Config::default();
        assert!(matches!(config.api(), Err(ConfigError::MissingBaseUrl)));

        let config = Config {
            base_url: Some("https://a.example/api/".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.api(), Err(ConfigError::MissingToken)));

        let config = Config {
            base_url: Some("https://a.example/api/".to_string()),
            token: Some("t".to_string()),
            ..Default::default()
        };
        let api = config.api().unwrap();
        assert_eq!(api.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_config_parses_from_yaml() {
        let yaml = "base_url: https://inv.example/api/\ntimeout_secs: 10\n";
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://inv.example/api/"));
        assert_eq!(config.timeout_secs, Some(10));
        assert!(config.token.is_none());
    }
}
