//! Configuration management for Chatline
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::conversation::WeekStart;
use crate::error::{ChatlineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for Chatline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Message send behavior
    #[serde(default)]
    pub chat: ChatConfig,

    /// Conversation sidebar settings
    #[serde(default)]
    pub sidebar: SidebarConfig,

    /// Session and preference storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the chat backend (e.g. `http://localhost:8000`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_user_agent() -> String {
    format!("chatline/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// Chat send configuration
///
/// Both values are in milliseconds. The slow-response threshold only drives
/// a UI hint; the request timeout decides the outcome of a send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Client-side timeout raced against every chat request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Delay after which an in-flight request is flagged as slow
    #[serde(default = "default_slow_response_ms")]
    pub slow_response_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_slow_response_ms() -> u64 {
    5_000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            slow_response_ms: default_slow_response_ms(),
        }
    }
}

impl ChatConfig {
    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Slow-response threshold as a `Duration`
    pub fn slow_response_after(&self) -> Duration {
        Duration::from_millis(self.slow_response_ms)
    }
}

/// Sidebar configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SidebarConfig {
    /// First day of the week used for the "this week" / "last week" buckets
    #[serde(default)]
    pub week_start: WeekStart,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the session database path
    ///
    /// When unset, the database lives in the platform data directory.
    #[serde(default)]
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatlineError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatlineError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("CHATLINE_API_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("CHATLINE_REQUEST_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse() {
                self.chat.request_timeout_ms = value;
            } else {
                tracing::warn!("Invalid CHATLINE_REQUEST_TIMEOUT_MS: {}", timeout);
            }
        }

        if let Ok(slow) = std::env::var("CHATLINE_SLOW_RESPONSE_MS") {
            if let Ok(value) = slow.parse() {
                self.chat.slow_response_ms = value;
            } else {
                tracing::warn!("Invalid CHATLINE_SLOW_RESPONSE_MS: {}", slow);
            }
        }

        if let Ok(week_start) = std::env::var("CHATLINE_WEEK_START") {
            match WeekStart::parse_str(&week_start) {
                Ok(value) => self.sidebar.week_start = value,
                Err(_) => tracing::warn!("Invalid CHATLINE_WEEK_START: {}", week_start),
            }
        }

        if let Ok(db_path) = std::env::var("CHATLINE_SESSION_DB") {
            self.storage.path = Some(db_path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            tracing::debug!("Using API URL override from CLI: {}", api_url);
            self.api.base_url = api_url.clone();
        }

        if let Some(storage_path) = &cli.storage_path {
            tracing::debug!("Using storage DB override from CLI: {}", storage_path);
            self.storage.path = Some(storage_path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an http(s) URL, a timeout is
    /// zero, or the slow-response threshold is not below the request timeout
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            ChatlineError::Config(format!(
                "api.base_url is not a valid URL ({}): {}",
                self.api.base_url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ChatlineError::Config(format!(
                "api.base_url must use http or https, got: {}",
                url.scheme()
            ))
            .into());
        }

        if self.chat.request_timeout_ms == 0 {
            return Err(ChatlineError::Config(
                "chat.request_timeout_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.slow_response_ms == 0 {
            return Err(ChatlineError::Config(
                "chat.slow_response_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.slow_response_ms >= self.chat.request_timeout_ms {
            return Err(ChatlineError::Config(
                "chat.slow_response_ms must be less than chat.request_timeout_ms".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::test_utils::{assert_error_contains, temp_dir, test_config_yaml};
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.chat.request_timeout_ms, 30_000);
        assert_eq!(config.chat.slow_response_ms, 5_000);
        assert_eq!(config.sidebar.week_start, WeekStart::Sunday);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert_error_contains(config.validate(), "not a valid URL");
    }

    #[test]
    fn test_config_validation_non_http_scheme() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert_error_contains(config.validate(), "must use http or https");
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.chat.request_timeout_ms = 0;
        assert_error_contains(config.validate(), "request_timeout_ms must be greater than 0");
    }

    #[test]
    fn test_config_validation_slow_threshold_not_below_timeout() {
        let mut config = Config::default();
        config.chat.slow_response_ms = 30_000;
        assert_error_contains(config.validate(), "must be less than chat.request_timeout_ms");
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  base_url: https://chat.example.com
chat:
  request_timeout_ms: 10000
  slow_response_ms: 2000
sidebar:
  week_start: monday
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://chat.example.com");
        assert_eq!(config.api.user_agent, default_user_agent());
        assert_eq!(config.chat.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.chat.slow_response_after(), Duration::from_secs(2));
        assert_eq!(config.sidebar.week_start, WeekStart::Monday);
    }

    #[test]
    #[serial]
    fn test_load_reads_file_then_validates() {
        let dir = temp_dir();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, test_config_yaml()).unwrap();

        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.sidebar.week_start, WeekStart::Monday);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = temp_dir();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "chat: [not, a, map]").unwrap();

        assert_error_contains(
            Config::load(path.to_str().unwrap(), &Cli::default()),
            "Failed to parse config",
        );
    }

    #[test]
    fn test_config_from_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.chat.request_timeout_ms, 30_000);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("CHATLINE_API_URL", "http://10.0.0.5:9000");
        std::env::set_var("CHATLINE_REQUEST_TIMEOUT_MS", "12000");
        std::env::set_var("CHATLINE_SLOW_RESPONSE_MS", "not-a-number");
        std::env::set_var("CHATLINE_WEEK_START", "monday");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("CHATLINE_API_URL");
        std::env::remove_var("CHATLINE_REQUEST_TIMEOUT_MS");
        std::env::remove_var("CHATLINE_SLOW_RESPONSE_MS");
        std::env::remove_var("CHATLINE_WEEK_START");

        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.chat.request_timeout_ms, 12_000);
        assert_eq!(config.chat.slow_response_ms, 5_000);
        assert_eq!(config.sidebar.week_start, WeekStart::Monday);
    }

    #[test]
    #[serial]
    fn test_load_missing_file_applies_cli_overrides() {
        let cli = Cli {
            api_url: Some("http://127.0.0.1:1234".to_string()),
            storage_path: Some("/tmp/chatline-test.db".to_string()),
            ..Cli::default()
        };

        let config = Config::load("/nonexistent/chatline.yaml", &cli).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:1234");
        assert_eq!(
            config.storage.path.as_deref(),
            Some("/tmp/chatline-test.db")
        );
    }
}
