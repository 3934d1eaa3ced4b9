//! Error types for Chatline
//!
//! This module defines the application error type used by configuration,
//! storage, session and command handling, using `thiserror` for ergonomic
//! error handling. Backend call failures have their own typed error in
//! [`crate::api::BackendError`] so the send pipeline can classify them.

use thiserror::Error;

/// Main error type for Chatline operations
#[derive(Error, Debug)]
pub enum ChatlineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend API errors surfaced to command handlers
    #[error("Backend error: {0}")]
    Backend(String),

    /// No session token or user record is stored
    #[error("Not logged in. Run `chatline login --email <EMAIL>` first")]
    NotAuthenticated,

    /// Session and preference storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL parsing errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type alias for Chatline operations
///
/// Uses `anyhow::Error` so handlers can attach context while propagating.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ChatlineError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_backend_error_display() {
        let error = ChatlineError::Backend("conversation not found".to_string());
        assert_eq!(error.to_string(), "Backend error: conversation not found");
    }

    #[test]
    fn test_not_authenticated_mentions_login() {
        let error = ChatlineError::NotAuthenticated;
        assert!(error.to_string().contains("chatline login"));
    }

    #[test]
    fn test_storage_error_display() {
        let error = ChatlineError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ChatlineError = io_error.into();
        assert!(matches!(error, ChatlineError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: ChatlineError = json_error.into();
        assert!(matches!(error, ChatlineError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: ChatlineError = yaml_error.into();
        assert!(matches!(error, ChatlineError::Yaml(_)));
    }

    #[test]
    fn test_url_error_conversion() {
        let parse_error = url::Url::parse("not a url").unwrap_err();
        let error: ChatlineError = parse_error.into();
        assert!(matches!(error, ChatlineError::InvalidUrl(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatlineError>();
    }
}
