//! Test utilities for chatline
//!
//! Fixtures shared by unit tests: conversations with controlled timestamps,
//! a session context on a temporary database, and assertion helpers.

use crate::config::Config;
use crate::conversation::Conversation;
use crate::error::Result;
use crate::session::SessionContext;
use crate::storage::SqliteStorage;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Build a conversation last updated at `updated_at`
pub fn conversation(id: &str, title: &str, updated_at: DateTime<Utc>) -> Conversation {
    Conversation {
        id: id.to_string(),
        title: title.to_string(),
        last_message: None,
        created_at: None,
        updated_at,
    }
}

/// Session context backed by a fresh database in a temporary directory
///
/// Keep the returned `TempDir` alive for as long as the context is used.
pub fn test_session() -> (SessionContext, TempDir) {
    let dir = temp_dir();
    let storage = SqliteStorage::new_with_path(dir.path().join("session.db"))
        .expect("Failed to create session storage");
    (SessionContext::new(storage), dir)
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration YAML exercising every section
pub fn test_config_yaml() -> String {
    r#"
api:
  base_url: http://127.0.0.1:8000
chat:
  request_timeout_ms: 30000
  slow_response_ms: 5000
sidebar:
  week_start: monday
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatlineError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_conversation_fixture() {
        let now = Utc::now();
        let conv = conversation("c1", "Title", now);
        assert_eq!(conv.updated_at, now);
        assert!(conv.last_message.is_none());
    }

    #[test]
    fn test_session_fixture_starts_logged_out() {
        let (session, _dir) = test_session();
        assert!(session.require_auth().is_err());
        assert!(!session.dark_mode());
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(ChatlineError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(ChatlineError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_yaml() {
        let yaml = test_config_yaml();
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
    }
}
