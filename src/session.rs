//! Session context: auth token, user record and display preferences
//!
//! [`SessionContext`] is built once at startup and handed to the components
//! that need it. Nothing else reads the session store directly.

use crate::api::{LoginResponse, User};
use crate::error::{ChatlineError, Result};
use crate::storage::{Scope, SqliteStorage};

/// Preference key for the dark display theme
pub const DARK_MODE_KEY: &str = "darkMode";
/// Session key for the bearer token
pub const TOKEN_KEY: &str = "token";
/// Session key for the serialized user record
pub const USER_KEY: &str = "user";

/// Token and user of a logged-in session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Injected access to persisted session state
pub struct SessionContext {
    storage: SqliteStorage,
}

impl SessionContext {
    /// Wrap an opened storage backend
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    /// Stored bearer token, if any
    pub fn token(&self) -> Result<Option<String>> {
        self.storage.get(Scope::Session, TOKEN_KEY)
    }

    /// Stored user record, if any
    ///
    /// A record that no longer parses is treated as absent.
    pub fn user(&self) -> Result<Option<User>> {
        let Some(raw) = self.storage.get(Scope::Session, USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored user record: {}", e);
                Ok(None)
            }
        }
    }

    /// Return the active session, or `NotAuthenticated` if the token or the
    /// user record is missing
    pub fn require_auth(&self) -> Result<AuthSession> {
        match (self.token()?, self.user()?) {
            (Some(token), Some(user)) => Ok(AuthSession { token, user }),
            _ => Err(ChatlineError::NotAuthenticated.into()),
        }
    }

    /// Persist the result of a successful login
    pub fn store_login(&self, login: &LoginResponse) -> Result<()> {
        let user_json = serde_json::to_string(&login.user)?;
        self.storage
            .set(Scope::Session, TOKEN_KEY, &login.access_token)?;
        self.storage.set(Scope::Session, USER_KEY, &user_json)?;
        tracing::info!("Stored session for {}", login.user.email);
        Ok(())
    }

    /// Forget the token and user record; preferences are kept
    pub fn clear_auth(&self) -> Result<()> {
        self.storage.clear(Scope::Session)?;
        tracing::info!("Cleared session");
        Ok(())
    }

    /// Dark display preference; defaults to `false` when unset or unreadable
    pub fn dark_mode(&self) -> bool {
        match self.storage.get(Scope::Preferences, DARK_MODE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Invalid {} preference {:?}: {}", DARK_MODE_KEY, raw, e);
                false
            }),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Failed to read {} preference: {}", DARK_MODE_KEY, e);
                false
            }
        }
    }

    /// Persist the dark display preference
    pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.storage.set(
            Scope::Preferences,
            DARK_MODE_KEY,
            &serde_json::to_string(&enabled)?,
        )
    }
}
