//! SQLite persistence for the session context
//!
//! A single database file holds two key-value tables. Values are stored as
//! text; callers decide the encoding.

use crate::error::{ChatlineError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub mod types;
pub use types::Scope;

/// Key-value storage backing the session context
///
/// Two scopes are kept in separate tables: `preferences` survives logout,
/// `session` holds the auth token and user record and is cleared on logout.
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory, unless
    /// `CHATLINE_SESSION_DB` points elsewhere.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("CHATLINE_SESSION_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "chatline", "chatline")
            .ok_or_else(|| ChatlineError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| ChatlineError::Storage(e.to_string()))?;

        let storage = Self {
            db_path: data_dir.join("session.db"),
        };
        storage.init()?;

        Ok(storage)
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::storage::SqliteStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("session.db")).unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| ChatlineError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Open storage at an optional configured path, else the default location
    pub fn open(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::new_with_path(p),
            None => Self::new(),
        }
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ChatlineError::Storage(e.to_string()).into())
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.connect()?;

        for scope in Scope::ALL {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL
                    )",
                    scope.table()
                ),
                [],
            )
            .context("Failed to create tables")
            .map_err(|e| ChatlineError::Storage(e.to_string()))?;
        }

        Ok(())
    }

    /// Read a value
    pub fn get(&self, scope: Scope, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let value = conn
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?", scope.table()),
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to read value")
            .map_err(|e| ChatlineError::Storage(e.to_string()))?;
        Ok(value)
    }

    /// Insert or replace a value
    pub fn set(&self, scope: Scope, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (key, value) VALUES (?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                scope.table()
            ),
            params![key, value],
        )
        .context("Failed to write value")
        .map_err(|e| ChatlineError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Remove every value in a scope
    pub fn clear(&self, scope: Scope) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(&format!("DELETE FROM {}", scope.table()), [])
            .context("Failed to clear scope")
            .map_err(|e| ChatlineError::Storage(e.to_string()))?;
        Ok(())
    }
}
