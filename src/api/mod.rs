//! Chat backend API
//!
//! This module defines the [`ChatBackend`] abstraction over the chat
//! backend's HTTP API, the request/response wire types, and the typed
//! [`BackendError`] used to classify failures.
//!
//! Implementations:
//!
//! - [`http::HttpBackend`] -- reqwest client for the real backend
//! - [`fake::FakeBackend`] -- scripted in-process backend used in tests

use crate::conversation::{deserialize_optional_timestamp, Conversation, Message};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod fake;
pub mod http;

pub use fake::FakeBackend;
pub use http::HttpBackend;

/// Failure of a single backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The server answered with a non-success status
    #[error("Backend returned HTTP {status}{}", detail_suffix(.detail))]
    Status {
        /// HTTP status code
        status: u16,
        /// `detail` field of the error body, when present
        detail: Option<String>,
    },

    /// The request never produced a response (connection refused, DNS, ...)
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("Invalid response from backend: {0}")]
    Decode(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

impl BackendError {
    /// HTTP status, if the server responded
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured detail message, if the server sent one
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<BackendError> for crate::error::ChatlineError {
    fn from(err: BackendError) -> Self {
        crate::error::ChatlineError::Backend(err.to_string())
    }
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Text typed by the user
    pub message: String,
    /// Conversation to append to; `null` starts a new one
    pub conversation_id: Option<String>,
}

/// Successful reply to `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply text
    pub response: String,
    /// Conversation the exchange was stored in
    pub conversation_id: String,
    /// Echo of the question
    #[serde(default)]
    pub question: Option<String>,
    /// Server-side creation time of the reply
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Persisted message as returned by `GET /conversations/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub role: String,
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Self {
        Message::from_stored(stored.id, &stored.role, stored.content, stored.created_at)
    }
}

/// Full conversation as returned by `GET /conversations/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversationDetail {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

/// Account record returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Successful reply to `POST /login`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Operations the client needs from the chat backend
///
/// Every method returns a [`BackendError`] rather than an `anyhow` error so
/// callers can classify failures by status and detail.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a user message and wait for the assistant reply
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;

    /// List the user's conversations
    async fn list_conversations(&self) -> Result<Vec<Conversation>, BackendError>;

    /// Fetch a conversation with all of its messages
    async fn get_conversation(&self, id: &str) -> Result<ConversationDetail, BackendError>;

    /// Create an empty conversation
    async fn create_conversation(&self, title: &str) -> Result<Conversation, BackendError>;

    /// Delete a conversation and its messages
    async fn delete_conversation(&self, id: &str) -> Result<(), BackendError>;

    /// Exchange credentials for a session token
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, BackendError>;

    /// Register a new account
    async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, BackendError>;
}
