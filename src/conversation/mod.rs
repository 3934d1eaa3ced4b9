//! Conversation and message types
//!
//! Conversations are owned by the backend; the client keeps a read-only copy
//! that is replaced wholesale on every refresh. Messages belong to the
//! conversation currently on screen and are discarded when switching.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod categorize;

pub use categorize::{categorize, Bucket, CategorizedConversations, WeekStart};

/// Summary of a persisted conversation as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Stable unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Preview of the most recent message, if any
    #[serde(default)]
    pub last_message: Option<String>,
    /// Creation time
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last activity time, used for recency grouping
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Case-insensitive substring match over title and last message
    ///
    /// An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .last_message
                .as_deref()
                .is_some_and(|m| m.to_lowercase().contains(&needle))
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Typed by the user
    User,
    /// Produced by the assistant, or a locally generated failure notice
    Ai,
}

impl MessageKind {
    /// Map a backend role string; anything other than `"user"` is the assistant
    pub fn from_role(role: &str) -> Self {
        if role == "user" {
            Self::User
        } else {
            Self::Ai
        }
    }
}

/// A single entry in the message list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Client-generated for new user messages, server-assigned when loaded
    pub id: String,
    /// Author of the message
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Raw text content
    pub content: String,
    /// Local display time, only present for messages loaded from the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    /// Create a user message with a fresh client-side id
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: MessageKind::User,
            content: content.into(),
            timestamp: None,
        }
    }

    /// Create an assistant message with a fresh client-side id
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: MessageKind::Ai,
            content: content.into(),
            timestamp: None,
        }
    }

    /// Build a message from a persisted backend record
    ///
    /// The display timestamp is the creation time rendered in local time.
    pub fn from_stored(
        id: impl Into<String>,
        role: &str,
        content: impl Into<String>,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: MessageKind::from_role(role),
            content: content.into(),
            timestamp: created_at.map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string()),
        }
    }

    /// Returns true for assistant messages
    pub fn is_ai(&self) -> bool {
        self.kind == MessageKind::Ai
    }
}

/// Parse a backend timestamp
///
/// Accepts RFC 3339 strings as well as naive ISO-8601 date-times without an
/// offset, which are taken to be UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

pub(crate) fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
        None => Ok(None),
    }
}
