//! Failure kinds for chat sends and conversation loads
//!
//! A failed send is never surfaced as an error to the caller: it is turned
//! into an assistant message carrying [`SendFailure::user_message`], so the
//! conversation always shows a reply.

use crate::api::BackendError;
use thiserror::Error;

/// Shown when the client-side timeout wins the race
pub const TIMEOUT_MESSAGE: &str = "The request is taking longer than usual. Please try again with a shorter message or check your internet connection.";
/// Shown for HTTP 429
pub const RATE_LIMITED_MESSAGE: &str =
    "I'm currently at my daily usage limit. Please try again tomorrow.";
/// Shown for HTTP 5xx
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "The service is temporarily unavailable. Please try again in a few minutes.";
/// Shown for anything unclassified
pub const UNKNOWN_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Why a chat send did not produce an assistant reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// The client-side timeout fired before the backend answered
    #[error("chat request timed out")]
    Timeout,

    /// The backend answered 429
    #[error("chat request was rate limited")]
    RateLimited,

    /// The backend answered with a 5xx status
    #[error("chat service unavailable")]
    ServiceUnavailable,

    /// The backend explained the failure in its `detail` field
    #[error("backend rejected chat request: {0}")]
    BackendDetail(String),

    /// Anything else, including transport and decode errors
    #[error("chat request failed")]
    Unknown,
}

impl SendFailure {
    /// Classify a backend error
    ///
    /// Status checks take precedence over the detail message: a 429 or 5xx
    /// response is reported by kind even when it carries a detail.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::api::BackendError;
    /// use chatline::chat::SendFailure;
    ///
    /// let err = BackendError::Status { status: 503, detail: Some("down".into()) };
    /// assert_eq!(SendFailure::classify(&err), SendFailure::ServiceUnavailable);
    /// ```
    pub fn classify(err: &BackendError) -> Self {
        match err {
            BackendError::Status { status: 429, .. } => SendFailure::RateLimited,
            BackendError::Status { status, .. } if *status >= 500 => {
                SendFailure::ServiceUnavailable
            }
            BackendError::Status {
                detail: Some(detail),
                ..
            } => SendFailure::BackendDetail(detail.clone()),
            _ => SendFailure::Unknown,
        }
    }

    /// Text appended to the conversation in place of a reply
    pub fn user_message(&self) -> &str {
        match self {
            SendFailure::Timeout => TIMEOUT_MESSAGE,
            SendFailure::RateLimited => RATE_LIMITED_MESSAGE,
            SendFailure::ServiceUnavailable => SERVICE_UNAVAILABLE_MESSAGE,
            SendFailure::BackendDetail(detail) => detail,
            SendFailure::Unknown => UNKNOWN_MESSAGE,
        }
    }
}

/// A conversation list or detail fetch failed
///
/// Logged and reported to the caller; the displayed state is left as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to load {what}: {source}")]
pub struct LoadFailure {
    /// What was being loaded
    pub what: String,
    /// Underlying backend error
    #[source]
    pub source: BackendError,
}
