//! HTTP implementation of the chat backend
//!
//! Talks JSON to the backend over reqwest. Every request carries
//! `Authorization: Bearer <token>` when a session token is present. Non-2xx
//! responses are turned into [`BackendError::Status`] with the `detail` field
//! of the error body, if any.

use crate::api::{
    BackendError, ChatBackend, ChatRequest, ChatResponse, ConversationDetail, LoginResponse, User,
};
use crate::config::ApiConfig;
use crate::conversation::Conversation;
use crate::error::{ChatlineError, Result};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Error body shape used by the backend (`{"detail": "..."}`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// reqwest-backed [`ChatBackend`]
///
/// No overall request timeout is configured on the client: the send
/// pipeline races chat requests against its own timer, and listing calls
/// are short.
///
/// # Examples
///
/// ```
/// use chatline::api::HttpBackend;
/// use chatline::config::ApiConfig;
///
/// let backend = HttpBackend::new(&ApiConfig::default(), Some("token".to_string())).unwrap();
/// assert_eq!(backend.base_url(), "http://localhost:8000");
/// ```
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    /// Create a backend client
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration (base URL and user agent)
    /// * `token` - Session token, if logged in
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be built
    pub fn new(config: &ApiConfig, token: Option<String>) -> Result<Self> {
        url::Url::parse(&config.base_url).map_err(ChatlineError::InvalidUrl)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ChatlineError::Backend(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(
            "Initialized HTTP backend: base_url={}, authenticated={}",
            config.base_url,
            token.is_some()
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/conversations/{id}` with the id percent-encoded as one path segment
    fn conversation_url(&self, id: &str) -> std::result::Result<url::Url, BackendError> {
        let mut url = url::Url::parse(&self.url("/conversations"))
            .map_err(|e| BackendError::Transport(format!("Invalid conversation URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Transport("Base URL cannot take a path".to_string()))?
            .push(id);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> std::result::Result<Response, BackendError> {
        let response = self.authorized(builder).send().await.map_err(|e| {
            tracing::warn!("Backend request failed: {}", e);
            BackendError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        tracing::error!("Backend returned error {}: {}", status, body);
        Err(BackendError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> std::result::Result<T, BackendError> {
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse backend response: {}", e);
            BackendError::Decode(e.to_string())
        })
    }
}

/// Pull a human-readable `detail` out of an error body
///
/// String details are used as-is; structured details (validation error
/// lists) are ignored so the caller falls back to a generic message.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_chat(&self, request: &ChatRequest) -> std::result::Result<ChatResponse, BackendError> {
        tracing::debug!(
            "POST /chat (conversation_id={:?}, {} chars)",
            request.conversation_id,
            request.message.len()
        );
        let response = self
            .execute(self.client.post(self.url("/chat")).json(request))
            .await?;
        Self::decode(response).await
    }

    async fn list_conversations(&self) -> std::result::Result<Vec<Conversation>, BackendError> {
        tracing::debug!("GET /conversations");
        let response = self
            .execute(self.client.get(self.url("/conversations")))
            .await?;
        Self::decode(response).await
    }

    async fn get_conversation(&self, id: &str) -> std::result::Result<ConversationDetail, BackendError> {
        tracing::debug!("GET /conversations/{}", id);
        let response = self
            .execute(self.client.get(self.conversation_url(id)?))
            .await?;
        Self::decode(response).await
    }

    async fn create_conversation(&self, title: &str) -> std::result::Result<Conversation, BackendError> {
        tracing::debug!("POST /conversations");
        let response = self
            .execute(
                self.client
                    .post(self.url("/conversations"))
                    .json(&json!({ "title": title })),
            )
            .await?;
        Self::decode(response).await
    }

    async fn delete_conversation(&self, id: &str) -> std::result::Result<(), BackendError> {
        tracing::debug!("DELETE /conversations/{}", id);
        self.execute(self.client.delete(self.conversation_url(id)?))
            .await?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> std::result::Result<LoginResponse, BackendError> {
        tracing::debug!("POST /login for {}", email);
        let response = self
            .execute(
                self.client
                    .post(self.url("/login"))
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        Self::decode(response).await
    }

    async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> std::result::Result<User, BackendError> {
        tracing::debug!("POST /signup for {}", email);
        let response = self
            .execute(self.client.post(self.url("/signup")).json(&json!({
                "username": username,
                "email": email,
                "password": password,
            })))
            .await?;
        Self::decode(response).await
    }
}
