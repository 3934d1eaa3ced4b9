//! In-process fake backend for unit and integration tests
//!
//! [`FakeBackend`] implements [`ChatBackend`] from scripted data so the send
//! pipeline and command handlers can be driven without a server. Chat
//! replies are queued with an optional delay; the delay uses
//! `tokio::time::sleep`, so tests running on a paused clock can step through
//! the slow-response and timeout paths deterministically.
//!
//! # Example
//!
//! ```
//! use chatline::api::{ChatBackend, ChatRequest, FakeBackend};
//!
//! # tokio_test::block_on(async {
//! let backend = FakeBackend::new();
//! backend.push_reply("hello there", "conv-1");
//!
//! let reply = backend
//!     .send_chat(&ChatRequest { message: "hi".into(), conversation_id: None })
//!     .await
//!     .unwrap();
//! assert_eq!(reply.response, "hello there");
//! assert_eq!(backend.chat_requests().len(), 1);
//! # });
//! ```

use crate::api::{
    BackendError, ChatBackend, ChatRequest, ChatResponse, ConversationDetail, LoginResponse, User,
};
use crate::conversation::Conversation;

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A queued answer to `send_chat`
#[derive(Debug, Clone)]
struct ScriptedReply {
    delay: Duration,
    result: Result<ChatResponse, BackendError>,
}

/// Scripted [`ChatBackend`] for tests
#[derive(Debug, Default)]
pub struct FakeBackend {
    replies: Mutex<VecDeque<ScriptedReply>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    conversations: Mutex<Vec<Conversation>>,
    details: Mutex<HashMap<String, ConversationDetail>>,
    list_error: Mutex<Option<BackendError>>,
    delete_error: Mutex<Option<BackendError>>,
    login_response: Mutex<Option<LoginResponse>>,
    list_calls: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeBackend {
    /// Create an empty fake backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an immediate successful chat reply
    pub fn push_reply(&self, response: &str, conversation_id: &str) {
        self.push_delayed_result(Duration::ZERO, Ok(chat_response(response, conversation_id)));
    }

    /// Queue a successful chat reply that arrives after `delay`
    pub fn push_delayed_reply(&self, delay: Duration, response: &str, conversation_id: &str) {
        self.push_delayed_result(delay, Ok(chat_response(response, conversation_id)));
    }

    /// Queue an immediate chat failure
    pub fn push_error(&self, error: BackendError) {
        self.push_delayed_result(Duration::ZERO, Err(error));
    }

    /// Queue an arbitrary chat outcome after `delay`
    pub fn push_delayed_result(
        &self,
        delay: Duration,
        result: Result<ChatResponse, BackendError>,
    ) {
        lock(&self.replies).push_back(ScriptedReply { delay, result });
    }

    /// Replace the conversation list
    pub fn set_conversations(&self, conversations: Vec<Conversation>) {
        *lock(&self.conversations) = conversations;
    }

    /// Register the detail returned for a conversation id
    pub fn insert_detail(&self, detail: ConversationDetail) {
        lock(&self.details).insert(detail.id.clone(), detail);
    }

    /// Make `list_conversations` fail until cleared
    pub fn fail_list(&self, error: Option<BackendError>) {
        *lock(&self.list_error) = error;
    }

    /// Make `delete_conversation` fail until cleared
    pub fn fail_delete(&self, error: Option<BackendError>) {
        *lock(&self.delete_error) = error;
    }

    /// Set the response returned by `login`
    pub fn set_login_response(&self, response: LoginResponse) {
        *lock(&self.login_response) = Some(response);
    }

    /// Chat requests received so far, in order
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        lock(&self.chat_requests).clone()
    }

    /// Number of `list_conversations` calls received
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Ids passed to successful `delete_conversation` calls
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }
}

fn chat_response(response: &str, conversation_id: &str) -> ChatResponse {
    ChatResponse {
        response: response.to_string(),
        conversation_id: conversation_id.to_string(),
        question: None,
        created_at: None,
    }
}

fn not_found() -> BackendError {
    BackendError::Status {
        status: 404,
        detail: Some("Conversation not found".to_string()),
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        lock(&self.chat_requests).push(request.clone());
        let scripted = lock(&self.replies).pop_front();
        match scripted {
            Some(reply) => {
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                reply.result
            }
            None => Err(BackendError::Transport("no scripted reply".to_string())),
        }
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, BackendError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.list_error).clone() {
            return Err(err);
        }
        Ok(lock(&self.conversations).clone())
    }

    async fn get_conversation(&self, id: &str) -> Result<ConversationDetail, BackendError> {
        lock(&self.details).get(id).cloned().ok_or_else(not_found)
    }

    async fn create_conversation(&self, title: &str) -> Result<Conversation, BackendError> {
        let conversation = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            last_message: None,
            created_at: Some(chrono::Utc::now()),
            updated_at: chrono::Utc::now(),
        };
        lock(&self.conversations).insert(0, conversation.clone());
        Ok(conversation)
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), BackendError> {
        if let Some(err) = lock(&self.delete_error).clone() {
            return Err(err);
        }
        let mut conversations = lock(&self.conversations);
        let before = conversations.len();
        conversations.retain(|c| c.id != id);
        if conversations.len() == before {
            return Err(not_found());
        }
        lock(&self.deleted).push(id.to_string());
        Ok(())
    }

    async fn login(&self, email: &str, _password: &str) -> Result<LoginResponse, BackendError> {
        lock(&self.login_response).clone().ok_or_else(|| BackendError::Status {
            status: 401,
            detail: Some(format!("Invalid credentials for {}", email)),
        })
    }

    async fn signup(
        &self,
        username: &str,
        email: &str,
        _password: &str,
    ) -> Result<User, BackendError> {
        Ok(User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_are_served_in_order() {
        let backend = FakeBackend::new();
        backend.push_reply("first", "c1");
        backend.push_error(BackendError::Status {
            status: 429,
            detail: None,
        });

        let req = ChatRequest {
            message: "hi".into(),
            conversation_id: None,
        };
        assert_eq!(backend.send_chat(&req).await.unwrap().response, "first");
        assert_eq!(backend.send_chat(&req).await.unwrap_err().status(), Some(429));
        assert!(matches!(
            backend.send_chat(&req).await,
            Err(BackendError::Transport(_))
        ));
        assert_eq!(backend.chat_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_unknown_conversation_is_not_found() {
        let backend = FakeBackend::new();
        let err = backend.delete_conversation("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(backend.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let backend = FakeBackend::new();
        let created = backend.create_conversation("Notes").await.unwrap();
        let listed = backend.list_conversations().await.unwrap();
        assert_eq!(listed, vec![created]);
        assert_eq!(backend.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_login_without_script_is_unauthorized() {
        let backend = FakeBackend::new();
        let err = backend.login("a@b.c", "pw").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }
}
