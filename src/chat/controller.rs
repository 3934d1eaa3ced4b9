//! Chat controller: drives sends and conversation management
//!
//! The controller owns the [`ChatState`] behind a mutex and is the only code
//! that dispatches actions to it. A send races three tasks:
//!
//! - the network request, which resolves the settle slot with the reply or
//!   a classified failure
//! - the timeout timer, which resolves the slot with [`SendFailure::Timeout`]
//! - the slow-response timer, which only raises the slow flag
//!
//! Whichever of the first two resolves the slot decides the outcome. The
//! timers are aborted once the outcome is known; the network request is left
//! to finish and its late result is dropped.

use crate::api::{BackendError, ChatBackend, ChatRequest};
use crate::chat::failure::{LoadFailure, SendFailure};
use crate::chat::slot::SettleSlot;
use crate::chat::state::{Action, ChatState, Dispatch, Effect, SendId, SendOutcome};
use crate::config::Config;
use crate::conversation::{categorize, CategorizedConversations, Conversation, Message, WeekStart};
use crate::error::Result;
use crate::session::SessionContext;

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// What happened to a [`ChatController::send_message`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendReport {
    /// Blank text, or a send was already in flight
    Ignored,
    /// The send settled with this outcome
    Settled(SendOutcome),
}

/// Sidebar contents at a given instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarView {
    /// Conversations grouped by recency, filtered by the search term
    pub buckets: CategorizedConversations,
    /// The filtered buckets contain at least one conversation
    pub has_results: bool,
    /// The unfiltered list contains at least one conversation
    pub has_conversations: bool,
    /// A list fetch is in progress
    pub loading: bool,
}

/// Coordinates the chat state with the backend
pub struct ChatController {
    backend: Arc<dyn ChatBackend>,
    state: Arc<Mutex<ChatState>>,
    request_timeout: Duration,
    slow_after: Duration,
    week_start: WeekStart,
    slow_tx: Arc<watch::Sender<bool>>,
}

fn lock(state: &Mutex<ChatState>) -> MutexGuard<'_, ChatState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn fetch_conversations(
    backend: &dyn ChatBackend,
    state: &Mutex<ChatState>,
) -> std::result::Result<usize, LoadFailure> {
    let _ = lock(state).apply(Action::ConversationsLoading);
    match backend.list_conversations().await {
        Ok(conversations) => {
            let count = conversations.len();
            tracing::debug!("Loaded {} conversations", count);
            let _ = lock(state).apply(Action::ConversationsLoaded(conversations));
            Ok(count)
        }
        Err(source) => {
            tracing::error!("Failed to load conversations: {}", source);
            let _ = lock(state).apply(Action::ConversationsLoadFailed);
            Err(LoadFailure {
                what: "conversations".to_string(),
                source,
            })
        }
    }
}

/// Everything one send needs, owned so it can run detached from the caller
struct SendPipeline {
    backend: Arc<dyn ChatBackend>,
    state: Arc<Mutex<ChatState>>,
    slow_tx: Arc<watch::Sender<bool>>,
    request_timeout: Duration,
    slow_after: Duration,
}

impl SendPipeline {
    /// Race the send, settle the state, then run follow-up effects
    async fn run(self, send_id: SendId, request: ChatRequest) -> SendOutcome {
        let outcome = self.race(send_id, request).await;

        let effects = lock(&self.state)
            .apply(Action::SendSettled {
                send_id,
                outcome: outcome.clone(),
            })
            .into_effects();
        self.slow_tx.send_replace(false);

        for effect in effects {
            if effect == Effect::RefreshConversations {
                if let Err(e) = fetch_conversations(self.backend.as_ref(), &self.state).await {
                    tracing::warn!("Conversation list refresh after send failed: {}", e);
                }
            }
        }

        outcome
    }

    async fn race(&self, send_id: SendId, request: ChatRequest) -> SendOutcome {
        let (slot, settled) = SettleSlot::new();

        let network_slot = slot.clone();
        let backend = Arc::clone(&self.backend);
        // Detached: a reply that loses the race is dropped by the slot.
        tokio::spawn(async move {
            let outcome = match backend.send_chat(&request).await {
                Ok(reply) => SendOutcome::Replied {
                    response: reply.response,
                    conversation_id: reply.conversation_id,
                },
                Err(err) => {
                    tracing::warn!("Chat request {} failed: {}", send_id, err);
                    SendOutcome::Failed(SendFailure::classify(&err))
                }
            };
            if !network_slot.resolve(outcome) {
                tracing::debug!("Discarding late result for send {}", send_id);
            }
        });

        let timer_slot = slot;
        let timeout = self.request_timeout;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if timer_slot.resolve(SendOutcome::Failed(SendFailure::Timeout)) {
                tracing::warn!("Chat request {} timed out after {:?}", send_id, timeout);
            }
        });

        let state = Arc::clone(&self.state);
        let slow_tx = Arc::clone(&self.slow_tx);
        let slow_after = self.slow_after;
        let slow = tokio::spawn(async move {
            tokio::time::sleep(slow_after).await;
            if lock(&state).apply(Action::SlowResponse(send_id)).is_applied() {
                tracing::info!("Chat request {} is taking longer than {:?}", send_id, slow_after);
                slow_tx.send_replace(true);
            }
        });

        let outcome = settled.await.unwrap_or_else(|_| {
            tracing::error!("Send {} ended without a result", send_id);
            SendOutcome::Failed(SendFailure::Unknown)
        });

        timer.abort();
        slow.abort();
        outcome
    }
}

impl ChatController {
    /// Create a controller
    ///
    /// # Arguments
    ///
    /// * `backend` - Backend used for every request
    /// * `request_timeout` - Client-side limit for a chat send
    /// * `slow_after` - Elapsed time after which a send is flagged as slow
    /// * `week_start` - First day of the week for sidebar grouping
    /// * `dark_mode` - Persisted theme preference
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        request_timeout: Duration,
        slow_after: Duration,
        week_start: WeekStart,
        dark_mode: bool,
    ) -> Self {
        let (slow_tx, _) = watch::channel(false);
        Self {
            backend,
            state: Arc::new(Mutex::new(ChatState::new(dark_mode))),
            request_timeout,
            slow_after,
            week_start,
            slow_tx: Arc::new(slow_tx),
        }
    }

    /// Create a controller from loaded configuration
    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &Config, dark_mode: bool) -> Self {
        Self::new(
            backend,
            config.chat.request_timeout(),
            config.chat.slow_response_after(),
            config.sidebar.week_start,
            dark_mode,
        )
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ChatState {
        lock(&self.state).clone()
    }

    /// Subscribe to the slow-response flag
    ///
    /// The value turns `true` once an in-flight send passes the slow-response
    /// threshold and back to `false` when the send settles.
    pub fn watch_slow_response(&self) -> watch::Receiver<bool> {
        self.slow_tx.subscribe()
    }

    fn dispatch(&self, action: Action) -> Dispatch {
        lock(&self.state).apply(action)
    }

    /// Record composer edits
    pub fn set_input(&self, text: &str) {
        let _ = self.dispatch(Action::InputChanged(text.to_string()));
    }

    /// Send a message and wait until it settles
    ///
    /// Blank text, or a call while another send is in flight, is ignored. A
    /// failed send is not an error: the failure text is appended to the
    /// conversation as the assistant's reply and reported in the outcome.
    ///
    /// The send runs on its own task. Dropping the returned future stops the
    /// wait but not the send, which still settles and clears the slow flag.
    pub async fn send_message(&self, text: &str) -> SendReport {
        let effects = self.dispatch(Action::Submit(text.to_string())).into_effects();
        let Some((send_id, request)) = effects.into_iter().find_map(|effect| match effect {
            Effect::Send { send_id, request } => Some((send_id, request)),
            _ => None,
        }) else {
            tracing::debug!("Ignoring submit: blank message or send already in flight");
            return SendReport::Ignored;
        };

        tracing::info!(
            "Sending message {} (conversation: {})",
            send_id,
            request.conversation_id.as_deref().unwrap_or("new")
        );

        let pipeline = SendPipeline {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
            slow_tx: Arc::clone(&self.slow_tx),
            request_timeout: self.request_timeout,
            slow_after: self.slow_after,
        };
        match tokio::spawn(pipeline.run(send_id, request)).await {
            Ok(outcome) => SendReport::Settled(outcome),
            Err(e) => {
                tracing::error!("Send {} task failed: {}", send_id, e);
                let outcome = SendOutcome::Failed(SendFailure::Unknown);
                let _ = self.dispatch(Action::SendSettled {
                    send_id,
                    outcome: outcome.clone(),
                });
                self.slow_tx.send_replace(false);
                SendReport::Settled(outcome)
            }
        }
    }

    /// Fetch the conversation list
    ///
    /// On failure the previous list is kept and the error is returned.
    pub async fn load_conversations(&self) -> std::result::Result<usize, LoadFailure> {
        fetch_conversations(self.backend.as_ref(), &self.state).await
    }

    /// Load a conversation's messages and make it current
    pub async fn open_conversation(&self, id: &str) -> std::result::Result<usize, LoadFailure> {
        match self.backend.get_conversation(id).await {
            Ok(detail) => {
                let messages: Vec<Message> =
                    detail.messages.into_iter().map(Message::from).collect();
                let count = messages.len();
                let _ = self.dispatch(Action::ConversationOpened {
                    conversation_id: detail.id,
                    messages,
                });
                tracing::info!("Opened conversation {} ({} messages)", id, count);
                Ok(count)
            }
            Err(source) => {
                tracing::error!("Failed to load conversation {}: {}", id, source);
                Err(LoadFailure {
                    what: format!("conversation {}", id),
                    source,
                })
            }
        }
    }

    /// Clear the screen; the next send starts a new conversation
    pub fn new_conversation(&self) {
        let _ = self.dispatch(Action::NewConversation);
    }

    /// Create an empty conversation on the backend and make it current
    pub async fn create_conversation(
        &self,
        title: &str,
    ) -> std::result::Result<Conversation, BackendError> {
        let conversation = self.backend.create_conversation(title).await?;
        let _ = self.dispatch(Action::ConversationOpened {
            conversation_id: conversation.id.clone(),
            messages: Vec::new(),
        });
        if let Err(e) = self.load_conversations().await {
            tracing::warn!("Conversation list refresh after create failed: {}", e);
        }
        Ok(conversation)
    }

    /// Delete a conversation
    ///
    /// On success it is removed from the list, and the screen is cleared if
    /// it was the current conversation. On failure the list is unchanged and
    /// a notification is raised.
    pub async fn delete_conversation(&self, id: &str) -> std::result::Result<(), BackendError> {
        match self.backend.delete_conversation(id).await {
            Ok(()) => {
                let _ = self.dispatch(Action::ConversationDeleted(id.to_string()));
                tracing::info!("Deleted conversation {}", id);
                Ok(())
            }
            Err(err) => {
                tracing::error!("Failed to delete conversation {}: {}", id, err);
                let _ = self.dispatch(Action::DeleteFailed(format!(
                    "Failed to delete conversation: {}",
                    err
                )));
                Err(err)
            }
        }
    }

    /// Take the pending notification, if any
    pub fn take_notification(&self) -> Option<String> {
        let mut state = lock(&self.state);
        let notification = state.notification.clone();
        let _ = state.apply(Action::NotificationDismissed);
        notification
    }

    /// Update the sidebar search term
    pub fn set_search(&self, term: &str) {
        let _ = self.dispatch(Action::SearchChanged(term.to_string()));
    }

    /// Sidebar contents relative to `now`
    pub fn sidebar<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> SidebarView {
        let state = lock(&self.state);
        let all = categorize(now, &state.conversations, self.week_start);
        let buckets = all.filter(&state.search_term);
        SidebarView {
            has_results: buckets.has_results(),
            has_conversations: !state.conversations.is_empty(),
            loading: state.loading_conversations,
            buckets,
        }
    }

    /// Set and persist the display theme
    pub fn set_dark_mode(&self, session: &SessionContext, enabled: bool) -> Result<()> {
        session.set_dark_mode(enabled)?;
        let _ = self.dispatch(Action::DarkModeSet(enabled));
        Ok(())
    }

    /// Flip and persist the display theme; returns the new value
    pub fn toggle_dark_mode(&self, session: &SessionContext) -> Result<bool> {
        let enabled = !lock(&self.state).dark_mode;
        self.set_dark_mode(session, enabled)?;
        Ok(enabled)
    }
}
