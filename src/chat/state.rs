//! Chat view state and its reducer
//!
//! Every change to what the user sees goes through [`ChatState::apply`].
//! Actions that arrive for a send that is no longer active (a slow-response
//! timer that fired late, a result that lost the timeout race) are ignored.

use crate::api::ChatRequest;
use crate::chat::failure::SendFailure;
use crate::conversation::{Conversation, Message};
use std::fmt;

/// Identifier of one send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SendId(u64);

impl fmt::Display for SendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a send is in flight
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SendPhase {
    #[default]
    Idle,
    /// A send is in flight
    Sending {
        send_id: SendId,
        /// Conversation the message was sent to; `None` for a new conversation
        conversation_id: Option<String>,
    },
}

/// Settled result of a send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The backend replied before the timeout
    Replied {
        response: String,
        conversation_id: String,
    },
    /// The send failed; the failure text is shown as the reply
    Failed(SendFailure),
}

/// Everything that can change the chat state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Composer text edited
    InputChanged(String),
    /// User asked to send a message
    Submit(String),
    /// Slow-response threshold passed for a send
    SlowResponse(SendId),
    /// A send finished (reply, failure or timeout)
    SendSettled {
        send_id: SendId,
        outcome: SendOutcome,
    },
    /// A conversation list fetch started
    ConversationsLoading,
    /// A conversation list fetch succeeded
    ConversationsLoaded(Vec<Conversation>),
    /// A conversation list fetch failed; the list is left unchanged
    ConversationsLoadFailed,
    /// A conversation's messages were loaded
    ConversationOpened {
        conversation_id: String,
        messages: Vec<Message>,
    },
    /// Start a fresh conversation
    NewConversation,
    /// The backend confirmed a delete
    ConversationDeleted(String),
    /// The backend rejected a delete
    DeleteFailed(String),
    /// Transient notification acknowledged
    NotificationDismissed,
    /// Sidebar search term edited
    SearchChanged(String),
    /// Display theme changed
    DarkModeSet(bool),
}

/// Follow-up work requested by the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue the chat request for a newly started send
    Send {
        send_id: SendId,
        request: ChatRequest,
    },
    /// Reload the conversation list
    RefreshConversations,
}

/// Result of applying an action
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Dispatch {
    /// The action did not apply to the current state
    Ignored,
    /// The state changed; the effects must be carried out
    Applied(Vec<Effect>),
}

impl Dispatch {
    /// True when the action changed the state
    pub fn is_applied(&self) -> bool {
        matches!(self, Dispatch::Applied(_))
    }

    /// Effects to run (empty when ignored)
    pub fn into_effects(self) -> Vec<Effect> {
        match self {
            Dispatch::Ignored => Vec::new(),
            Dispatch::Applied(effects) => effects,
        }
    }
}

/// State of the chat screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    /// Messages of the conversation on screen
    pub messages: Vec<Message>,
    /// Composer text
    pub input: String,
    /// Send state
    pub phase: SendPhase,
    /// In-flight request has passed the slow-response threshold
    pub slow_response: bool,
    /// Cached conversation list
    pub conversations: Vec<Conversation>,
    /// A conversation list fetch is in progress
    pub loading_conversations: bool,
    /// Conversation on screen; `None` until the first reply of a new one
    pub current_conversation_id: Option<String>,
    /// Sidebar search term
    pub search_term: String,
    /// Transient notification (e.g. a failed delete)
    pub notification: Option<String>,
    /// Dark display theme
    pub dark_mode: bool,
    next_send_id: u64,
}

impl ChatState {
    /// Create an empty state with the persisted theme applied
    pub fn new(dark_mode: bool) -> Self {
        Self {
            dark_mode,
            ..Self::default()
        }
    }

    /// True while a send is in flight
    pub fn is_sending(&self) -> bool {
        matches!(self.phase, SendPhase::Sending { .. })
    }

    /// True when `send_id` is the send in flight
    pub fn is_active_send(&self, send_id: SendId) -> bool {
        matches!(&self.phase, SendPhase::Sending { send_id: active, .. } if *active == send_id)
    }

    /// Apply an action
    pub fn apply(&mut self, action: Action) -> Dispatch {
        match action {
            Action::InputChanged(text) => {
                self.input = text;
                Dispatch::Applied(Vec::new())
            }
            Action::Submit(text) => self.submit(text),
            Action::SlowResponse(send_id) => {
                if !self.is_active_send(send_id) {
                    tracing::trace!("Ignoring slow-response signal for inactive send {}", send_id);
                    return Dispatch::Ignored;
                }
                self.slow_response = true;
                Dispatch::Applied(Vec::new())
            }
            Action::SendSettled { send_id, outcome } => self.settle(send_id, outcome),
            Action::ConversationsLoading => {
                self.loading_conversations = true;
                Dispatch::Applied(Vec::new())
            }
            Action::ConversationsLoaded(conversations) => {
                self.conversations = conversations;
                self.loading_conversations = false;
                Dispatch::Applied(Vec::new())
            }
            Action::ConversationsLoadFailed => {
                self.loading_conversations = false;
                Dispatch::Applied(Vec::new())
            }
            Action::ConversationOpened {
                conversation_id,
                messages,
            } => {
                self.messages = messages;
                self.current_conversation_id = Some(conversation_id);
                Dispatch::Applied(Vec::new())
            }
            Action::NewConversation => {
                self.messages.clear();
                self.current_conversation_id = None;
                Dispatch::Applied(Vec::new())
            }
            Action::ConversationDeleted(id) => {
                let before = self.conversations.len();
                self.conversations.retain(|c| c.id != id);
                if self.current_conversation_id.as_deref() == Some(id.as_str()) {
                    self.messages.clear();
                    self.current_conversation_id = None;
                } else if self.conversations.len() == before {
                    return Dispatch::Ignored;
                }
                Dispatch::Applied(Vec::new())
            }
            Action::DeleteFailed(reason) => {
                self.notification = Some(reason);
                Dispatch::Applied(Vec::new())
            }
            Action::NotificationDismissed => {
                if self.notification.take().is_none() {
                    return Dispatch::Ignored;
                }
                Dispatch::Applied(Vec::new())
            }
            Action::SearchChanged(term) => {
                self.search_term = term;
                Dispatch::Applied(Vec::new())
            }
            Action::DarkModeSet(enabled) => {
                self.dark_mode = enabled;
                Dispatch::Applied(Vec::new())
            }
        }
    }

    fn submit(&mut self, text: String) -> Dispatch {
        if text.trim().is_empty() || self.is_sending() {
            return Dispatch::Ignored;
        }

        self.next_send_id += 1;
        let send_id = SendId(self.next_send_id);
        let conversation_id = self.current_conversation_id.clone();

        self.messages.push(Message::user(text.clone()));
        self.input.clear();
        self.phase = SendPhase::Sending {
            send_id,
            conversation_id: conversation_id.clone(),
        };

        Dispatch::Applied(vec![Effect::Send {
            send_id,
            request: ChatRequest {
                message: text,
                conversation_id,
            },
        }])
    }

    fn settle(&mut self, send_id: SendId, outcome: SendOutcome) -> Dispatch {
        let started_in = match &self.phase {
            SendPhase::Sending {
                send_id: active,
                conversation_id,
            } if *active == send_id => conversation_id.clone(),
            _ => {
                tracing::debug!("Discarding result for inactive send {}", send_id);
                return Dispatch::Ignored;
            }
        };

        self.phase = SendPhase::Idle;
        self.slow_response = false;

        let mut effects = Vec::new();
        match outcome {
            SendOutcome::Replied {
                response,
                conversation_id,
            } => {
                self.messages.push(Message::ai(response));
                if started_in.is_none() {
                    self.current_conversation_id = Some(conversation_id);
                    effects.push(Effect::RefreshConversations);
                }
            }
            SendOutcome::Failed(failure) => {
                self.messages.push(Message::ai(failure.user_message()));
            }
        }

        Dispatch::Applied(effects)
    }
}
