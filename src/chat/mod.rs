//! Chat session: state, send pipeline and failure handling
//!
//! - [`state`] -- the chat state and its reducer
//! - [`controller`] -- runs sends against a backend and manages conversations
//! - [`failure`] -- failure classification and user-facing texts
//! - [`slot`] -- single-resolution slot used to race a send against its timeout

pub mod controller;
pub mod failure;
pub mod slot;
pub mod state;

pub use controller::{ChatController, SendReport, SidebarView};
pub use failure::{LoadFailure, SendFailure};
pub use slot::SettleSlot;
pub use state::{Action, ChatState, Dispatch, Effect, SendId, SendOutcome, SendPhase};
