//! Single-resolution result slot
//!
//! Several tasks may race to resolve a [`SettleSlot`]; only the first write
//! is delivered to the receiver and every later write is a no-op that
//! reports `false`.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

/// Cloneable handle to a slot that accepts exactly one value
#[derive(Debug)]
pub struct SettleSlot<T> {
    sender: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for SettleSlot<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T> SettleSlot<T> {
    /// Create a slot and the receiver that observes its value
    pub fn new() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                sender: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    /// Offer a value; returns `true` only for the write that claimed the slot
    pub fn resolve(&self, value: T) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => {
                // A dropped receiver still counts as the winning write.
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }

    /// True once some write has claimed the slot
    pub fn is_resolved(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
