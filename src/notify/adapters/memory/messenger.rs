//! Recording in-memory messenger with scriptable failures.

use crate::notify::{
    domain::MessageId,
    ports::{Messenger, TransportError},
};
use crate::task::domain::ChatId;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// One delivered or edited message captured by the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination chat.
    pub chat: ChatId,
    /// Transport-side message identifier.
    pub message_id: MessageId,
    /// Rendered message text.
    pub text: String,
}

#[derive(Debug, Default)]
struct MessengerState {
    next_message_id: i64,
    sent: Vec<OutboundMessage>,
    edited: Vec<OutboundMessage>,
    deleted: Vec<(ChatId, MessageId)>,
    send_failures: VecDeque<TransportError>,
    edit_failures: VecDeque<TransportError>,
    delete_failures: VecDeque<TransportError>,
}

/// In-memory messenger that records traffic and fails on demand.
///
/// Scripted failures are consumed in FIFO order, one per call, so a test
/// can make exactly the third send fail while everything else succeeds.
#[derive(Debug, Clone, Default)]
pub struct RecordingMessenger {
    state: Arc<Mutex<MessengerState>>,
}

impl RecordingMessenger {
    /// Creates a fresh recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next `send` call to fail with `err`.
    pub fn fail_next_send(&self, err: TransportError) {
        self.locked().send_failures.push_back(err);
    }

    /// Scripts the next `edit` call to fail with `err`.
    pub fn fail_next_edit(&self, err: TransportError) {
        self.locked().edit_failures.push_back(err);
    }

    /// Scripts the next `delete` call to fail with `err`.
    pub fn fail_next_delete(&self, err: TransportError) {
        self.locked().delete_failures.push_back(err);
    }

    /// Every message delivered so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.locked().sent.clone()
    }

    /// Every in-place edit so far, in order.
    #[must_use]
    pub fn edited(&self) -> Vec<OutboundMessage> {
        self.locked().edited.clone()
    }

    /// Every deletion so far, in order.
    #[must_use]
    pub fn deleted(&self) -> Vec<(ChatId, MessageId)> {
        self.locked().deleted.clone()
    }

    fn locked(&self) -> MutexGuard<'_, MessengerState> {
        // A poisoned lock only happens after a panic in a test thread.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat: ChatId, text: &str) -> Result<MessageId, TransportError> {
        let mut state = self.locked();
        if let Some(err) = state.send_failures.pop_front() {
            return Err(err);
        }
        state.next_message_id += 1;
        let message_id = MessageId::new(state.next_message_id);
        state.sent.push(OutboundMessage {
            chat,
            message_id,
            text: text.to_owned(),
        });
        Ok(message_id)
    }

    async fn edit(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        let mut state = self.locked();
        if let Some(err) = state.edit_failures.pop_front() {
            return Err(err);
        }
        state.edited.push(OutboundMessage {
            chat,
            message_id: message,
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError> {
        let mut state = self.locked();
        if let Some(err) = state.delete_failures.pop_front() {
            return Err(err);
        }
        state.deleted.push((chat, message));
        Ok(())
    }
}
