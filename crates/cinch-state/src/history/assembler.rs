//! Fixed-order message assembly for model requests.
//!
//! [`MessageHistory`] holds three slots and always emits them in the same
//! order:
//!
//! 1. **System**: rules and task framing. At most one.
//! 2. **State**: the current environment snapshot plus rendered step
//!    history. At most one, replaced every step.
//! 3. **Context**: ad-hoc additions for this step ("the last action
//!    failed, retry"), in insertion order.

use serde::{Deserialize, Serialize};

use crate::Message;

/// Three-slot message assembler.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MessageHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system_message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_message: Option<Message>,
    #[serde(default)]
    context_messages: Vec<Message>,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the system slot.
    pub fn set_system(&mut self, msg: Message) {
        self.system_message = Some(msg);
    }

    /// Set (or replace) the state slot.
    pub fn set_state(&mut self, msg: Message) {
        self.state_message = Some(msg);
    }

    pub fn clear_state(&mut self) {
        self.state_message = None;
    }

    /// Append a context message after any already present.
    pub fn add_context(&mut self, msg: Message) {
        self.context_messages.push(msg);
    }

    pub fn clear_context(&mut self) {
        self.context_messages.clear();
    }

    pub fn context_len(&self) -> usize {
        self.context_messages.len()
    }

    /// Whether no slot holds a message.
    pub fn is_empty(&self) -> bool {
        self.system_message.is_none()
            && self.state_message.is_none()
            && self.context_messages.is_empty()
    }

    /// `[system?, state?, ...context]`, omitting unset slots.
    ///
    /// Borrows; repeated calls return the same sequence.
    pub fn ordered_messages(&self) -> Vec<&Message> {
        self.system_message
            .iter()
            .chain(self.state_message.iter())
            .chain(self.context_messages.iter())
            .collect()
    }

    /// Owned copy of [`ordered_messages`](Self::ordered_messages) for
    /// building a request body.
    pub fn to_messages(&self) -> Vec<Message> {
        self.ordered_messages().into_iter().cloned().collect()
    }
}
