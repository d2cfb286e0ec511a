//! Conversation-state core for cinch agents.
//!
//! `cinch-state` owns what an agent "remembers" between steps and how that
//! memory reaches the model. It is a library consumed by an orchestration
//! loop; it makes no LLM calls and drives no tools itself.
//!
//! # Where to find things
//!
//! - **Record what happened in a step:** see [`HistoryItem`](history::HistoryItem)
//!   and [`StepFields`](history::StepFields). Items render to the compact
//!   `<stepN>` text blocks that are fed back to the model.
//!
//! - **Assemble the request messages:** see
//!   [`MessageHistory`](history::MessageHistory). Output order is always
//!   system, then state, then context messages in insertion order.
//!
//! - **Track per-session state:** see [`ConversationState`](state::ConversationState)
//!   for the append-only step log, tool-call counter, and consume-once
//!   read-state scratch fields. [`checkpoint`] saves and loads it.
//!
//! - **Persist an exchange for debugging:** see
//!   [`TranscriptWriter`](transcript::TranscriptWriter) and
//!   [`AgentOutput`](transcript::AgentOutput).
//!
//! # Example
//!
//! ```
//! use cinch_state::prelude::*;
//!
//! let mut state = ConversationState::new();
//! state.record(StepFields {
//!     step_number: Some(1),
//!     memory: Some("Opened the login page".into()),
//!     next_goal: Some("Fill in the username".into()),
//!     ..Default::default()
//! })?;
//!
//! let rendered = state.render_history(None);
//! state.history_mut().set_system(Message::system("You are a browser agent."));
//! state.history_mut().set_state(Message::user(rendered));
//!
//! let messages = state.history().ordered_messages();
//! assert_eq!(messages.len(), 2);
//! assert_eq!(state.next_tool_id(), 1);
//! # Ok::<(), cinch_state::ValidationError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`history`] | [`HistoryItem`](history::HistoryItem) step records and the [`MessageHistory`](history::MessageHistory) assembler |
//! | [`state`] | [`ConversationState`](state::ConversationState): step log, tool ids, read-state scratch |
//! | [`transcript`] | Prompt + response transcript files, response field tracking, encodings |
//! | [`checkpoint`] | Atomic JSON save/load of a [`ConversationState`](state::ConversationState) |
//! | [`config`] | [`TranscriptConfig`](config::TranscriptConfig) |
//! | [`error`] | [`ValidationError`] and the crate [`Error`] |

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod history;
pub mod prelude;
pub mod state;
pub mod transcript;

use serde::{Deserialize, Serialize};

pub use error::{Error, ValidationError};

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: Some(content.into()),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(content.into()),
            tool_call_id: None,
        }
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.into()),
            tool_call_id: None,
        }
    }

    /// Tool result correlated with an id from
    /// [`ConversationState::next_tool_id`](state::ConversationState::next_tool_id).
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_call_id: Some(call_id.into()),
        }
    }

    /// Plain-text content, or `""` when the message carries none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// An image carried into the next state message (page screenshot, chart
/// extracted while reading a page, ...).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Display name, e.g. the source file or element label.
    pub name: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl ImageAttachment {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display_is_lowercase() {
        assert_eq!(MessageRole::System.to_string(), "system");
        assert_eq!(MessageRole::User.to_string(), "user");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
        assert_eq!(MessageRole::Tool.to_string(), "tool");
    }

    #[test]
    fn text_of_empty_message_is_empty() {
        let msg = Message {
            role: MessageRole::Assistant,
            content: None,
            tool_call_id: None,
        };
        assert_eq!(msg.text(), "");
    }

    #[test]
    fn tool_result_carries_call_id() {
        let msg = Message::tool_result("3", "clicked");
        assert_eq!(msg.role, MessageRole::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("3"));
        assert_eq!(msg.text(), "clicked");
    }

    #[test]
    fn message_serializes_without_absent_fields() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
