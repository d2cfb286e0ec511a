//! Per-session conversation state.
//!
//! [`ConversationState`] is mutated by the agent loop once per step:
//!
//! 1. append the step's [`HistoryItem`] with [`record`](ConversationState::record)
//!    or [`record_step`](ConversationState::record_step);
//! 2. [`consume_read_state`](ConversationState::consume_read_state) to pick up
//!    whatever a read action left in the scratch fields;
//! 3. rebuild the state slot of the [`MessageHistory`] from
//!    [`render_history`](ConversationState::render_history) and the snapshot.
//!
//! The state is single-writer. Nothing here locks; callers sharing it across
//! tasks must wrap it themselves.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::history::{HistoryItem, MessageHistory, StepFields};
use crate::{ImageAttachment, ValidationError};

/// Snapshot of the read-state scratch fields, handed out exactly once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadState {
    /// Description of what the last read action saw (page extract, file
    /// contents summary, ...).
    pub description: String,
    /// Images to attach to the next state message.
    pub images: Vec<ImageAttachment>,
}

impl ReadState {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.images.is_empty()
    }
}

impl From<ReadState> for (String, Vec<ImageAttachment>) {
    fn from(state: ReadState) -> Self {
        (state.description, state.images)
    }
}

/// Assembler, append-only step log, tool-call counter, and read-state scratch.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "RawConversationState")]
pub struct ConversationState {
    history: MessageHistory,
    tool_id: u64,
    agent_history_items: Vec<HistoryItem>,
    read_state_description: String,
    read_state_images: Vec<ImageAttachment>,
}

/// Deserialization target; validated into [`ConversationState`].
#[derive(Deserialize)]
struct RawConversationState {
    #[serde(default)]
    history: MessageHistory,
    tool_id: u64,
    agent_history_items: Vec<HistoryItem>,
    #[serde(default)]
    read_state_description: String,
    #[serde(default)]
    read_state_images: Vec<ImageAttachment>,
}

impl TryFrom<RawConversationState> for ConversationState {
    type Error = ValidationError;

    fn try_from(raw: RawConversationState) -> Result<Self, Self::Error> {
        if raw.agent_history_items.is_empty() {
            return Err(ValidationError::EmptyHistory);
        }
        if raw.tool_id == 0 {
            return Err(ValidationError::ZeroToolId);
        }
        Ok(Self {
            history: raw.history,
            tool_id: raw.tool_id,
            agent_history_items: raw.agent_history_items,
            read_state_description: raw.read_state_description,
            read_state_images: raw.read_state_images,
        })
    }
}

impl ConversationState {
    /// Fresh session: empty assembler, a log holding only the
    /// "Agent initialized" item, tool counter at 1, empty scratch.
    pub fn new() -> Self {
        Self {
            history: MessageHistory::new(),
            tool_id: 1,
            agent_history_items: vec![HistoryItem::initialized()],
            read_state_description: String::new(),
            read_state_images: Vec::new(),
        }
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut MessageHistory {
        &mut self.history
    }

    /// The step log, oldest first. Never empty.
    pub fn items(&self) -> &[HistoryItem] {
        &self.agent_history_items
    }

    pub fn last_item(&self) -> Option<&HistoryItem> {
        self.agent_history_items.last()
    }

    /// Append an already-validated item.
    pub fn record_step(&mut self, item: HistoryItem) {
        debug!(
            "Recording history item {} (step {:?})",
            self.agent_history_items.len(),
            item.step_number()
        );
        self.agent_history_items.push(item);
    }

    /// Build an item from raw step fields and append it.
    ///
    /// Construction failures propagate unchanged; the log is untouched.
    pub fn record(&mut self, fields: StepFields) -> Result<(), ValidationError> {
        let item = HistoryItem::from_fields(fields)?;
        self.record_step(item);
        Ok(())
    }

    /// Return the current tool-call id, then advance the counter.
    ///
    /// The counter saturates at `u64::MAX`: ids stay positive and never
    /// decrease, but are only unique below the ceiling.
    pub fn next_tool_id(&mut self) -> u64 {
        let id = self.tool_id;
        self.tool_id = id.saturating_add(1);
        if id == u64::MAX {
            warn!("Tool-call counter exhausted; reusing id {id}");
        }
        id
    }

    /// The id the next [`next_tool_id`](Self::next_tool_id) call will return.
    pub fn current_tool_id(&self) -> u64 {
        self.tool_id
    }

    /// Replace the scratch fields. Anything not yet consumed is overwritten.
    pub fn set_read_state(
        &mut self,
        description: impl Into<String>,
        images: Vec<ImageAttachment>,
    ) {
        self.read_state_description = description.into();
        self.read_state_images = images;
    }

    /// Take the scratch fields, leaving them empty.
    ///
    /// A second call before the next [`set_read_state`](Self::set_read_state)
    /// returns an empty [`ReadState`].
    pub fn consume_read_state(&mut self) -> ReadState {
        let state = ReadState {
            description: std::mem::take(&mut self.read_state_description),
            images: std::mem::take(&mut self.read_state_images),
        };
        if !state.is_empty() {
            debug!(
                "Consumed read state ({} chars, {} image(s))",
                state.description.len(),
                state.images.len()
            );
        }
        state
    }

    /// Render the step log as the text block given to the model.
    ///
    /// Items are joined with `\n`. With `max_items = Some(n)` and a longer
    /// log, the first item is kept, followed by an omission marker and the
    /// most recent `n - 1` items. Choosing `n` is up to the caller.
    pub fn render_history(&self, max_items: Option<usize>) -> String {
        let total = self.agent_history_items.len();
        let Some((first, rest)) = self.agent_history_items.split_first() else {
            return String::new();
        };

        match max_items {
            Some(limit) if total > limit.max(1) => {
                let keep_recent = limit.max(1) - 1;
                let omitted = rest.len() - keep_recent;
                let mut parts = Vec::with_capacity(keep_recent + 2);
                parts.push(first.render());
                parts.push(format!(
                    "<sys>[... {omitted} previous steps omitted...]</sys>"
                ));
                parts.extend(rest[omitted..].iter().map(HistoryItem::render));
                parts.join("\n")
            }
            _ => self
                .agent_history_items
                .iter()
                .map(HistoryItem::render)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
