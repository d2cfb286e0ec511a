//! Per-step outcome records.
//!
//! A [`HistoryItem`] is created once per completed step and never changes
//! afterwards. Its rendered form is what the model sees as memory of the
//! step:
//!
//! ```text
//! <step2>
//! Verdict: Success - the search box is visible
//! Searched for "rust books"
//! Open the first result
//! Clicked element 14
//! ```
//!
//! The opening `<stepN>` tag is never closed; the next item's tag acts as
//! the delimiter.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ValidationError;

/// System message of the item that seeds every step log.
pub const INITIALIZED_MESSAGE: &str = "Agent initialized";

/// Flat field bag describing one step, as produced by the step-result
/// collaborator. Converted into a [`HistoryItem`] via [`HistoryItem::from_fields`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StepFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_previous_goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_results: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
}

/// The model's own account of a step. Empty parts are skipped when rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepSummary {
    pub evaluation_previous_goal: Option<String>,
    pub memory: Option<String>,
    pub next_goal: Option<String>,
    pub action_results: Option<String>,
}

impl StepSummary {
    /// Non-empty parts in fixed order: evaluation, memory, next goal, results.
    fn parts(&self) -> impl Iterator<Item = &str> {
        [
            &self.evaluation_previous_goal,
            &self.memory,
            &self.next_goal,
            &self.action_results,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
    }
}

/// What a history item records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryEntry {
    /// The step failed.
    Error(String),
    /// A note injected by the runtime rather than produced by the model.
    SystemNote(String),
    /// A normal step.
    StepSummary(StepSummary),
}

/// One step's outcome record.
///
/// Error and system message are mutually exclusive by construction. Items
/// serialize in the flat [`StepFields`] shape and are re-validated on
/// deserialization.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "StepFields", into = "StepFields")]
pub struct HistoryItem {
    step_number: Option<u32>,
    entry: HistoryEntry,
}

impl HistoryItem {
    /// Build an item from the flat field bag.
    ///
    /// Fails when both `error` and `system_message` are present. Once that
    /// check passes, empty strings count as "not provided".
    pub fn from_fields(fields: StepFields) -> Result<Self, ValidationError> {
        if fields.error.is_some() && fields.system_message.is_some() {
            return Err(ValidationError::ErrorWithSystemMessage);
        }

        let entry = match (non_empty(fields.error), non_empty(fields.system_message)) {
            (Some(error), _) => HistoryEntry::Error(error),
            (None, Some(message)) => HistoryEntry::SystemNote(message),
            (None, None) => HistoryEntry::StepSummary(StepSummary {
                evaluation_previous_goal: non_empty(fields.evaluation_previous_goal),
                memory: non_empty(fields.memory),
                next_goal: non_empty(fields.next_goal),
                action_results: non_empty(fields.action_results),
            }),
        };

        Ok(Self {
            step_number: fields.step_number,
            entry,
        })
    }

    /// The item every step log starts with.
    pub fn initialized() -> Self {
        Self::system_note(Some(0), INITIALIZED_MESSAGE)
    }

    /// A failed step. Empty text yields an empty summary, as in
    /// [`from_fields`](Self::from_fields).
    pub fn error(step_number: Option<u32>, error: impl Into<String>) -> Self {
        let entry = match non_empty(Some(error.into())) {
            Some(error) => HistoryEntry::Error(error),
            None => HistoryEntry::StepSummary(StepSummary::default()),
        };
        Self { step_number, entry }
    }

    /// A runtime note. Empty text yields an empty summary.
    pub fn system_note(step_number: Option<u32>, message: impl Into<String>) -> Self {
        let entry = match non_empty(Some(message.into())) {
            Some(message) => HistoryEntry::SystemNote(message),
            None => HistoryEntry::StepSummary(StepSummary::default()),
        };
        Self { step_number, entry }
    }

    /// A normal step. Empty parts are dropped.
    pub fn step(step_number: Option<u32>, summary: StepSummary) -> Self {
        Self {
            step_number,
            entry: HistoryEntry::StepSummary(StepSummary {
                evaluation_previous_goal: non_empty(summary.evaluation_previous_goal),
                memory: non_empty(summary.memory),
                next_goal: non_empty(summary.next_goal),
                action_results: non_empty(summary.action_results),
            }),
        }
    }

    pub fn step_number(&self) -> Option<u32> {
        self.step_number
    }

    pub fn entry(&self) -> &HistoryEntry {
        &self.entry
    }

    pub fn error_text(&self) -> Option<&str> {
        match &self.entry {
            HistoryEntry::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn system_message(&self) -> Option<&str> {
        match &self.entry {
            HistoryEntry::SystemNote(message) => Some(message),
            _ => None,
        }
    }

    /// Render the item as the text block fed back to the model.
    ///
    /// - error: `"<stepN>\n{error}"`
    /// - system note: the message verbatim, no tag
    /// - summary: `"<stepN>\n"` followed by the non-empty parts joined by `\n`
    ///
    /// The label is `step_unknown` when no step number is set.
    pub fn render(&self) -> String {
        match &self.entry {
            HistoryEntry::Error(error) => format!("<{}>\n{error}", self.step_label()),
            HistoryEntry::SystemNote(message) => message.clone(),
            HistoryEntry::StepSummary(summary) => {
                let content: Vec<&str> = summary.parts().collect();
                format!("<{}>\n{}", self.step_label(), content.join("\n"))
            }
        }
    }

    fn step_label(&self) -> String {
        match self.step_number {
            Some(n) => format!("step{n}"),
            None => "step_unknown".to_string(),
        }
    }
}

impl TryFrom<StepFields> for HistoryItem {
    type Error = ValidationError;

    fn try_from(fields: StepFields) -> Result<Self, Self::Error> {
        Self::from_fields(fields)
    }
}

impl From<HistoryItem> for StepFields {
    fn from(item: HistoryItem) -> Self {
        let mut fields = StepFields {
            step_number: item.step_number,
            ..Default::default()
        };
        match item.entry {
            HistoryEntry::Error(error) => fields.error = Some(error),
            HistoryEntry::SystemNote(message) => fields.system_message = Some(message),
            HistoryEntry::StepSummary(summary) => {
                fields.evaluation_previous_goal = summary.evaluation_previous_goal;
                fields.memory = summary.memory;
                fields.next_goal = summary.next_goal;
                fields.action_results = summary.action_results;
            }
        }
        fields
    }
}

impl fmt::Display for HistoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
