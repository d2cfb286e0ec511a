//! Convenience re-exports for common `cinch-state` types.
//!
//! ```ignore
//! use cinch_state::prelude::*;
//! ```
//!
//! Covers what an agent loop touches every step. Checkpoint helpers and
//! encodings are left out; import those from their modules directly.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{Error, ImageAttachment, Message, MessageRole, ValidationError};

// ── History ─────────────────────────────────────────────────────────
pub use crate::history::{HistoryEntry, HistoryItem, MessageHistory, StepFields, StepSummary};

// ── State ───────────────────────────────────────────────────────────
pub use crate::state::{ConversationState, ReadState};

// ── Transcripts ─────────────────────────────────────────────────────
pub use crate::config::TranscriptConfig;
pub use crate::transcript::{AgentOutput, OutputField, TranscriptWriter};
