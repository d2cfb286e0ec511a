//! Step history and request message assembly.
//!
//! - **[`item`]** — [`HistoryItem`], the immutable per-step outcome record,
//!   and its `<stepN>` text rendering.
//! - **[`assembler`]** — [`MessageHistory`], which orders the system, state,
//!   and context messages sent to the model.

pub mod assembler;
pub mod item;

// Re-export commonly used items at the module level.
pub use assembler::MessageHistory;
pub use item::{HistoryEntry, HistoryItem, INITIALIZED_MESSAGE, StepFields, StepSummary};
