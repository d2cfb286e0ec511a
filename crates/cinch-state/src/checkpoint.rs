//! Save and restore a [`ConversationState`] across process restarts.
//!
//! A checkpoint is a pretty-printed JSON file holding the full state plus a
//! timestamp. Writes go to a temp file that is renamed into place, so a
//! reader never sees a half-written checkpoint. Loading re-validates every
//! invariant of the state (non-empty log, valid items, tool counter ≥ 1).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::Error;
use crate::state::ConversationState;

/// Serializable checkpoint of conversation state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StateCheckpoint {
    /// RFC 3339 timestamp of the save.
    pub saved_at: String,
    pub state: ConversationState,
}

impl StateCheckpoint {
    pub fn new(state: ConversationState) -> Self {
        Self {
            saved_at: chrono::Utc::now().to_rfc3339(),
            state,
        }
    }
}

/// Atomic write: serialize to a temp file, then rename into place.
///
/// Missing parent directories are created.
pub fn save_checkpoint(path: &Path, state: &ConversationState) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let checkpoint = StateCheckpoint::new(state.clone());
    let json = serde_json::to_string_pretty(&checkpoint)?;

    let tmp_path = temp_path(path);
    std::fs::write(&tmp_path, json)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        warn!("Failed to move checkpoint into {}: {e}", path.display());
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    debug!(
        "Saved checkpoint to {} ({} history items)",
        path.display(),
        state.items().len()
    );
    Ok(())
}

/// Load a checkpoint. Returns `None` if the file doesn't exist.
pub fn load_checkpoint(path: &Path) -> Result<Option<StateCheckpoint>, Error> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)?;
    let checkpoint: StateCheckpoint = serde_json::from_str(&json)?;
    debug!(
        "Loaded checkpoint from {} (saved {})",
        path.display(),
        checkpoint.saved_at
    );
    Ok(Some(checkpoint))
}

/// `.{file_name}.tmp` next to the target.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "checkpoint".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
