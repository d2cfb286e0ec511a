//! Error types.
//!
//! Two kinds of failure exist: a [`ValidationError`] when a step record or a
//! loaded state breaks an invariant, and I/O failures while persisting.
//! Transcript writes return [`std::io::Result`] directly so the filesystem
//! error reaches the caller unmodified; checkpoint operations wrap it in
//! [`Error`].

/// A step record or conversation state violates an invariant.
///
/// Never recovered automatically: the caller must fix the input and retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A history item may carry an error or a system message, not both.
    #[error("Cannot have both error and system_message at the same time")]
    ErrorWithSystemMessage,
    /// The step log must always hold at least the initialization item.
    #[error("History log is empty; expected at least the initialization item")]
    EmptyHistory,
    /// Tool-call ids start at 1.
    #[error("Tool-call counter must be at least 1")]
    ZeroToolId,
}

/// Crate-level error for operations that can fail in more than one way.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize state: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_both_fields() {
        let msg = ValidationError::ErrorWithSystemMessage.to_string();
        assert!(msg.contains("error"));
        assert!(msg.contains("system_message"));
    }

    #[test]
    fn io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "denied");
    }
}
