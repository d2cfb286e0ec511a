//! Prompt + response transcripts for audit and debugging.
//!
//! A transcript is one plain-text file per model call:
//!
//! ```text
//!  system
//! You are a browser agent...
//!
//!  user
//! <step1>
//! ...
//!
//! {
//!   "memory": "...",
//!   "action": [...]
//! }
//! ```
//!
//! Each prompt message becomes a ` {role} ` marker line, its text, and a
//! blank line. The response follows as 2-space-indented JSON containing only
//! the fields the model populated, with non-ASCII characters written as-is.
//! There is no header, footer, or checksum.
//!
//! Writes are not atomic. A failed or cancelled write can leave no file, an
//! empty file, or a partial one, and concurrent writes to the same path are
//! unordered. Callers needing durability should write to a temporary path
//! and rename.

pub mod encoding;
pub mod response;

use serde::Serialize;
use std::borrow::Borrow;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::Message;
use crate::config::TranscriptConfig;

pub use encoding::Encoding;
pub use response::{AgentOutput, OutputField};

/// Format messages and a response into transcript text.
pub fn format_transcript<M, R>(messages: &[M], response: &R) -> serde_json::Result<String>
where
    M: Borrow<Message>,
    R: Serialize + ?Sized,
{
    let mut lines = Vec::with_capacity(messages.len() * 3 + 1);
    for message in messages {
        let message = message.borrow();
        lines.push(format!(" {} ", message.role));
        lines.push(message.text().to_string());
        lines.push(String::new());
    }
    lines.push(serde_json::to_string_pretty(response)?);
    Ok(lines.join("\n"))
}

/// Write a transcript to `target`, creating missing parent directories.
///
/// Filesystem errors are returned unmodified. No retry and no cleanup of a
/// partially written file.
pub async fn save_transcript<M, R>(
    messages: &[M],
    response: &R,
    target: impl AsRef<Path>,
    encoding: Encoding,
) -> io::Result<()>
where
    M: Borrow<Message>,
    R: Serialize + ?Sized,
{
    let target = target.as_ref();
    let text = format_transcript(messages, response)?;
    let bytes = encoding.encode(&text)?;

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.inspect_err(|e| {
            warn!(
                "Failed to create transcript dir {}: {e}",
                parent.display()
            );
        })?;
    }

    fs::write(target, &bytes).await.inspect_err(|e| {
        warn!("Failed to write transcript {}: {e}", target.display());
    })?;

    debug!(
        "Saved transcript to {} ({} messages, {} bytes, {encoding})",
        target.display(),
        messages.len(),
        bytes.len()
    );
    Ok(())
}

/// Transcript persistence bound to a [`TranscriptConfig`].
#[derive(Debug, Clone, Default)]
pub struct TranscriptWriter {
    config: TranscriptConfig,
}

impl TranscriptWriter {
    pub fn new(config: TranscriptConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranscriptConfig {
        &self.config
    }

    /// Write a transcript to an explicit path using the configured encoding.
    ///
    /// Runs regardless of `config.enabled`; the flag only gates
    /// [`persist_step`](Self::persist_step).
    pub async fn persist<M, R>(
        &self,
        messages: &[M],
        response: &R,
        target: impl AsRef<Path>,
    ) -> io::Result<()>
    where
        M: Borrow<Message>,
        R: Serialize + ?Sized,
    {
        save_transcript(messages, response, target, self.config.encoding).await
    }

    /// Like [`persist`](Self::persist) with an explicit encoding.
    pub async fn persist_with_encoding<M, R>(
        &self,
        messages: &[M],
        response: &R,
        target: impl AsRef<Path>,
        encoding: Encoding,
    ) -> io::Result<()>
    where
        M: Borrow<Message>,
        R: Serialize + ?Sized,
    {
        save_transcript(messages, response, target, encoding).await
    }

    /// `{dir}/conversation_{session_id}_{step}.txt`
    pub fn step_path(&self, session_id: &str, step: u32) -> PathBuf {
        self.config
            .dir
            .join(format!("conversation_{session_id}_{step}.txt"))
    }

    /// Write the transcript for one step under the configured directory.
    ///
    /// Returns the written path, or `None` when transcripts are disabled.
    pub async fn persist_step<M, R>(
        &self,
        session_id: &str,
        step: u32,
        messages: &[M],
        response: &R,
    ) -> io::Result<Option<PathBuf>>
    where
        M: Borrow<Message>,
        R: Serialize + ?Sized,
    {
        if !self.config.enabled {
            debug!("Transcripts disabled; skipping step {step}");
            return Ok(None);
        }
        let path = self.step_path(session_id, step);
        self.persist(messages, response, &path).await?;
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_single_message() {
        let messages = [Message::system("sys")];
        let text = format_transcript(&messages, &json!({"a": 1})).unwrap();
        assert_eq!(text, " system \nsys\n\n{\n  \"a\": 1\n}");
    }

    #[test]
    fn format_keeps_message_order_and_blank_lines() {
        let messages = vec![
            Message::system("rules"),
            Message::user("line one\nline two"),
            Message::assistant_text("ok"),
        ];
        let text = format_transcript(&messages, &json!({})).unwrap();
        assert_eq!(
            text,
            " system \nrules\n\n user \nline one\nline two\n\n assistant \nok\n\n{}"
        );
    }

    #[test]
    fn format_accepts_borrowed_messages() {
        let owned = [Message::user("hi")];
        let borrowed: Vec<&Message> = owned.iter().collect();
        let text = format_transcript(&borrowed, &json!(null)).unwrap();
        assert_eq!(text, " user \nhi\n\nnull");
    }

    #[test]
    fn format_writes_non_ascii_literally() {
        let response = AgentOutput::new().with_memory("已登录 café");
        let text = format_transcript::<Message, _>(&[], &response).unwrap();
        assert_eq!(text, "{\n  \"memory\": \"已登录 café\"\n}");
    }

    #[test]
    fn format_with_no_messages_is_just_the_response() {
        let response = AgentOutput::new().with_next_goal("search");
        let text = format_transcript::<Message, _>(&[], &response).unwrap();
        assert!(text.starts_with('{'));
        assert!(!text.contains(" system "));
    }

    #[tokio::test]
    async fn persist_creates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x").join("y.txt");
        let writer = TranscriptWriter::default();

        let response = AgentOutput::new().with_memory("m");
        writer
            .persist(&[Message::system("sys")], &response, &target)
            .await
            .unwrap();

        let content = std::fs::read_to_string(&target).unwrap();
        assert!(content.starts_with(" system \nsys\n\n"));
        assert!(content.ends_with("{\n  \"memory\": \"m\"\n}"));
    }

    #[tokio::test]
    async fn persist_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("t.txt");
        std::fs::write(&target, "stale content that is longer than the new one").unwrap();

        save_transcript::<Message, _>(&[], &json!(1), &target, Encoding::Utf8)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "1");
    }

    #[tokio::test]
    async fn persist_into_file_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a dir").unwrap();

        let target = blocker.join("sub").join("t.txt");
        let result = TranscriptWriter::default()
            .persist(&[Message::user("u")], &json!({}), &target)
            .await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotADirectory);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn persist_with_utf16_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("t16.txt");
        TranscriptWriter::default()
            .persist_with_encoding::<Message, _>(&[], &json!("é"), &target, Encoding::Utf16Le)
            .await
            .unwrap();
        let bytes = std::fs::read(&target).unwrap();
        assert_eq!(bytes, vec![0x22, 0x00, 0xE9, 0x00, 0x22, 0x00]);
    }

    #[tokio::test]
    async fn unencodable_text_fails_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new").join("t.txt");
        let messages = [Message::user("日本")];
        let err = save_transcript(&messages, &json!({}), &target, Encoding::Latin1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(!target.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn persist_step_uses_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TranscriptWriter::new(TranscriptConfig::default().with_dir(dir.path()));

        let path = writer
            .persist_step("abc", 4, &[Message::system("s")], &json!({}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("conversation_abc_4.txt"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn persist_step_disabled_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TranscriptWriter::new(TranscriptConfig::disabled().with_dir(dir.path()));

        let written = writer
            .persist_step("abc", 1, &[Message::system("s")], &json!({}))
            .await
            .unwrap();
        assert!(written.is_none());
        assert!(!writer.step_path("abc", 1).exists());
    }
}
