//! Configuration for transcript persistence.
//!
//! Transcripts are enabled by default and land in `.agents/transcripts`,
//! next to the session directories cinch agents already keep under
//! `.agents/`.
//!
//! ```
//! use cinch_state::config::TranscriptConfig;
//! use cinch_state::transcript::Encoding;
//!
//! let config = TranscriptConfig::default()
//!     .with_dir("/tmp/run-42/transcripts")
//!     .with_encoding(Encoding::Utf16Le);
//! assert!(config.enabled);
//! ```

use std::path::PathBuf;

use crate::transcript::Encoding;

/// Default directory for per-step transcripts.
pub const DEFAULT_TRANSCRIPTS_DIR: &str = ".agents/transcripts";

/// Settings for [`TranscriptWriter`](crate::transcript::TranscriptWriter).
#[derive(Debug, Clone)]
pub struct TranscriptConfig {
    /// Whether per-step transcripts are written. Explicit-path writes
    /// ignore this flag. Default: `true`.
    pub enabled: bool,
    /// Directory for per-step transcripts. Default: `.agents/transcripts`.
    pub dir: PathBuf,
    /// File encoding. Default: UTF-8.
    pub encoding: Encoding,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(DEFAULT_TRANSCRIPTS_DIR),
            encoding: Encoding::Utf8,
        }
    }
}

impl TranscriptConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the transcript directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Set the file encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the encoding from a label such as `"utf-8"` or `"latin-1"`.
    /// Returns `None` for unknown labels.
    pub fn with_encoding_label(self, label: &str) -> Option<Self> {
        Encoding::from_label(label).map(|encoding| self.with_encoding(encoding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TranscriptConfig::default();
        assert!(config.enabled);
        assert_eq!(config.dir, PathBuf::from(".agents/transcripts"));
        assert_eq!(config.encoding, Encoding::Utf8);
    }

    #[test]
    fn disabled_keeps_other_defaults() {
        let config = TranscriptConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.encoding, Encoding::Utf8);
    }

    #[test]
    fn encoding_label_builder() {
        let config = TranscriptConfig::default()
            .with_encoding_label("latin-1")
            .unwrap();
        assert_eq!(config.encoding, Encoding::Latin1);
        assert!(TranscriptConfig::default().with_encoding_label("klingon").is_none());
    }
}
