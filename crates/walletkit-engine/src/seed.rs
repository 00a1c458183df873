use std::fmt;
use std::sync::Arc;

use crate::error::{EngineError, Result};

/// Opaque seed-derived context handed to module drivers for derivation.
///
/// Holds the normalized phrase behind a shared allocation so sessions and
/// accounts can clone it cheaply. The phrase is secret material and is
/// redacted in debug output; only the word count is ever logged.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedContext {
    phrase: Arc<str>,
}

impl SeedContext {
    /// Build a context from a raw phrase. Rejects empty input; anything
    /// stronger (word lists, checksums) is the derivation module's job.
    pub fn new(phrase: &str) -> Result<Self> {
        let trimmed = phrase.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidSeed("empty seed phrase".to_string()));
        }
        Ok(Self {
            phrase: Arc::from(trimmed),
        })
    }

    /// Number of whitespace-separated words in the phrase.
    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }

    /// The normalized phrase. For driver use only; never log this.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }
}

impl fmt::Debug for SeedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeedContext(<redacted:{} words>)", self.word_count())
    }
}
