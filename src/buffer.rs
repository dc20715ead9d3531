use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("out of memory while growing text buffer: {0}")]
    Alloc(#[from] TryReserveError),
}

/// How many occurrences a substitution may replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    AtMost(usize),
    All,
}

impl Limit {
    /// Negative counts mean "every occurrence".
    pub fn from_count(count: i64) -> Self {
        if count < 0 {
            Limit::All
        } else {
            Limit::AtMost(count as usize)
        }
    }
}

/// Owned text that supports in-place substitution with fallible growth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        TextBuffer { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Replace up to `limit` non-overlapping occurrences of `needle`, left to right.
    ///
    /// All growth is reserved before the first byte changes, so on
    /// `BufferError::Alloc` the buffer still holds its previous contents.
    /// Returns how many replacements were made.
    pub fn substitute(
        &mut self,
        needle: &str,
        replacement: &str,
        limit: Limit,
    ) -> Result<usize, BufferError> {
        if needle.is_empty() {
            return Ok(0);
        }
        let found = self.text.match_indices(needle).count();
        let count = match limit {
            Limit::All => found,
            Limit::AtMost(n) => found.min(n),
        };
        if count == 0 {
            return Ok(0);
        }

        if replacement.len() > needle.len() {
            let growth = (replacement.len() - needle.len()).saturating_mul(count);
            self.text.try_reserve_exact(growth)?;
        }

        // Offsets are logical; recomputed after each splice.
        let mut offset = 0;
        for _ in 0..count {
            let Some(pos) = self.text[offset..].find(needle) else {
                break;
            };
            let start = offset + pos;
            self.text.replace_range(start..start + needle.len(), replacement);
            offset = start + replacement.len();
        }

        if replacement.len() < needle.len() {
            self.text.shrink_to_fit();
        }
        Ok(count)
    }
}

impl From<String> for TextBuffer {
    fn from(text: String) -> Self {
        TextBuffer { text }
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        TextBuffer::new(text)
    }
}
