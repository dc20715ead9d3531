use crate::environment::Environment;

pub const DEFAULT_DELIMITERS: &str = " \t\n";
pub const DEFAULT_WORD_LIMIT: usize = 513;

/// Splits a raw line into words on a set of delimiter characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenizer {
    delimiters: String,
    max_words: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new(DEFAULT_DELIMITERS, DEFAULT_WORD_LIMIT)
    }
}

impl Tokenizer {
    pub fn new(delimiters: &str, max_words: usize) -> Self {
        Tokenizer {
            delimiters: delimiters.to_string(),
            max_words,
        }
    }

    /// Delimiters come from `ifs_var` when it is set, whitespace otherwise.
    pub fn from_env(env: &Environment, ifs_var: &str, max_words: usize) -> Self {
        let delimiters = env.get(ifs_var).unwrap_or(DEFAULT_DELIMITERS);
        Tokenizer::new(delimiters, max_words)
    }

    pub fn delimiters(&self) -> &str {
        &self.delimiters
    }

    /// Words past `max_words` are dropped without error.
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut buf = String::new();

        for ch in line.chars() {
            if words.len() == self.max_words {
                return words;
            }
            if self.delimiters.contains(ch) {
                if !buf.is_empty() {
                    words.push(std::mem::take(&mut buf));
                }
            } else {
                buf.push(ch);
            }
        }

        if !buf.is_empty() && words.len() < self.max_words {
            words.push(buf);
        }
        words
    }
}
