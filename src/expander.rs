use crate::buffer::{BufferError, Limit, TextBuffer};
use crate::context::ShellContext;

/// One textual substitution applied to a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionRule {
    pub pattern: &'static str,
    pub replacement: String,
    pub limit: Limit,
    /// Only applies to words starting with `~/`.
    pub anchored: bool,
}

impl ExpansionRule {
    fn applies_to(&self, word: &str) -> bool {
        !self.anchored || word.starts_with("~/")
    }
}

/// Expands `~/`, `$$`, `$?` and `$!` in that order.
pub struct Expander {
    rules: Vec<ExpansionRule>,
}

impl Expander {
    pub fn new(ctx: &ShellContext) -> Self {
        let mut rules = Vec::with_capacity(4);
        if let Some(home) = &ctx.home {
            rules.push(ExpansionRule {
                pattern: "~",
                replacement: home.clone(),
                limit: Limit::AtMost(1),
                anchored: true,
            });
        }
        rules.push(ExpansionRule {
            pattern: "$$",
            replacement: ctx.shell_pid.to_string(),
            limit: Limit::All,
            anchored: false,
        });
        rules.push(ExpansionRule {
            pattern: "$?",
            replacement: ctx.status.foreground.to_string(),
            limit: Limit::All,
            anchored: false,
        });
        rules.push(ExpansionRule {
            pattern: "$!",
            replacement: ctx
                .jobs
                .most_recent_background_pid
                .map(|pid| pid.to_string())
                .unwrap_or_default(),
            limit: Limit::All,
            anchored: false,
        });
        Expander { rules }
    }

    pub fn rules(&self) -> &[ExpansionRule] {
        &self.rules
    }

    pub fn expand(&self, word: String) -> Result<String, BufferError> {
        let mut buf = TextBuffer::from(word);
        for rule in &self.rules {
            if rule.applies_to(buf.as_str()) {
                buf.substitute(rule.pattern, &rule.replacement, rule.limit)?;
            }
        }
        Ok(buf.into_string())
    }

    pub fn expand_all(&self, words: Vec<String>) -> Result<Vec<String>, BufferError> {
        words.into_iter().map(|w| self.expand(w)).collect()
    }
}
