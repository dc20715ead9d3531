use crate::ast::{ParsedCommand, RedirectKind};
use crate::parser::{Parser, REDIRECT_WINDOW};

/// Single pass over an expanded word list: comment, background, redirections.
pub struct DefaultParser {
    tokens: Vec<String>,
}

impl DefaultParser {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    fn strip_comment(&mut self, cmd: &mut ParsedCommand) {
        if let Some(pos) = self.tokens.iter().position(|t| t == "#") {
            self.tokens.truncate(pos);
            cmd.is_comment = true;
        }
    }

    fn strip_background(&mut self, cmd: &mut ParsedCommand) {
        if self.tokens.len() > 1 && self.tokens.last().is_some_and(|t| t == "&") {
            self.tokens.pop();
            cmd.background = true;
        }
    }

    // Walks backward over the last few words. `file` is the word just after
    // the current position, if that word can serve as a filename. The word
    // list ends at the leftmost consumed operator.
    fn strip_redirects(&mut self, cmd: &mut ParsedCommand) {
        let len = self.tokens.len();
        let floor = len.saturating_sub(REDIRECT_WINDOW).max(1);
        let mut cut: Option<usize> = None;
        let mut file: Option<usize> = None;

        for i in (floor..len).rev() {
            if cmd.input_redirect.is_some() && cmd.output_redirect.is_some() {
                break;
            }
            let kind = RedirectKind::from_token(&self.tokens[i]);
            if let (Some(kind), Some(f)) = (kind, file) {
                let slot = match kind {
                    RedirectKind::In => &mut cmd.input_redirect,
                    RedirectKind::Out => &mut cmd.output_redirect,
                };
                if slot.is_none() {
                    tracing::debug!(?kind, file = %self.tokens[f], "found redirection");
                    *slot = Some(self.tokens[f].clone());
                    cut = Some(i);
                    file = None;
                    continue;
                }
            }
            file = if kind.is_none() { Some(i) } else { None };
        }

        if let Some(cut) = cut {
            self.tokens.truncate(cut);
        }
    }
}

impl Parser for DefaultParser {
    fn parse(mut self) -> ParsedCommand {
        let mut cmd = ParsedCommand::default();
        self.strip_comment(&mut cmd);
        self.strip_background(&mut cmd);
        self.strip_redirects(&mut cmd);

        let mut words = self.tokens.into_iter();
        cmd.name = words.next();
        cmd.args = words.collect();
        tracing::debug!(name = ?cmd.name, background = cmd.background, "parsed command");
        cmd
    }
}
