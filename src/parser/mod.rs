pub mod default;

use crate::ast::ParsedCommand;

/// Redirection clauses are only looked for among this many trailing words.
pub const REDIRECT_WINDOW: usize = 4;

pub trait Parser {
    fn parse(self) -> ParsedCommand;
}
