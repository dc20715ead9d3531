#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    In,  // <
    Out, // >
}

impl RedirectKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(RedirectKind::In),
            ">" => Some(RedirectKind::Out),
            _ => None,
        }
    }
}

/// A single input line after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: Option<String>,
    pub args: Vec<String>,
    pub input_redirect: Option<String>,
    pub output_redirect: Option<String>,
    pub background: bool,
    pub is_comment: bool,
}

impl ParsedCommand {
    /// Command name followed by its arguments, as passed to `execvp`.
    pub fn argv(&self) -> Vec<&str> {
        self.name
            .iter()
            .chain(self.args.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn redirect(&self, kind: RedirectKind) -> Option<&str> {
        match kind {
            RedirectKind::In => self.input_redirect.as_deref(),
            RedirectKind::Out => self.output_redirect.as_deref(),
        }
    }
}
