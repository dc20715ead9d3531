use std::io::{self, Write};

use crate::environment::Environment;

/// Prints the prompt taken from an environment variable (`PS1` by default).
pub struct ShellPrompt {
    var: String,
}

impl ShellPrompt {
    pub fn new(var: &str) -> Self {
        ShellPrompt { var: var.to_string() }
    }

    /// Empty when the variable is unset.
    pub fn text<'a>(&self, env: &'a Environment) -> &'a str {
        env.get(&self.var).unwrap_or("")
    }

    pub fn show_prompt(&self, env: &Environment) -> io::Result<()> {
        let mut err = io::stderr().lock();
        err.write_all(self.text(env).as_bytes())?;
        err.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_text() {
        let mut env = Environment::empty();
        let prompt = ShellPrompt::new("PS1");
        assert_eq!(prompt.text(&env), "");
        env.set("PS1", "smallsh$ ");
        assert_eq!(prompt.text(&env), "smallsh$ ");
    }
}
