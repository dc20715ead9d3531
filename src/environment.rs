use std::collections::HashMap;

/// Snapshot of the process environment, used for `$HOME`, `$PS1` and `$IFS`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            vars: std::env::vars().collect(),
        }
    }

    pub fn empty() -> Self {
        Environment::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|v| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    /// Apply `env.NAME=value` overrides from the config file.
    pub fn extend<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.vars.extend(overrides);
    }
}
