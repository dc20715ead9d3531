use std::collections::HashMap;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::executor::AbnormalForeground;
use crate::tokenizer::DEFAULT_WORD_LIMIT;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Environment variable holding the prompt text.
    pub prompt_var: String,
    /// Environment variable holding the word delimiters.
    pub ifs_var: String,
    pub word_limit: usize,
    pub abnormal_foreground: AbnormalForeground,
    pub env_vars: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            prompt_var: "PS1".to_string(),
            ifs_var: "IFS".to_string(),
            word_limit: DEFAULT_WORD_LIMIT,
            abnormal_foreground: AbnormalForeground::default(),
            env_vars: HashMap::new(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let src = std::fs::read_to_string(path)?;
        Self::load_from_str(&src)
    }

    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut config = Self::default_config();

        for (lineno, line) in src.lines().enumerate() {
            let lineno = lineno + 1;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse(format!("Line {}: No '=' found: {}", lineno, line)));
            };
            // values are taken verbatim so a prompt may end in a space
            let key = key.trim();

            match key {
                "prompt_var" => config.prompt_var = value.trim().to_string(),
                "ifs_var" => config.ifs_var = value.trim().to_string(),
                "word_limit" => match value.trim().parse::<usize>() {
                    Ok(n) if n > 0 => config.word_limit = n,
                    _ => {
                        return Err(ConfigError::Parse(format!(
                            "Line {}: Invalid word limit: {}",
                            lineno, value
                        )));
                    }
                },
                "abnormal_foreground" => {
                    config.abnormal_foreground = match value.trim() {
                        "background" => AbnormalForeground::Background,
                        "stopped_only" => AbnormalForeground::StoppedOnly,
                        other => {
                            return Err(ConfigError::Parse(format!(
                                "Line {}: Unknown abnormal_foreground policy: {}",
                                lineno, other
                            )));
                        }
                    };
                }
                k if k.starts_with("env.") => {
                    let var = k.trim_start_matches("env.").to_string();
                    config.env_vars.insert(var, value.to_string());
                }
                _ => {
                    return Err(ConfigError::Parse(format!("Line {}: Unknown key: {}", lineno, key)));
                }
            }
        }

        Ok(config)
    }
}
