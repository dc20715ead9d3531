use std::io;
use thiserror::Error;

use crate::ast::ParsedCommand;
use crate::context::ShellContext;

pub type ExecStatus = Result<ExecOutcome, ExecError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    Code(i32),
    /// The shell must terminate with this code.
    Exit(i32),
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{0}")]
    Usage(String),
    #[error("cd: {path}: {source}")]
    ChangeDir {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{0}: HOME not set")]
    NoHome(&'static str),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("fork() failed: {0}")]
    Fork(#[source] nix::Error),
    #[error("waitpid() failed: {0}")]
    Wait(#[source] nix::Error),
    #[error("kill() failed: {0}")]
    Signal(#[source] nix::Error),
    #[error("No such builtin command: {0}")]
    NoSuchBuiltin(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub trait Executor {
    fn exec(&mut self, cmd: &ParsedCommand, ctx: &mut ShellContext) -> ExecStatus;

    /// Collect finished background work without blocking. Returns notices emitted.
    fn reap_background(&mut self, _ctx: &mut ShellContext) -> Result<usize, ExecError> {
        Ok(0)
    }
}
