use std::os::unix::io::RawFd;

use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};
use thiserror::Error;

use crate::ast::{ParsedCommand, RedirectKind};

#[derive(Debug, Error)]
#[error("{path}: {source}")]
pub struct RedirectError {
    pub path: String,
    #[source]
    pub source: nix::Error,
}

fn target(kind: RedirectKind) -> (RawFd, OFlag, Mode) {
    match kind {
        RedirectKind::In => (
            libc::STDIN_FILENO,
            OFlag::O_RDONLY | OFlag::O_CREAT,
            Mode::from_bits_truncate(0o666),
        ),
        RedirectKind::Out => (
            libc::STDOUT_FILENO,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            Mode::from_bits_truncate(0o777),
        ),
    }
}

/// Rebind one standard descriptor to `path`.
pub fn redirect_fd(kind: RedirectKind, path: &str) -> Result<(), RedirectError> {
    let (fd, flags, mode) = target(kind);
    let err = |source| RedirectError { path: path.to_string(), source };
    let file = open(path, flags, mode).map_err(err)?;
    if file != fd {
        dup2(file, fd).map_err(err)?;
        close(file).map_err(err)?;
    }
    Ok(())
}

/// Applied in the child between fork and exec.
pub fn apply(cmd: &ParsedCommand) -> Result<(), RedirectError> {
    for kind in [RedirectKind::In, RedirectKind::Out] {
        if let Some(path) = cmd.redirect(kind) {
            redirect_fd(kind, path)?;
        }
    }
    Ok(())
}
