use std::io;
use std::os::fd::RawFd;

use nix::errno::Errno;

use crate::signals::{self, InterruptGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One line, terminator included when present.
    Line(String),
    /// SIGINT arrived while waiting; the partial line is discarded.
    Interrupted,
    Eof,
}

pub trait LineSource {
    fn read_line(&mut self) -> io::Result<ReadOutcome>;
}

/// Reads fd 0 directly so that SIGINT can break a blocked read.
///
/// `std::io::Stdin` retries on `EINTR`, which would swallow the interrupt.
#[derive(Debug)]
pub struct StdinReader {
    fd: RawFd,
    pending: Vec<u8>,
}

impl Default for StdinReader {
    fn default() -> Self {
        Self::with_fd(libc::STDIN_FILENO)
    }
}

impl StdinReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads from `fd` instead of stdin. The caller keeps `fd` open.
    pub fn with_fd(fd: RawFd) -> Self {
        Self {
            fd,
            pending: Vec::new(),
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let rest = self.pending.split_off(end + 1);
        let line = std::mem::replace(&mut self.pending, rest);
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

impl LineSource for StdinReader {
    fn read_line(&mut self) -> io::Result<ReadOutcome> {
        if let Some(line) = self.take_line() {
            return Ok(ReadOutcome::Line(line));
        }

        let _armed = InterruptGuard::arm()?;
        let mut chunk = [0u8; 4096];
        loop {
            match nix::unistd::read(self.fd, &mut chunk) {
                Ok(0) if self.pending.is_empty() => return Ok(ReadOutcome::Eof),
                Ok(0) => {
                    let line = String::from_utf8_lossy(&self.pending).into_owned();
                    self.pending.clear();
                    return Ok(ReadOutcome::Line(line));
                }
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    if let Some(line) = self.take_line() {
                        return Ok(ReadOutcome::Line(line));
                    }
                }
                Err(Errno::EINTR) => {
                    if signals::take_interrupt() {
                        self.pending.clear();
                        return Ok(ReadOutcome::Interrupted);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
