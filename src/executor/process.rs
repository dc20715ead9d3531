use std::ffi::CString;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{execvp, fork, ForkResult, Pid};

use crate::ast::ParsedCommand;
use crate::executor::{redirect, ExecError};
use crate::signals;

/// Exit status of a child whose redirection or exec failed.
pub const CHILD_FAILURE_STATUS: i32 = 2;

/// OS process primitives used by the job controller.
pub trait ProcessControl {
    /// Start `cmd` in a new process and return its PID without waiting.
    fn spawn(&mut self, cmd: &ParsedCommand) -> Result<Pid, ExecError>;
    /// Block until `pid` exits, is killed or stops.
    fn wait(&mut self, pid: Pid) -> Result<WaitStatus, ExecError>;
    /// Next state change of any child, or `None` if nothing is pending.
    fn try_wait_any(&mut self) -> Result<Option<WaitStatus>, ExecError>;
    /// Send SIGCONT.
    fn resume(&mut self, pid: Pid) -> Result<(), ExecError>;
}

/// `fork`/`execvp`/`waitpid` on the host.
#[derive(Debug, Default)]
pub struct UnixProcesses;

impl ProcessControl for UnixProcesses {
    fn spawn(&mut self, cmd: &ParsedCommand) -> Result<Pid, ExecError> {
        let argv = cmd
            .argv()
            .into_iter()
            .map(|arg| CString::new(arg).map_err(|_| ExecError::InvalidArgument(arg.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        if argv.is_empty() {
            return Err(ExecError::InvalidArgument("empty command".to_string()));
        }

        match unsafe { fork() }.map_err(ExecError::Fork)? {
            ForkResult::Parent { child } => Ok(child),
            ForkResult::Child => exec_child(cmd, &argv),
        }
    }

    fn wait(&mut self, pid: Pid) -> Result<WaitStatus, ExecError> {
        loop {
            match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
                Err(Errno::EINTR) => continue,
                other => return other.map_err(ExecError::Wait),
            }
        }
    }

    fn try_wait_any(&mut self) -> Result<Option<WaitStatus>, ExecError> {
        let any_child = Pid::from_raw(-1);
        loop {
            match waitpid(any_child, Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED)) {
                Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => return Ok(None),
                Ok(status) => return Ok(Some(status)),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ExecError::Wait(e)),
            }
        }
    }

    fn resume(&mut self, pid: Pid) -> Result<(), ExecError> {
        kill(pid, Signal::SIGCONT).map_err(ExecError::Signal)
    }
}

// Skips atexit handlers and stdio flushing inherited from the shell.
fn child_exit() -> ! {
    unsafe { libc::_exit(CHILD_FAILURE_STATUS) }
}

// Runs between fork and exec; never returns to the caller.
fn exec_child(cmd: &ParsedCommand, argv: &[CString]) -> ! {
    if let Err(e) = signals::reset_for_child() {
        eprintln!("sigaction: {}", e);
        child_exit();
    }
    if let Err(e) = redirect::apply(cmd) {
        eprintln!("{}", e);
        child_exit();
    }
    let err = match execvp(&argv[0], argv) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    eprintln!("{}: {}", argv[0].to_string_lossy(), err);
    child_exit()
}
