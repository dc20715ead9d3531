use std::fmt;

use nix::unistd::Pid;

use crate::environment::Environment;

/// Exit codes tracked by the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitStatus {
    /// Reserved for the shell's own pending exit code.
    pub main: i32,
    /// Status of the last completed foreground job; `$?` and the default `exit` code.
    pub foreground: i32,
}

/// Only the most recent background job is remembered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobRegistry {
    pub most_recent_background_pid: Option<Pid>,
}

impl JobRegistry {
    pub fn track(&mut self, pid: Pid) {
        self.most_recent_background_pid = Some(pid);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Foreground,
    Background,
}

/// Lifecycle of a spawned process as seen by the job controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running(Disposition),
    StoppedBackground,
    Reaped,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Running(Disposition::Foreground) => write!(f, "running (foreground)"),
            JobState::Running(Disposition::Background) => write!(f, "running (background)"),
            JobState::StoppedBackground => write!(f, "stopped, continued in background"),
            JobState::Reaped => write!(f, "reaped"),
        }
    }
}

/// Shell-wide state handed to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellContext {
    pub home: Option<String>,
    pub shell_pid: Pid,
    pub status: ExitStatus,
    pub jobs: JobRegistry,
}

impl ShellContext {
    pub fn new(home: Option<String>, shell_pid: Pid) -> Self {
        ShellContext {
            home,
            shell_pid,
            status: ExitStatus::default(),
            jobs: JobRegistry::default(),
        }
    }

    pub fn from_env(env: &Environment) -> Self {
        ShellContext::new(env.get("HOME").map(str::to_string), Pid::this())
    }
}
