use std::io::{self, Write};

use crate::ast::ParsedCommand;
use crate::context::ShellContext;
use crate::executor::builtins::BuiltinManager;
use crate::executor::job_control::{AbnormalForeground, JobController};
use crate::executor::process::{ProcessControl, UnixProcesses};
use crate::executor::{ExecError, ExecStatus, Executor};

/// Built-ins first, everything else through the job controller.
pub struct DefaultExecutor<P, W> {
    builtins: BuiltinManager,
    jobs: JobController<P, W>,
}

impl DefaultExecutor<UnixProcesses, io::Stderr> {
    pub fn unix(policy: AbnormalForeground) -> Self {
        DefaultExecutor::new(JobController::new(UnixProcesses, io::stderr(), policy))
    }
}

impl<P: ProcessControl, W: Write> DefaultExecutor<P, W> {
    pub fn new(jobs: JobController<P, W>) -> Self {
        DefaultExecutor {
            builtins: BuiltinManager::new(),
            jobs,
        }
    }

    pub fn jobs(&self) -> &JobController<P, W> {
        &self.jobs
    }
}

impl<P: ProcessControl, W: Write> Executor for DefaultExecutor<P, W> {
    fn exec(&mut self, cmd: &ParsedCommand, ctx: &mut ShellContext) -> ExecStatus {
        if let Some(name) = cmd.name.as_deref() {
            if self.builtins.is_builtin(name) {
                return self.builtins.execute(name, &cmd.args, ctx);
            }
        }
        self.jobs.launch(cmd, ctx)
    }

    fn reap_background(&mut self, _ctx: &mut ShellContext) -> Result<usize, ExecError> {
        self.jobs.reap()
    }
}
