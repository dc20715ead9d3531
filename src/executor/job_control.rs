use std::io::Write;

use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

use crate::ast::ParsedCommand;
use crate::context::{Disposition, JobState, ShellContext};
use crate::executor::process::ProcessControl;
use crate::executor::{ExecError, ExecOutcome, ExecStatus};

/// What to do with a foreground job that did not exit normally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AbnormalForeground {
    /// Stopped and signal-killed jobs alike are continued and tracked as background.
    #[default]
    Background,
    /// Only stopped jobs are handed to background supervision.
    StoppedOnly,
}

/// Status recorded for a job ended or stopped by `signo`.
fn signal_status(signo: i32) -> i32 {
    128 + signo
}

/// Spawns commands, waits on foreground jobs and reaps background ones.
///
/// Lifecycle notices are written to `diagnostics`, normally stderr.
pub struct JobController<P, W> {
    procs: P,
    diagnostics: W,
    policy: AbnormalForeground,
}

impl<P: ProcessControl, W: Write> JobController<P, W> {
    pub fn new(procs: P, diagnostics: W, policy: AbnormalForeground) -> Self {
        JobController {
            procs,
            diagnostics,
            policy,
        }
    }

    pub fn processes(&self) -> &P {
        &self.procs
    }

    pub fn diagnostics(&self) -> &W {
        &self.diagnostics
    }

    pub fn launch(&mut self, cmd: &ParsedCommand, ctx: &mut ShellContext) -> ExecStatus {
        if cmd.name.is_none() {
            tracing::debug!("no command name, nothing to spawn");
            return Ok(ExecOutcome::Code(0));
        }

        let pid = self.procs.spawn(cmd)?;
        if cmd.background {
            ctx.jobs.track(pid);
            tracing::debug!(%pid, state = %JobState::Running(Disposition::Background));
            return Ok(ExecOutcome::Code(0));
        }

        tracing::debug!(%pid, state = %JobState::Running(Disposition::Foreground));
        let status = self.procs.wait(pid)?;
        self.finish_foreground(status, ctx)
    }

    fn finish_foreground(&mut self, status: WaitStatus, ctx: &mut ShellContext) -> ExecStatus {
        match status {
            WaitStatus::Exited(pid, code) => {
                ctx.status.foreground = code;
                tracing::debug!(%pid, code, state = %JobState::Reaped);
            }
            WaitStatus::Stopped(pid, sig) => {
                ctx.status.foreground = signal_status(sig as i32);
                self.continue_in_background(pid, ctx)?;
            }
            WaitStatus::Signaled(pid, sig, _) => {
                ctx.status.foreground = signal_status(sig as i32);
                match self.policy {
                    AbnormalForeground::Background => self.continue_in_background(pid, ctx)?,
                    AbnormalForeground::StoppedOnly => {
                        tracing::debug!(%pid, ?sig, state = %JobState::Reaped);
                    }
                }
            }
            other => tracing::debug!(?other, "unexpected foreground wait status"),
        }
        Ok(ExecOutcome::Code(ctx.status.foreground))
    }

    fn continue_in_background(&mut self, pid: Pid, ctx: &mut ShellContext) -> Result<(), ExecError> {
        self.resume(pid)?;
        ctx.jobs.track(pid);
        writeln!(self.diagnostics, "Child process {} stopped. Continuing.", pid)?;
        self.diagnostics.flush()?;
        tracing::debug!(%pid, state = %JobState::StoppedBackground);
        Ok(())
    }

    // A child that has already been reaped cannot be continued; that is not an error here.
    fn resume(&mut self, pid: Pid) -> Result<(), ExecError> {
        match self.procs.resume(pid) {
            Err(ExecError::Signal(Errno::ESRCH)) => {
                tracing::debug!(%pid, "SIGCONT target already gone");
                Ok(())
            }
            other => other,
        }
    }

    /// Report every child that exited, was killed or stopped since the last call.
    /// Never blocks. Returns the number of notices written.
    pub fn reap(&mut self) -> Result<usize, ExecError> {
        let mut notices = 0;
        while let Some(status) = self.procs.try_wait_any()? {
            match status {
                WaitStatus::Exited(pid, code) => {
                    writeln!(self.diagnostics, "Child process {} done. Exit Status {}.", pid, code)?;
                    tracing::debug!(%pid, state = %JobState::Reaped);
                }
                WaitStatus::Signaled(pid, sig, _) => {
                    writeln!(self.diagnostics, "Child process {} done. Signalled {}.", pid, sig as i32)?;
                    tracing::debug!(%pid, state = %JobState::Reaped);
                }
                WaitStatus::Stopped(pid, _) => {
                    self.resume(pid)?;
                    writeln!(self.diagnostics, "Child process {} stopped. Continuing.", pid)?;
                    tracing::debug!(%pid, state = %JobState::Running(Disposition::Background));
                }
                other => {
                    tracing::debug!(?other, "ignoring wait status");
                    continue;
                }
            }
            notices += 1;
        }
        self.diagnostics.flush()?;
        Ok(notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::tests::{FakeProcesses, Outcome};
    use crate::parser::{default::DefaultParser, Parser};
    use crate::tokenizer::Tokenizer;
    use nix::sys::signal::Signal;

    fn parse(src: &str) -> ParsedCommand {
        DefaultParser::new(Tokenizer::default().tokenize(src)).parse()
    }

    fn ctx() -> ShellContext {
        ShellContext::new(None, Pid::from_raw(1))
    }

    fn controller(procs: FakeProcesses, policy: AbnormalForeground) -> JobController<FakeProcesses, Vec<u8>> {
        JobController::new(procs, Vec::new(), policy)
    }

    fn notices(jobs: &JobController<FakeProcesses, Vec<u8>>) -> String {
        String::from_utf8(jobs.diagnostics().clone()).unwrap()
    }

    #[test]
    fn test_foreground_exit_records_status() {
        let mut procs = FakeProcesses::new(100);
        procs.script(Outcome::Exit(3));
        let mut jobs = controller(procs, AbnormalForeground::Background);
        let mut ctx = ctx();

        let out = jobs.launch(&parse("false"), &mut ctx).unwrap();
        assert_eq!(out, ExecOutcome::Code(3));
        assert_eq!(ctx.status.foreground, 3);
        assert_eq!(ctx.jobs.most_recent_background_pid, None);
        assert_eq!(jobs.processes().spawned[0].name.as_deref(), Some("false"));
        assert_eq!(notices(&jobs), "");
    }

    #[test]
    fn test_background_is_tracked_not_waited() {
        let mut jobs = controller(FakeProcesses::new(200), AbnormalForeground::Background);
        let mut ctx = ctx();
        ctx.status.foreground = 5;

        let out = jobs.launch(&parse("sleep 10 &"), &mut ctx).unwrap();
        assert_eq!(out, ExecOutcome::Code(0));
        assert_eq!(ctx.jobs.most_recent_background_pid, Some(Pid::from_raw(200)));
        assert_eq!(ctx.status.foreground, 5);
        assert!(jobs.processes().waited.is_empty());

        jobs.launch(&parse("sleep 20 &"), &mut ctx).unwrap();
        assert_eq!(ctx.jobs.most_recent_background_pid, Some(Pid::from_raw(201)));
    }

    #[test]
    fn test_stopped_foreground_moves_to_background() {
        let mut procs = FakeProcesses::new(300);
        procs.script(Outcome::Stop(Signal::SIGTSTP));
        let mut jobs = controller(procs, AbnormalForeground::StoppedOnly);
        let mut ctx = ctx();

        jobs.launch(&parse("vi"), &mut ctx).unwrap();
        assert_eq!(ctx.status.foreground, 128 + Signal::SIGTSTP as i32);
        assert_eq!(ctx.jobs.most_recent_background_pid, Some(Pid::from_raw(300)));
        assert_eq!(jobs.processes().resumed, vec![Pid::from_raw(300)]);
        assert_eq!(notices(&jobs), "Child process 300 stopped. Continuing.\n");
    }

    #[test]
    fn test_killed_foreground_converted_by_default() {
        let mut procs = FakeProcesses::new(400);
        procs.script(Outcome::Signal(Signal::SIGTERM));
        let mut jobs = controller(procs, AbnormalForeground::Background);
        let mut ctx = ctx();

        jobs.launch(&parse("sleep 100"), &mut ctx).unwrap();
        assert_eq!(ctx.status.foreground, 128 + Signal::SIGTERM as i32);
        // the dead child answers SIGCONT with ESRCH, which is tolerated
        assert_eq!(ctx.jobs.most_recent_background_pid, Some(Pid::from_raw(400)));
        assert_eq!(notices(&jobs), "Child process 400 stopped. Continuing.\n");
    }

    #[test]
    fn test_killed_foreground_with_stopped_only_policy() {
        let mut procs = FakeProcesses::new(500);
        procs.script(Outcome::Signal(Signal::SIGKILL));
        let mut jobs = controller(procs, AbnormalForeground::StoppedOnly);
        let mut ctx = ctx();

        let out = jobs.launch(&parse("sleep 100"), &mut ctx).unwrap();
        assert_eq!(out, ExecOutcome::Code(128 + 9));
        assert_eq!(ctx.jobs.most_recent_background_pid, None);
        assert!(jobs.processes().resumed.is_empty());
        assert_eq!(notices(&jobs), "");
    }

    #[test]
    fn test_nameless_command_spawns_nothing() {
        let mut jobs = controller(FakeProcesses::new(1), AbnormalForeground::Background);
        let out = jobs.launch(&ParsedCommand::default(), &mut ctx()).unwrap();
        assert_eq!(out, ExecOutcome::Code(0));
        assert!(jobs.processes().spawned.is_empty());
    }

    fn jobs_spawn_background(procs: &mut FakeProcesses) {
        procs.spawn(&parse("sleep 100 &")).unwrap();
    }

    #[test]
    fn test_reap_reports_completed_children_only() {
        let mut procs = FakeProcesses::new(600);
        // two finished; a third child (the spawned sleep) never reports
        jobs_spawn_background(&mut procs);
        procs.finish(WaitStatus::Exited(Pid::from_raw(11), 0));
        procs.finish(WaitStatus::Signaled(Pid::from_raw(12), Signal::SIGTERM, false));
        let mut jobs = controller(procs, AbnormalForeground::Background);

        let count = jobs.reap().unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            notices(&jobs),
            "Child process 11 done. Exit Status 0.\nChild process 12 done. Signalled 15.\n"
        );
        assert_eq!(jobs.reap().unwrap(), 0);
    }

    #[test]
    fn test_reap_continues_stopped_children() {
        let mut procs = FakeProcesses::new(700);
        procs.finish(WaitStatus::Stopped(Pid::from_raw(21), Signal::SIGSTOP));
        let mut jobs = controller(procs, AbnormalForeground::Background);

        assert_eq!(jobs.reap().unwrap(), 1);
        assert_eq!(jobs.processes().resumed, vec![Pid::from_raw(21)]);
        assert_eq!(notices(&jobs), "Child process 21 stopped. Continuing.\n");
    }

    #[test]
    fn test_reap_with_no_children() {
        let mut jobs = controller(FakeProcesses::new(1), AbnormalForeground::Background);
        assert_eq!(jobs.reap().unwrap(), 0);
    }
}
