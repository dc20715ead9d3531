use crate::config::Config;
use crate::context::ShellContext;
use crate::environment::Environment;
use crate::error::ShellError;
use crate::executor::{ExecOutcome, Executor};
use crate::expander::Expander;
use crate::io::{LineSource, ReadOutcome};
use crate::parser::{default::DefaultParser, Parser};
use crate::prompt::ShellPrompt;
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit(i32),
}

/// Read, expand, parse and run lines until `exit` or end of input.
pub struct Repl<L, E> {
    env: Environment,
    ctx: ShellContext,
    tokenizer: Tokenizer,
    prompt: ShellPrompt,
    input: L,
    executor: E,
}

impl<L: LineSource, E: Executor> Repl<L, E> {
    pub fn new(config: &Config, env: Environment, ctx: ShellContext, input: L, executor: E) -> Self {
        Repl {
            tokenizer: Tokenizer::from_env(&env, &config.ifs_var, config.word_limit),
            prompt: ShellPrompt::new(&config.prompt_var),
            env,
            ctx,
            input,
            executor,
        }
    }

    pub fn context(&self) -> &ShellContext {
        &self.ctx
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Returns the code the shell should exit with.
    pub fn run(&mut self) -> Result<i32, ShellError> {
        loop {
            if let Step::Exit(code) = self.step()? {
                return Ok(code);
            }
        }
    }

    /// One iteration: reap, prompt, read, then evaluate.
    pub fn step(&mut self) -> Result<Step, ShellError> {
        if let Err(e) = self.executor.reap_background(&mut self.ctx) {
            eprintln!("{}", e);
        }
        if let Err(e) = self.prompt.show_prompt(&self.env) {
            tracing::warn!("failed to write prompt: {}", e);
        }

        let line = match self.input.read_line()? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted => {
                eprintln!();
                return Ok(Step::Continue);
            }
            ReadOutcome::Eof => return Ok(Step::Exit(self.ctx.status.foreground)),
        };
        self.eval(&line)
    }

    /// Only allocation failure during expansion is fatal here.
    pub fn eval(&mut self, line: &str) -> Result<Step, ShellError> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let words = self.tokenizer.tokenize(line);
        if words.is_empty() {
            return Ok(Step::Continue);
        }
        for (index, word) in words.iter().enumerate() {
            tracing::debug!(index, word = %word, "split word");
        }

        let words = Expander::new(&self.ctx).expand_all(words)?;
        let cmd = DefaultParser::new(words).parse();
        if cmd.is_comment {
            tracing::debug!("comment line, not executed");
            return Ok(Step::Continue);
        }

        match self.executor.exec(&cmd, &mut self.ctx) {
            Ok(ExecOutcome::Exit(code)) => Ok(Step::Exit(code)),
            Ok(ExecOutcome::Code(_)) => Ok(Step::Continue),
            Err(e) => {
                eprintln!("{}", e);
                Ok(Step::Continue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::tests::{FakeProcesses, MockExecutor, Outcome};
    use crate::executor::{AbnormalForeground, DefaultExecutor, JobController};
    use crate::io::input::fake::ScriptedLines;
    use nix::unistd::Pid;

    type FakeExecutor = DefaultExecutor<FakeProcesses, Vec<u8>>;

    fn ctx() -> ShellContext {
        ShellContext::new(Some("/home/u".to_string()), Pid::from_raw(4242))
    }

    fn mock_repl(lines: ScriptedLines) -> Repl<ScriptedLines, MockExecutor> {
        Repl::new(&Config::default(), Environment::empty(), ctx(), lines, MockExecutor::new())
    }

    fn fake_repl(lines: &[&str], procs: FakeProcesses) -> Repl<ScriptedLines, FakeExecutor> {
        let jobs = JobController::new(procs, Vec::new(), AbnormalForeground::Background);
        Repl::new(
            &Config::default(),
            Environment::empty(),
            ctx(),
            ScriptedLines::new(lines),
            DefaultExecutor::new(jobs),
        )
    }

    #[test]
    fn test_pipeline_order_and_eof() {
        let mut repl = mock_repl(ScriptedLines::new(&["echo $$ ~/f > out &", "ls # note", "", "   "]));
        let code = repl.run().unwrap();
        assert_eq!(code, 0);

        let exec = repl.executor();
        assert_eq!(exec.commands.len(), 1);
        let cmd = &exec.commands[0];
        assert_eq!(cmd.argv(), vec!["echo", "4242", "/home/u/f"]);
        assert_eq!(cmd.output_redirect.as_deref(), Some("out"));
        assert!(cmd.background);
        // one reap per iteration, including the one that hit end of input
        assert_eq!(exec.reaps, 5);
    }

    #[test]
    fn test_interrupt_restarts_iteration() {
        let lines = ScriptedLines::with_outcomes(vec![
            ReadOutcome::Interrupted,
            ReadOutcome::Line("true\n".to_string()),
        ]);
        let mut repl = mock_repl(lines);
        assert_eq!(repl.step().unwrap(), Step::Continue);
        assert!(repl.executor().commands.is_empty());
        assert_eq!(repl.step().unwrap(), Step::Continue);
        assert_eq!(repl.executor().commands.len(), 1);
        assert_eq!(repl.step().unwrap(), Step::Exit(0));
    }

    #[test]
    fn test_status_and_background_pid_expansion() {
        let mut procs = FakeProcesses::new(900);
        procs.script(Outcome::Exit(1));
        let mut repl = fake_repl(&["false", "echo $?", "sleep 5 &", "echo $!", "exit 7"], procs);

        assert_eq!(repl.run().unwrap(), 7);
        let spawned = &repl.executor().jobs().processes().spawned;
        assert_eq!(spawned.len(), 4);
        assert_eq!(spawned[1].argv(), vec!["echo", "1"]);
        assert_eq!(spawned[3].argv(), vec!["echo", "902"]);
        assert_eq!(repl.context().jobs.most_recent_background_pid, Some(Pid::from_raw(902)));
    }

    #[test]
    fn test_exit_without_argument_uses_foreground_status() {
        let mut procs = FakeProcesses::new(10);
        procs.script(Outcome::Exit(4));
        let mut repl = fake_repl(&["false", "exit"], procs);
        assert_eq!(repl.run().unwrap(), 4);
    }

    #[test]
    fn test_exit_usage_error_keeps_running() {
        let mut repl = fake_repl(&["exit 1 2", "exit 3"], FakeProcesses::new(10));
        assert_eq!(repl.run().unwrap(), 3);
        assert!(repl.executor().jobs().processes().spawned.is_empty());
    }

    #[test]
    fn test_eof_uses_foreground_status() {
        let mut procs = FakeProcesses::new(10);
        procs.script(Outcome::Exit(9));
        let mut repl = fake_repl(&["false"], procs);
        assert_eq!(repl.run().unwrap(), 9);
    }

    #[test]
    fn test_background_notices_before_next_prompt() {
        let mut procs = FakeProcesses::new(50);
        procs.finish(nix::sys::wait::WaitStatus::Exited(Pid::from_raw(50), 0));
        let mut repl = fake_repl(&["sleep 1 &"], procs);
        // first iteration reaps the queued child before reading
        repl.step().unwrap();
        let notices = String::from_utf8(repl.executor().jobs().diagnostics().clone()).unwrap();
        assert_eq!(notices, "Child process 50 done. Exit Status 0.\n");
    }

    struct BrokenInput;

    impl LineSource for BrokenInput {
        fn read_line(&mut self) -> std::io::Result<ReadOutcome> {
            Err(std::io::Error::other("stdin closed badly"))
        }
    }

    #[test]
    fn test_read_error_ends_loop() {
        let mut repl = Repl::new(&Config::default(), Environment::empty(), ctx(), BrokenInput, MockExecutor::new());
        assert!(matches!(repl.run(), Err(ShellError::Io(_))));
        assert!(repl.executor().commands.is_empty());
    }
}
