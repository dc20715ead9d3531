//! Background reaping collects any child of the process, so this binary holds a single test.

use std::thread::sleep;
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use smallsh_rs::ast::ParsedCommand;
use smallsh_rs::context::ShellContext;
use smallsh_rs::executor::{AbnormalForeground, JobController, UnixProcesses};

fn background(argv: &[&str]) -> ParsedCommand {
    ParsedCommand {
        name: Some(argv[0].to_string()),
        args: argv[1..].iter().map(|s| s.to_string()).collect(),
        background: true,
        ..Default::default()
    }
}

fn reap_until(jobs: &mut JobController<UnixProcesses, Vec<u8>>, want: usize) -> usize {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut seen = 0;
    while seen < want && Instant::now() < deadline {
        seen += jobs.reap().unwrap();
        sleep(Duration::from_millis(20));
    }
    seen
}

#[test]
fn reap_reports_finished_children_without_blocking() {
    let mut jobs = JobController::new(UnixProcesses, Vec::new(), AbnormalForeground::Background);
    let mut ctx = ShellContext::new(None, Pid::this());

    jobs.launch(&background(&["true"]), &mut ctx).unwrap();
    jobs.launch(&background(&["sh", "-c", "exit 4"]), &mut ctx).unwrap();
    jobs.launch(&background(&["sleep", "30"]), &mut ctx).unwrap();
    let sleeper = ctx.jobs.most_recent_background_pid.expect("sleep tracked");

    assert_eq!(reap_until(&mut jobs, 2), 2);
    // the sleeper is still running; another pass returns at once with nothing
    let started = Instant::now();
    assert_eq!(jobs.reap().unwrap(), 0);
    assert!(started.elapsed() < Duration::from_secs(1));

    let notices = String::from_utf8(jobs.diagnostics().clone()).unwrap();
    assert!(notices.contains("done. Exit Status 0."));
    assert!(notices.contains("done. Exit Status 4."));
    assert!(!notices.contains(&format!("Child process {} ", sleeper)));

    kill(sleeper, Signal::SIGTERM).unwrap();
    assert_eq!(reap_until(&mut jobs, 1), 1);
    let notices = String::from_utf8(jobs.diagnostics().clone()).unwrap();
    assert!(notices.ends_with(&format!("Child process {} done. Signalled 15.\n", sleeper)));
}
