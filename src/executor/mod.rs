mod executor;
mod default_executor;
pub mod builtins;
pub mod job_control;
pub mod process;
pub mod redirect;


pub use executor::{Executor, ExecError, ExecOutcome, ExecStatus};
pub use default_executor::DefaultExecutor;
pub use job_control::{AbnormalForeground, JobController};
pub use process::{ProcessControl, UnixProcesses};
