use anyhow::{Context, Result};
use argh::FromArgs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use smallsh_rs::config::{Config, ConfigLoader};
use smallsh_rs::context::ShellContext;
use smallsh_rs::environment::Environment;
use smallsh_rs::executor::DefaultExecutor;
use smallsh_rs::io::StdinReader;
use smallsh_rs::repl::Repl;
use smallsh_rs::signals;

/// A small interactive shell with background job tracking.
#[derive(FromArgs)]
struct Args {
    /// path to a key=value config file
    #[argh(option, short = 'c')]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_env("SMALLSH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Args = argh::from_env();
    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("smallsh: {:#}", e);
            std::process::exit(libc::EXIT_FAILURE);
        }
    }
}

fn run(args: Args) -> Result<i32> {
    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => Config::default(),
    };

    let mut env = Environment::new();
    env.extend(config.env_vars.clone());

    signals::install_shell_dispositions().context("failed to set signal dispositions")?;

    let ctx = ShellContext::from_env(&env);
    let executor = DefaultExecutor::unix(config.abnormal_foreground);
    let mut repl = Repl::new(&config, env, ctx, StdinReader::new(), executor);
    let code = repl.run()?;
    Ok(code)
}
