use std::collections::HashMap;

use crate::context::ShellContext;
use crate::executor::{ExecError, ExecOutcome, ExecStatus};

pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    fn run(&self, args: &[String], ctx: &mut ShellContext) -> ExecStatus;
}

/// Commands that run inside the shell process instead of being spawned.
pub struct BuiltinManager {
    commands: HashMap<String, Box<dyn BuiltinCommand>>,
}

impl Default for BuiltinManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinManager {
    pub fn new() -> Self {
        let mut mgr = BuiltinManager {
            commands: HashMap::new(),
        };
        mgr.register(Box::new(CdCommand {}));
        mgr.register(Box::new(ExitCommand {}));
        mgr
    }

    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn execute(&self, name: &str, args: &[String], ctx: &mut ShellContext) -> ExecStatus {
        match self.commands.get(name) {
            Some(cmd) => cmd.run(args, ctx),
            None => Err(ExecError::NoSuchBuiltin(name.to_string())),
        }
    }
}

pub struct CdCommand;

impl BuiltinCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn run(&self, args: &[String], ctx: &mut ShellContext) -> ExecStatus {
        if args.len() > 1 {
            return Err(ExecError::Usage("cd: too many arguments".to_string()));
        }
        let target = match args.first() {
            Some(path) => path.as_str(),
            None => ctx.home.as_deref().ok_or(ExecError::NoHome("cd"))?,
        };
        std::env::set_current_dir(target).map_err(|source| ExecError::ChangeDir {
            path: target.to_string(),
            source,
        })?;
        tracing::debug!(path = target, "changed directory");
        Ok(ExecOutcome::Code(0))
    }
}

pub struct ExitCommand;

impl BuiltinCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn run(&self, args: &[String], ctx: &mut ShellContext) -> ExecStatus {
        let code = match args {
            [] => ctx.status.foreground,
            [code] => leading_int(code),
            _ => return Err(ExecError::Usage("exit: too many arguments".to_string())),
        };
        eprintln!("\nexit");
        Ok(ExecOutcome::Exit(code))
    }
}

/// Leading decimal integer of `s`, or 0 when there is none. `"12abc"` is 12.
fn leading_int(s: &str) -> i32 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, d| acc.wrapping_mul(10).wrapping_add(i32::from(d - b'0')));
    if negative { value.wrapping_neg() } else { value }
}
