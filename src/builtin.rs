use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::lexer::CommandLine;
use crate::session::Session;
use anyhow::{Context, Result};
use argh::FromArgs;
use std::env;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Set when the command records itself in the history.
    const RECORDS_ITSELF: bool = false;

    /// Canonical name of the command, e.g. "pwd" or "cd".
    fn name() -> &'static str;

    /// Build the command from its raw arguments, bypassing argh.
    fn from_tokens(args: Vec<String>) -> Self;

    /// Executes the command against the session.
    ///
    /// An error is logged and reported to the user as `<name> failed`.
    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode, ShellError> {
        match <T as BuiltinCommand>::execute(*self, stdout, session) {
            Ok(x) => Ok(x),
            Err(e) => {
                log::debug!("{} failed: {:#}", T::name(), e);
                writeln!(stderr, "{} failed", T::name())?;
                Ok(1)
            }
        }
    }

    fn records_itself(&self) -> bool {
        T::RECORDS_ITSELF
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    /// Selects the builtin by name alone. Arguments argh cannot parse (flags, `help`) are
    /// kept verbatim, so a builtin always runs once its name matches.
    fn try_create(
        &self,
        _session: &Session,
        command: &CommandLine,
    ) -> Option<Box<dyn ExecutableCommand>> {
        let name = command.program()?;
        if name == T::name() {
            let args = command.args();
            let cmd = T::from_args(&[name], &args).unwrap_or_else(|early| {
                log::debug!("{name}: taking arguments verbatim: {}", early.output.trim());
                T::from_tokens(args.iter().map(|arg| arg.to_string()).collect())
            });
            Some(Box::new(cmd))
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn from_tokens(args: Vec<String>) -> Self {
        Self { _args: args }
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        writeln!(stdout, "{}", session.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional, greedy)]
    /// directory to switch to, absolute or relative to the current directory. Further arguments are ignored.
    pub args: Vec<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_tokens(args: Vec<String>) -> Self {
        Self { args }
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        let target = self
            .args
            .first()
            .map(PathBuf::from)
            .context("cd: no target given")?;

        env::set_current_dir(&target)
            .with_context(|| format!("cd: can't chdir to {}", target.display()))?;
        session.current_dir = env::current_dir().context("cd: can't read new directory")?;
        log::debug!("working directory is now {}", session.current_dir.display());
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; the shell always exits with success status.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_tokens(args: Vec<String>) -> Self {
        Self { _args: args }
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        session.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Record this command, then list the retained history as "<number><TAB><command>" lines.
pub struct History {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for History {
    const RECORDS_ITSELF: bool = true;

    fn name() -> &'static str {
        "history"
    }

    fn from_tokens(args: Vec<String>) -> Self {
        Self { _args: args }
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode> {
        session.history.add(session.current_command.clone());
        session.history.display(stdout)?;
        Ok(0)
    }
}
