use crate::error::ShellError;
use crate::lexer::CommandLine;
use crate::session::Session;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command.
    ///
    /// Only conditions that must end the shell are returned as errors; everything else
    /// is reported on `stderr` and reflected in the exit code.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode, ShellError>;

    /// Whether the command adds itself to the history while executing.
    ///
    /// The dispatcher skips its own recording step for such commands.
    fn records_itself(&self) -> bool {
        false
    }
}

/// Factory that tries to create a command from a tokenized command line.
///
/// Returns `None` when the factory doesn't recognize the program name.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided command line.
    fn try_create(
        &self,
        session: &Session,
        command: &CommandLine,
    ) -> Option<Box<dyn ExecutableCommand>>;
}
