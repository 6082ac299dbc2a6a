use rustyline::error::ReadlineError;
use std::io;
use thiserror::Error;

/// Conditions that end the shell.
///
/// The `Display` text of each variant is the diagnostic printed before terminating.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Unable to read command. Terminating.")]
    Read(#[source] ReadlineError),
    #[error("fork failed")]
    Fork(#[source] nix::Error),
    #[error("unable to write output: {0}")]
    Output(#[from] io::Error),
}
