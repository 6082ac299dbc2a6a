//! An interactive command interpreter with numbered, replayable history.
//!
//! Each input line is split on spaces into an argument vector, `!n` and `!!` references
//! are replaced by the recorded command they name, and the result runs either as a
//! built-in (`exit`, `pwd`, `cd`, `history`) or as an external program in a forked child,
//! in the foreground or, with a trailing `&`, in the background. The last ten executed
//! command lines are kept with ever-increasing sequence numbers.
//!
//! The main entry point is [`Interpreter`]. The public modules [`history`], [`lexer`] and
//! [`expand`] expose the pure building blocks; [`command`] has the traits for plugging in
//! your own commands.

mod builtin;
pub mod command;
pub mod config;
pub mod error;
pub mod expand;
mod external;
pub mod history;
pub mod interrupt;
mod interpreter;
mod io_adapters;
pub mod lexer;
pub mod session;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Cycle, Interpreter};

pub use config::ShellConfig;
pub use error::ShellError;
pub use external::reap_finished_children;
pub use io_adapters::{EditorInput, LineSource, MemWriter, ReadOutcome, ScriptedInput};
