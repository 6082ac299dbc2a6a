//! Splitting a raw input line into an argument vector.
//!
//! Tokens are separated by the space character only. There is no quoting, escaping or
//! expansion; a trailing lone `&` marks the command for background execution.

use std::ffi::{CString, NulError};
use thiserror::Error;

/// Default upper bound on the length of an accepted input line, in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;
/// Default upper bound on the number of tokens in one command.
pub const DEFAULT_MAX_TOKENS: usize = 128;

const BACKGROUND_MARKER: &str = "&";

/// A tokenized command: the argument vector plus the background flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    pub tokens: Vec<String>,
    pub in_background: bool,
}

impl CommandLine {
    /// Name of the program to run, i.e. the first token.
    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Every token after the program name.
    pub fn args(&self) -> Vec<&str> {
        self.tokens.iter().skip(1).map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Argument vector in the form `execvp` expects.
    pub fn argv(&self) -> Result<Vec<CString>, NulError> {
        self.tokens
            .iter()
            .map(|token| CString::new(token.as_bytes()))
            .collect()
    }
}

/// Bounds applied while tokenizing user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_line_length: usize,
    pub max_tokens: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Input that cannot be turned into a command within the configured [`Limits`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexingError {
    #[error("command too long (limit is {limit} bytes)")]
    LineTooLong { limit: usize },
    #[error("too many arguments (limit is {limit})")]
    TooManyTokens { limit: usize },
}

/// Split `line` on spaces and strip a trailing `&` into [`CommandLine::in_background`].
///
/// Runs of spaces never produce empty tokens, so a blank line yields no tokens at all.
pub fn tokenize(line: &str) -> CommandLine {
    let mut tokens: Vec<String> = line
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect();

    let in_background = tokens.last().is_some_and(|last| last == BACKGROUND_MARKER);
    if in_background {
        tokens.pop();
    }

    CommandLine {
        tokens,
        in_background,
    }
}

/// Like [`tokenize`], but rejects input exceeding `limits`.
pub fn tokenize_bounded(line: &str, limits: &Limits) -> Result<CommandLine, LexingError> {
    if line.len() > limits.max_line_length {
        return Err(LexingError::LineTooLong {
            limit: limits.max_line_length,
        });
    }
    let command = tokenize(line);
    if command.tokens.len() > limits.max_tokens {
        return Err(LexingError::TooManyTokens {
            limit: limits.max_tokens,
        });
    }
    log::trace!("tokenized {:?} into {:?}", line, command);
    Ok(command)
}
