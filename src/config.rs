use crate::history::DEFAULT_HISTORY_DEPTH;
use crate::lexer::{DEFAULT_MAX_LINE_LENGTH, DEFAULT_MAX_TOKENS, Limits};
use argh::FromArgs;

#[derive(FromArgs, Debug, Clone, PartialEq, Eq)]
/// Interactive command interpreter with numbered history. `!n` re-runs command n, `!!` the latest.
pub struct ShellConfig {
    #[argh(option, default = "DEFAULT_HISTORY_DEPTH", from_str_fn(parse_positive))]
    /// number of commands kept in the history (at least 1)
    pub history_depth: usize,

    #[argh(option, default = "DEFAULT_MAX_LINE_LENGTH", from_str_fn(parse_positive))]
    /// longest accepted command line, in bytes
    pub max_line_length: usize,

    #[argh(option, default = "DEFAULT_MAX_TOKENS", from_str_fn(parse_positive))]
    /// most arguments accepted in one command
    pub max_tokens: usize,
}

impl ShellConfig {
    pub fn limits(&self) -> Limits {
        Limits {
            max_line_length: self.max_line_length,
            max_tokens: self.max_tokens,
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_owned()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("expected a number: {e}")),
    }
}
