use crate::history::HistoryStore;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable state shared by every stage of a read cycle.
///
/// The session contains:
/// - `history`: the numbered record of executed commands.
/// - `current_command`: the raw text of the command being processed, after history
///   expansion. This is what gets recorded, never the tokenized form.
/// - `current_dir`: the working directory shown in the prompt and printed by `pwd`.
/// - `should_exit`: set by `exit` (or end of input) to stop the read loop.
#[derive(Debug, Clone)]
pub struct Session {
    pub history: HistoryStore,
    pub current_command: String,
    pub current_dir: PathBuf,
    pub should_exit: bool,
}

impl Session {
    /// Start a session with an empty history of the given depth in the process's
    /// current directory.
    pub fn new(history_depth: usize) -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            history: HistoryStore::new(history_depth),
            current_command: String::new(),
            current_dir,
            should_exit: false,
        }
    }

    /// Re-read the working directory from the process.
    ///
    /// Keeps the previous value if the directory can no longer be resolved (e.g. it was removed).
    pub fn refresh_current_dir(&mut self) {
        match stdenv::current_dir() {
            Ok(dir) => self.current_dir = dir,
            Err(e) => log::warn!("cannot determine working directory: {e}"),
        }
    }

    /// Prompt text: the absolute working directory followed by `> `.
    pub fn prompt(&self) -> String {
        format!("{}> ", self.current_dir.display())
    }
}
