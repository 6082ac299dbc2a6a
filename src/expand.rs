//! `!n` / `!!` history references.

use crate::history::{HistoryStore, SequenceNumber};
use crate::lexer::{self, CommandLine};
use crate::session::Session;
use regex::Regex;
use std::io::{self, Write};
use std::sync::LazyLock;
use thiserror::Error;

/// Leading `!`, then either a second `!` or an optionally signed run of digits, which may
/// follow non-space whitespace. Anything after the match is ignored, so `!3x` refers to command 3.
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!(?:(?P<last>!)|[\t\n\x0B\x0C\r]*(?P<number>[+-]?[0-9]+))?").expect("valid reference pattern")
});

#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error("invalid command number")]
    InvalidCommandNumber,
    #[error("unable to echo expanded command")]
    Echo(#[from] io::Error),
}

/// Sequence number referred to by `token`, or `None` if the token is not a history reference.
///
/// `!!` resolves to the newest entry (0 when the history is empty). A missing or
/// unparseable number resolves to 0; validity is checked by the caller.
fn referenced_number(token: &str, history: &HistoryStore) -> Option<i64> {
    let captures = REFERENCE.captures(token)?;
    if captures.name("last").is_some() {
        return Some(history.last_sequence_number().try_into().unwrap_or(i64::MAX));
    }
    match captures.name("number") {
        // Overflow falls back to 0 and is rejected like any other invalid number.
        Some(number) => Some(number.as_str().parse().unwrap_or(0)),
        None => Some(0),
    }
}

/// Look up the text a history reference resolves to.
///
/// Returns `Ok(None)` when `token` is not a reference at all.
pub fn resolve<'h>(
    token: &str,
    history: &'h HistoryStore,
) -> Result<Option<&'h str>, ExpansionError> {
    let Some(number) = referenced_number(token, history) else {
        return Ok(None);
    };
    let number = SequenceNumber::try_from(number)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or(ExpansionError::InvalidCommandNumber)?;
    history
        .lookup(number)
        .map(Some)
        .ok_or(ExpansionError::InvalidCommandNumber)
}

/// Replace `command` with the history entry its first token refers to.
///
/// On success the session's current command becomes the recalled text, the text is
/// re-tokenized (so a recalled trailing `&` takes effect again) and echoed to `out`.
/// Returns whether an expansion took place. On error nothing is modified.
pub fn expand_history(
    command: &mut CommandLine,
    session: &mut Session,
    out: &mut dyn Write,
) -> Result<bool, ExpansionError> {
    let Some(first) = command.program() else {
        return Ok(false);
    };
    let Some(recalled) = resolve(first, &session.history)? else {
        return Ok(false);
    };
    let recalled = recalled.to_owned();
    log::debug!("history reference {first:?} expanded to {recalled:?}");

    *command = lexer::tokenize(&recalled);
    writeln!(out, "{recalled}")?;
    session.current_command = recalled;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(commands: &[&str]) -> HistoryStore {
        let mut history = HistoryStore::default();
        for command in commands {
            history.add(*command);
        }
        history
    }

    fn session_of(commands: &[&str]) -> Session {
        let mut session = Session::new(10);
        session.history = history_of(commands);
        session
    }

    #[test]
    fn test_non_reference_is_left_alone() {
        let history = history_of(&["ls"]);
        assert_eq!(resolve("ls", &history).unwrap(), None);
        assert_eq!(resolve("echo!", &history).unwrap(), None);
    }

    #[test]
    fn test_resolve_by_number() {
        let history = history_of(&["ls", "pwd", "echo hi"]);
        assert_eq!(resolve("!1", &history).unwrap(), Some("ls"));
        assert_eq!(resolve("!3", &history).unwrap(), Some("echo hi"));
        assert_eq!(resolve("!+2", &history).unwrap(), Some("pwd"));
        assert_eq!(resolve("!2abc", &history).unwrap(), Some("pwd"));
        assert_eq!(resolve("!\t3", &history).unwrap(), Some("echo hi"));
        assert_eq!(resolve("!\t\r+1", &history).unwrap(), Some("ls"));
    }

    #[test]
    fn test_double_bang_is_most_recent() {
        let history = history_of(&["ls", "pwd"]);
        assert_eq!(resolve("!!", &history).unwrap(), Some("pwd"));
        assert_eq!(resolve("!!junk", &history).unwrap(), Some("pwd"));
    }

    #[test]
    fn test_invalid_references() {
        let empty = HistoryStore::default();
        let three = history_of(&["a", "b", "c"]);
        for history in [&empty, &three] {
            for token in ["!0", "!-1", "!abc", "!5", "!", "!99999999999999999999999"] {
                assert!(
                    matches!(resolve(token, history), Err(ExpansionError::InvalidCommandNumber)),
                    "{token} should be rejected"
                );
            }
        }
        assert!(matches!(
            resolve("!!", &empty),
            Err(ExpansionError::InvalidCommandNumber)
        ));
    }

    #[test]
    fn test_evicted_entry_is_invalid() {
        let mut history = HistoryStore::new(2);
        history.add("one");
        history.add("two");
        history.add("three");
        assert!(resolve("!1", &history).is_err());
        assert_eq!(resolve("!2", &history).unwrap(), Some("two"));
    }

    #[test]
    fn test_expand_rewrites_command_and_echoes() {
        let mut session = session_of(&["ls", "sleep 1 &"]);
        session.current_command = "!2".to_owned();
        let mut command = lexer::tokenize("!2");
        let mut out = Vec::new();

        assert!(expand_history(&mut command, &mut session, &mut out).unwrap());
        assert_eq!(command.tokens, vec!["sleep", "1"]);
        assert!(command.in_background);
        assert_eq!(session.current_command, "sleep 1 &");
        assert_eq!(String::from_utf8(out).unwrap(), "sleep 1 &\n");
    }

    #[test]
    fn test_expand_ignores_tokens_after_reference() {
        let mut session = session_of(&["ls -l"]);
        let mut command = lexer::tokenize("!1 extra &");
        assert!(expand_history(&mut command, &mut session, &mut Vec::new()).unwrap());
        assert_eq!(command.tokens, vec!["ls", "-l"]);
        assert!(!command.in_background);
    }

    #[test]
    fn test_failed_expansion_changes_nothing() {
        let mut session = session_of(&["ls", "pwd", "date"]);
        session.current_command = "!7".to_owned();
        let mut command = lexer::tokenize("!7");
        let mut out = Vec::new();

        assert!(expand_history(&mut command, &mut session, &mut out).is_err());
        assert_eq!(command.tokens, vec!["!7"]);
        assert_eq!(session.current_command, "!7");
        assert_eq!(session.history.len(), 3);
        assert!(out.is_empty());
    }

    #[test]
    fn test_plain_command_is_not_expanded() {
        let mut session = session_of(&["ls"]);
        let mut command = lexer::tokenize("pwd");
        assert!(!expand_history(&mut command, &mut session, &mut Vec::new()).unwrap());
        assert_eq!(command.tokens, vec!["pwd"]);
    }
}
