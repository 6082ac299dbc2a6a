use crate::error::ShellError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{ErrorKind, Result as IoResult, Write};
use std::rc::Rc;

/// Result of one attempt to read a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete line, without its trailing newline.
    Line(String),
    /// The read was cut short by the user's interrupt key; no command was entered.
    Interrupted,
    /// The input stream is exhausted.
    Eof,
}

/// Anything the read loop can pull command lines from.
pub trait LineSource {
    /// Show `prompt` and read the next line.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError>;
}

/// Interactive terminal input backed by rustyline.
pub struct EditorInput {
    editor: DefaultEditor,
}

impl EditorInput {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorInput {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        log::warn!("line editor rejected history entry: {e}");
                    }
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Io(e)) if e.kind() == ErrorKind::Interrupted => {
                Ok(ReadOutcome::Interrupted)
            }
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(ShellError::Read(e)),
        }
    }
}

/// Pre-recorded input, replayed one outcome per read. Reports `Eof` once drained.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    outcomes: VecDeque<ReadOutcome>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(outcomes: impl IntoIterator<Item = ReadOutcome>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// Script consisting only of complete lines.
    pub fn from_lines<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self::new(lines.into_iter().map(|line| ReadOutcome::Line(line.into())))
    }

    /// Every prompt shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError> {
        self.prompts.push(prompt.to_owned());
        Ok(self.outcomes.pop_front().unwrap_or(ReadOutcome::Eof))
    }
}

/// Memory-backed writer for capturing shell output.
#[derive(Debug, Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// Public constructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return inner Rc so caller can read collected bytes after command execution.
    pub fn into_inner(self) -> Rc<RefCell<Vec<u8>>> {
        self.buf
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }

    /// Everything written so far, decoded lossily.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_input_replays_then_ends() {
        let mut input = ScriptedInput::new([
            ReadOutcome::Line("ls".into()),
            ReadOutcome::Interrupted,
        ]);
        assert_eq!(input.read_line("a> ").unwrap(), ReadOutcome::Line("ls".into()));
        assert_eq!(input.read_line("b> ").unwrap(), ReadOutcome::Interrupted);
        assert_eq!(input.read_line("c> ").unwrap(), ReadOutcome::Eof);
        assert_eq!(input.prompts(), ["a> ", "b> ", "c> "]);
    }

    #[test]
    fn test_mem_writer_shares_buffer() {
        let (mut writer, handle) = MemWriter::with_handle();
        let reader = writer.clone();
        write!(writer, "hello {}", 42).unwrap();
        assert_eq!(&*handle.borrow(), b"hello 42");
        assert_eq!(reader.contents(), "hello 42");
        assert_eq!(reader.into_inner().borrow().len(), 8);
    }
}
