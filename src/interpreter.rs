use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::expand::{self, ExpansionError};
use crate::external::reap_finished_children;
use crate::interrupt;
use crate::io_adapters::{LineSource, ReadOutcome};
use crate::lexer::{self, CommandLine};
use crate::session::Session;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and `ExternalCommand`.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// What a single read cycle amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// Nothing was entered; nothing ran and nothing was recorded.
    Empty,
    /// The line was refused (bad history reference or limits exceeded) and not recorded.
    Rejected,
    /// A command ran and was recorded.
    Executed(ExitCode),
    /// `exit` was entered.
    Exit,
}

/// The shell: reads lines, expands history references, dispatches to built-in or
/// external commands and records what ran.
///
/// Example
/// ```
/// use bangsh::{Cycle, Interpreter, MemWriter};
/// let out = MemWriter::new();
/// let mut sh = Interpreter::default().with_output(out.clone(), MemWriter::new());
/// assert_eq!(sh.process_line("history").unwrap(), Cycle::Executed(0));
/// assert_eq!(out.contents(), "1\thistory\n");
/// ```
pub struct Interpreter {
    session: Session,
    config: ShellConfig,
    commands: Vec<Box<dyn CommandFactory>>,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    ///
    /// Factories are asked in order; the first one recognizing the command wins.
    pub fn new(config: ShellConfig, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            session: Session::new(config.history_depth),
            config,
            commands,
            stdout: Box::new(std::io::stdout()),
            stderr: Box::new(std::io::stderr()),
        }
    }

    /// Create an interpreter with the standard built-ins and external program launcher.
    pub fn with_config(config: ShellConfig) -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(
            config,
            vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Pwd>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<History>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }

    /// Redirect the shell's own output and error streams.
    pub fn with_output(
        mut self,
        stdout: impl Write + 'static,
        stderr: impl Write + 'static,
    ) -> Self {
        self.stdout = Box::new(stdout);
        self.stderr = Box::new(stderr);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Read and process lines from `input` until `exit` or end of input.
    ///
    /// Returns an error only for conditions that must end the shell.
    pub fn repl(&mut self, input: &mut dyn LineSource) -> Result<(), ShellError> {
        while !self.session.should_exit {
            self.show_pending_interrupt()?;
            self.session.refresh_current_dir();
            let prompt = self.session.prompt();

            match input.read_line(&prompt)? {
                ReadOutcome::Line(line) => {
                    self.process_line(&line)?;
                }
                ReadOutcome::Interrupted => {
                    interrupt::take_pending();
                    self.show_history_after_interrupt()?;
                    self.process_line("")?;
                }
                ReadOutcome::Eof => {
                    log::debug!("end of input");
                    self.session.should_exit = true;
                }
            }
        }
        self.stdout.flush()?;
        Ok(())
    }

    /// Run one full cycle for `line`: tokenize, expand, dispatch, record, then reap
    /// finished background children.
    pub fn process_line(&mut self, line: &str) -> Result<Cycle, ShellError> {
        self.session.current_command = line.to_owned();
        let cycle = self.dispatch(line);
        let reaped = reap_finished_children();
        if reaped > 0 {
            log::debug!("reaped {reaped} background children");
        }
        cycle
    }

    fn dispatch(&mut self, line: &str) -> Result<Cycle, ShellError> {
        let mut command = match lexer::tokenize_bounded(line, &self.config.limits()) {
            Ok(command) => command,
            Err(e) => {
                writeln!(self.stderr, "{e}")?;
                return Ok(Cycle::Rejected);
            }
        };

        match expand::expand_history(&mut command, &mut self.session, &mut *self.stdout) {
            Ok(_) => {}
            Err(ExpansionError::InvalidCommandNumber) => {
                writeln!(self.stderr, "{}", ExpansionError::InvalidCommandNumber)?;
                return Ok(Cycle::Rejected);
            }
            Err(ExpansionError::Echo(e)) => return Err(ShellError::Output(e)),
        }

        let Some(program) = command.program() else {
            return Ok(Cycle::Empty);
        };
        let Some(cmd) = self.create(&command) else {
            writeln!(self.stderr, "{program}: command not found")?;
            return Ok(Cycle::Rejected);
        };
        log::debug!("dispatching {:?}", command.tokens);

        let records_itself = cmd.records_itself();
        let code = cmd.execute(&mut *self.stdout, &mut *self.stderr, &mut self.session)?;
        if self.session.should_exit {
            return Ok(Cycle::Exit);
        }
        if !records_itself {
            self.session
                .history
                .add(self.session.current_command.clone());
        }
        Ok(Cycle::Executed(code))
    }

    fn create(&self, command: &CommandLine) -> Option<Box<dyn ExecutableCommand>> {
        self.commands
            .iter()
            .find_map(|factory| factory.try_create(&self.session, command))
    }

    fn show_pending_interrupt(&mut self) -> Result<(), ShellError> {
        if interrupt::take_pending() {
            self.show_history_after_interrupt()?;
        }
        Ok(())
    }

    fn show_history_after_interrupt(&mut self) -> Result<(), ShellError> {
        writeln!(self.stdout)?;
        self.session.history.display(&mut *self.stdout)?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default configuration and set of commands:
    /// - built-ins: `exit`, `pwd`, `cd`, `history`
    /// - external command launcher for everything else
    fn default() -> Self {
        Self::with_config(ShellConfig::default())
    }
}
