use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::interrupt;
use crate::lexer::CommandLine;
use crate::session::Session;
use nix::errno::Errno;
use nix::libc;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{self, ForkResult, Pid};
use std::ffi::CString;
use std::io::Write;

const EXEC_FAILED: &[u8] = b"execvp failed\n";

/// Command that is not a builtin.
///
/// Runs in a forked child that replaces itself with the named program, looked up in `PATH`.
pub struct ExternalCommand {
    command: CommandLine,
}

impl ExternalCommand {
    pub fn new(command: CommandLine) -> Self {
        Self { command }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    /// Accepts any non-empty command line; whether the program exists is only known after exec.
    fn try_create(
        &self,
        _session: &Session,
        command: &CommandLine,
    ) -> Option<Box<dyn ExecutableCommand>> {
        command.program()?;
        Some(Box::new(ExternalCommand::new(command.clone())))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode, ShellError> {
        let argv = match self.command.argv() {
            Ok(argv) => argv,
            Err(e) => {
                log::debug!("cannot pass {:?} to execvp: {e}", self.command.tokens);
                stderr.write_all(EXEC_FAILED)?;
                return Ok(1);
            }
        };

        // Anything still buffered would otherwise be written twice, once by each process.
        stdout.flush()?;
        stderr.flush()?;

        // SAFETY: the child only calls execvp, write and _exit before it is replaced or exits.
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Child) => exec_child(&argv),
            Ok(ForkResult::Parent { child }) => {
                if self.command.in_background {
                    log::debug!("started {:?} in background as pid {child}", argv[0]);
                    Ok(0)
                } else {
                    log::debug!("waiting for {:?} (pid {child})", argv[0]);
                    wait_foreground(child, stdout, session)
                }
            }
            Err(e) => Err(ShellError::Fork(e)),
        }
    }
}

/// Replace the child's image with `argv[0]`, exiting with status 1 if that fails.
fn exec_child(argv: &[CString]) -> ! {
    let _ = unistd::execvp(&argv[0], argv);
    // Raw write: the stderr lock may have been held by another thread at fork time.
    // SAFETY: the buffer is a valid static byte string of the given length.
    unsafe {
        libc::write(
            libc::STDERR_FILENO,
            EXEC_FAILED.as_ptr().cast(),
            EXEC_FAILED.len(),
        )
    };
    // SAFETY: _exit is async-signal-safe and never returns.
    unsafe { libc::_exit(1) }
}

/// Block until `child` exits, showing the history whenever an interrupt arrives meanwhile.
fn wait_foreground(
    child: Pid,
    stdout: &mut dyn Write,
    session: &Session,
) -> Result<ExitCode, ShellError> {
    loop {
        match waitpid(child, None) {
            Ok(status) => {
                if let Some(code) = exit_code(status) {
                    log::debug!("pid {child} finished with {code}");
                    return Ok(code);
                }
            }
            Err(Errno::EINTR) => {
                if interrupt::take_pending() {
                    writeln!(stdout)?;
                    session.history.display(stdout)?;
                    stdout.flush()?;
                }
            }
            Err(e) => {
                log::warn!("waitpid({child}) failed: {e}");
                return Ok(-1);
            }
        }
    }
}

/// Exit code for a terminal wait status: the program's own code, or 128 + signal number.
fn exit_code(status: WaitStatus) -> Option<ExitCode> {
    match status {
        WaitStatus::Exited(_, code) => Some(code),
        WaitStatus::Signaled(_, signal, _) => Some(128 + signal as i32),
        _ => None,
    }
}

/// Collect every background child that has already finished, without blocking.
///
/// Returns how many children were reaped. Having no children at all is not an error.
pub fn reap_finished_children() -> usize {
    let mut reaped = 0;
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(status) => {
                log::debug!("reaped background child: {status:?}");
                reaped += 1;
            }
            Err(Errno::EINTR) => continue,
            Err(_) => break,
        }
    }
    reaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;

    #[test]
    fn exit_code_of_normal_exit() {
        let pid = Pid::from_raw(42);
        assert_eq!(exit_code(WaitStatus::Exited(pid, 0)), Some(0));
        assert_eq!(exit_code(WaitStatus::Exited(pid, 3)), Some(3));
    }

    #[test]
    fn exit_code_of_signal() {
        let pid = Pid::from_raw(42);
        assert_eq!(
            exit_code(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some(137)
        );
        assert_eq!(
            exit_code(WaitStatus::Signaled(pid, Signal::SIGINT, true)),
            Some(130)
        );
    }

    #[test]
    fn stopped_child_is_not_terminal() {
        let pid = Pid::from_raw(42);
        assert_eq!(exit_code(WaitStatus::Stopped(pid, Signal::SIGSTOP)), None);
        assert_eq!(exit_code(WaitStatus::StillAlive), None);
    }

    #[test]
    fn factory_accepts_any_program() {
        let session = Session::new(10);
        let factory = Factory::<ExternalCommand>::default();
        let cmd = factory.try_create(
            &session,
            &crate::lexer::tokenize("definitely-not-a-program &"),
        );
        assert!(cmd.is_some());
        assert!(!cmd.unwrap().records_itself());
        assert!(
            factory
                .try_create(&session, &crate::lexer::tokenize("   "))
                .is_none()
        );
    }
}
