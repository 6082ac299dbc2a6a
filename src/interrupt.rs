//! Interrupt (SIGINT) notification.
//!
//! The signal handler only raises a flag. The read loop polls the flag and prints the
//! history itself, so no shell state is ever touched from signal context.

use nix::libc::c_int;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};

static PENDING: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signal: c_int) {
    PENDING.store(true, Ordering::SeqCst);
}

/// Route SIGINT to the pending flag instead of terminating the process.
///
/// `SA_RESTART` stays unset, so a blocking `waitpid` on a foreground child returns `EINTR`.
pub fn install() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::empty(),
        SigSet::empty(),
    );
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
    unsafe { signal::sigaction(Signal::SIGINT, &action) }?;
    Ok(())
}

/// Consume a pending interrupt, returning whether one arrived since the last call.
pub fn take_pending() -> bool {
    PENDING.swap(false, Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raised_interrupt_is_reported_once() {
        install().unwrap();
        take_pending();

        signal::raise(Signal::SIGINT).unwrap();

        assert!(take_pending());
        assert!(!take_pending());
    }
}
