//! Signal dispositions for the shell and its children.
//!
//! The shell ignores SIGTSTP always and SIGINT except while it waits for a line
//! of input. During that read, SIGINT only raises a flag so the blocked
//! `read(2)` returns `EINTR`; the reader turns that into an interrupted read.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn note_interrupt(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

fn set_disposition(signal: Signal, handler: SigHandler, mask: SigSet) -> nix::Result<()> {
    let action = SigAction::new(handler, SaFlags::empty(), mask);
    unsafe { sigaction(signal, &action) }?;
    Ok(())
}

/// Called once at startup.
pub fn install_shell_dispositions() -> nix::Result<()> {
    set_disposition(Signal::SIGTSTP, SigHandler::SigIgn, SigSet::empty())?;
    set_disposition(Signal::SIGINT, SigHandler::SigIgn, SigSet::empty())
}

/// Run in a freshly forked child before exec. SIGTSTP stays ignored.
pub fn reset_for_child() -> nix::Result<()> {
    set_disposition(Signal::SIGINT, SigHandler::SigDfl, SigSet::empty())
}

/// Returns whether SIGINT arrived since the last call, clearing the flag.
pub fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}

/// Lets SIGINT interrupt a blocking read for as long as it is alive.
pub struct InterruptGuard {
    _private: (),
}

impl InterruptGuard {
    pub fn arm() -> nix::Result<Self> {
        INTERRUPTED.store(false, Ordering::SeqCst);
        // no SA_RESTART: the pending read must fail with EINTR
        set_disposition(Signal::SIGINT, SigHandler::Handler(note_interrupt), SigSet::all())?;
        Ok(InterruptGuard { _private: () })
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if let Err(e) = set_disposition(Signal::SIGINT, SigHandler::SigIgn, SigSet::empty()) {
            tracing::warn!("failed to restore SIGINT disposition: {}", e);
        }
    }
}
