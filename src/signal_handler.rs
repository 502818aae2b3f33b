//! State shared with signal handlers, and the handlers themselves.
//!
//! Handlers may only push into [`COMPLETIONS`], read [`FOREGROUND`], send a
//! signal, and store into an atomic. Everything else (printing, logging, the
//! job table) happens on the main loop.

use std::sync::atomic::{AtomicI32, Ordering};

use anyhow::{Context as _, Result};
use libc::{c_int, c_void, siginfo_t};
use nix::sys::signal::{kill, sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::Pid;
use tracing::debug;

use crate::completion::CompletionQueue;

pub const COMPLETION_CAPACITY: usize = 1000;

pub static COMPLETIONS: CompletionQueue<COMPLETION_CAPACITY> = CompletionQueue::new();
pub static FOREGROUND: ForegroundSlot = ForegroundSlot::new();

/// Signal number recorded when an interrupt killed the foreground child.
static INTERRUPTED: AtomicI32 = AtomicI32::new(0);

const NO_PID: i32 = 0;

/// The pid of the running foreground command, if any.
pub struct ForegroundSlot(AtomicI32);

impl ForegroundSlot {
    pub const fn new() -> Self {
        ForegroundSlot(AtomicI32::new(NO_PID))
    }

    pub fn set(&self, pid: Pid) {
        self.0.store(pid.as_raw(), Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(NO_PID, Ordering::SeqCst);
    }

    pub fn get(&self) -> Option<Pid> {
        match self.0.load(Ordering::SeqCst) {
            NO_PID => None,
            raw => Some(Pid::from_raw(raw)),
        }
    }
}

extern "C" fn on_child_exit(_sig: c_int, info: *mut siginfo_t, _ctx: *mut c_void) {
    if info.is_null() {
        return;
    }
    let pid = Pid::from_raw(unsafe { (*info).si_pid() });
    if FOREGROUND.get() != Some(pid) {
        // full queue: the pid goes untracked
        let _ = COMPLETIONS.push(pid);
    }
}

extern "C" fn on_interrupt(sig: c_int) {
    if let Some(pid) = FOREGROUND.get() {
        let _ = kill(pid, Signal::SIGKILL);
        INTERRUPTED.store(sig, Ordering::SeqCst);
    }
}

pub fn install_handlers() -> Result<()> {
    let child = SigAction::new(
        SigHandler::SigAction(on_child_exit),
        SaFlags::SA_SIGINFO | SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP,
        SigSet::empty(),
    );
    let interrupt = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    unsafe {
        sigaction(Signal::SIGCHLD, &child).context("failed to install SIGCHLD handler")?;
        sigaction(Signal::SIGINT, &interrupt).context("failed to install SIGINT handler")?;
    }
    debug!("signal handlers installed");
    Ok(())
}

/// Called in a forked child before exec. Background children ignore SIGINT
/// (the disposition survives exec); foreground children get the default.
pub fn reset_for_child(background: bool) -> nix::Result<()> {
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    let handler = if background {
        SigHandler::SigIgn
    } else {
        SigHandler::SigDfl
    };
    let interrupt = SigAction::new(handler, SaFlags::empty(), SigSet::empty());

    unsafe {
        sigaction(Signal::SIGCHLD, &default)?;
        sigaction(Signal::SIGINT, &interrupt)?;
    }
    Ok(())
}

pub fn send_kill(pid: Pid) -> nix::Result<()> {
    debug!("sending SIGKILL to pid {}", pid);
    kill(pid, Signal::SIGKILL)
}

pub fn clear_interrupt() {
    INTERRUPTED.store(0, Ordering::SeqCst);
}

/// Returns and clears the recorded interrupt signal.
pub fn take_interrupt() -> Option<i32> {
    match INTERRUPTED.swap(0, Ordering::SeqCst) {
        0 => None,
        sig => Some(sig),
    }
}
