use std::fmt;

use nix::sys::wait::WaitStatus;

/// How the last foreground command ended, as reported by `status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitStatus {
    #[default]
    Unset,
    Exited(i32),
    Signaled(i32),
}

impl ExitStatus {
    pub fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitStatus::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ExitStatus::Signaled(signal as i32)),
            _ => None,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match self {
            ExitStatus::Signaled(signum) => Some(*signum),
            _ => None,
        }
    }
}

// Unset reads as a clean exit: `status` before any foreground command
// prints "exit value 0".
impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Unset => write!(f, "exit value 0"),
            ExitStatus::Exited(code) => write!(f, "exit value {}", code),
            ExitStatus::Signaled(signum) => write!(f, "terminating signal was {}", signum),
        }
    }
}
