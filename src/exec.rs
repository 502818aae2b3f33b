use std::convert::Infallible;
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};

use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::errno::Errno;
use nix::sys::signal::{SigSet, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{execvp, fork, ForkResult, Pid};
use tracing::{debug, error, warn};

use crate::command::CommandDescriptor;
use crate::error::{Result, ShellError};
use crate::signal_handler::{self, FOREGROUND};
use crate::status::ExitStatus;

const NULL_DEVICE: &str = "/dev/null";

/// Keeps SIGCHLD blocked while alive, so a child that exits immediately is
/// not reported before the parent has recorded it.
struct ChildSignalBlock {
    set: SigSet,
}

impl ChildSignalBlock {
    fn enter() -> Self {
        let mut set = SigSet::empty();
        set.add(Signal::SIGCHLD);
        if let Err(e) = set.thread_block() {
            warn!("failed to block SIGCHLD: {}", e);
        }
        ChildSignalBlock { set }
    }
}

impl Drop for ChildSignalBlock {
    fn drop(&mut self) {
        let _ = self.set.thread_unblock();
    }
}

/// Forks and execs `desc`. For a foreground command the pid is placed in the
/// foreground slot before SIGCHLD can be delivered for it.
pub fn spawn(desc: &CommandDescriptor) -> Result<Pid> {
    let program = desc.program().unwrap_or_default().to_string();
    let argv = desc
        .args
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| ShellError::NulArgument {
            program: program.clone(),
        })?;

    // nothing buffered may be duplicated into the child
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    let block = ChildSignalBlock::enter();
    debug!("forking {:?} background:{}", desc.args, desc.background);

    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            if !desc.background {
                signal_handler::clear_interrupt();
                FOREGROUND.set(child);
            }
            drop(block);
            debug!("spawned {} as pid {}", program, child);
            Ok(child)
        }
        Ok(ForkResult::Child) => {
            std::mem::forget(block);
            let err = match exec_child(desc, &argv) {
                Ok(never) => match never {},
                Err(err) => err,
            };
            let _ = writeln!(io::stderr(), "{}", err);
            let _ = io::stdout().flush();
            let _ = io::stderr().flush();
            std::process::exit(1);
        }
        Err(source) => {
            drop(block);
            error!("fork failed for {}: {}", program, source);
            Err(ShellError::Spawn { program, source })
        }
    }
}

/// Child side of `spawn`: signals, redirections, then image replacement.
fn exec_child(desc: &CommandDescriptor, argv: &[CString]) -> Result<Infallible> {
    let mut set = SigSet::empty();
    set.add(Signal::SIGCHLD);
    let _ = set.thread_unblock();
    let _ = signal_handler::reset_for_child(desc.background);

    redirect_stdio(desc)?;

    execvp(&argv[0], argv).map_err(|source| ShellError::Exec {
        program: desc.args[0].clone(),
        source,
    })
}

fn redirect_stdio(desc: &CommandDescriptor) -> Result<()> {
    match (&desc.input, desc.background) {
        (Some(path), _) => rebind(open_input(path)?, STDIN_FILENO, path)?,
        (None, true) => rebind(open_input(NULL_DEVICE)?, STDIN_FILENO, NULL_DEVICE)?,
        (None, false) => {}
    }

    if let Some(path) = &desc.output {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(path)
            .map_err(|source| ShellError::Redirect {
                path: path.clone(),
                source,
            })?;
        rebind(file, STDOUT_FILENO, path)?;
    }
    Ok(())
}

fn open_input(path: &str) -> Result<File> {
    File::open(path).map_err(|source| ShellError::Redirect {
        path: path.to_string(),
        source,
    })
}

fn rebind(file: File, target: RawFd, path: &str) -> Result<()> {
    if unsafe { libc::dup2(file.as_raw_fd(), target) } == -1 {
        return Err(ShellError::Redirect {
            path: path.to_string(),
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

/// Blocks until the foreground child `pid` terminates, then empties the
/// foreground slot. An interrupt delivered meanwhile wins over the raw wait
/// outcome.
pub fn wait_foreground(pid: Pid) -> Result<ExitStatus> {
    let outcome = wait_terminated(pid);
    FOREGROUND.clear();
    let interrupted = signal_handler::take_interrupt();

    let status = outcome?;
    debug!("foreground pid {} finished: {:?}", pid, status);
    Ok(match interrupted {
        Some(signum) => ExitStatus::Signaled(signum),
        None => status,
    })
}

fn wait_terminated(pid: Pid) -> Result<ExitStatus> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(status) = ExitStatus::from_wait(status) {
                    return Ok(status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(source) => {
                return Err(ShellError::Wait {
                    pid: pid.as_raw(),
                    source,
                })
            }
        }
    }
}

/// Collects a background child already reported as exited. `None` means the
/// pid is not ours to wait for any more, or it is somehow still running.
pub fn reap(pid: Pid) -> Option<WaitStatus> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {
                warn!("pid {} reported done but still running", pid);
                return None;
            }
            Ok(status) => return Some(status),
            Err(Errno::EINTR) => continue,
            Err(e) => {
                debug!("reap pid {}: {}", pid, e);
                return None;
            }
        }
    }
}

/// Collects any child that has already terminated, without blocking. Used
/// after the queue is drained, since exits that land together can share a
/// single SIGCHLD.
pub fn reap_any() -> Option<(Pid, WaitStatus)> {
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => return None,
            Ok(status) => return status.pid().map(|pid| (pid, status)),
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => return None,
            Err(e) => {
                debug!("reap any child: {}", e);
                return None;
            }
        }
    }
}

/// SIGKILLs `pid` and waits for it to go away.
pub fn terminate(pid: Pid) {
    if let Err(e) = signal_handler::send_kill(pid) {
        debug!("kill pid {}: {}", pid, e);
        return;
    }
    loop {
        match waitpid(pid, None) {
            Err(Errno::EINTR) => continue,
            Ok(_) | Err(_) => break,
        }
    }
}
