use std::env;
use std::fmt;
use std::io::{self, Write};

use colored::Colorize;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandDescriptor};
use crate::config::Config;
use crate::error::ShellError;
use crate::exec;
use crate::input::LineSource;
use crate::jobs::JobTable;
use crate::signal_handler::COMPLETIONS;
use crate::status::ExitStatus;

pub const PROMPT: &str = ": ";

pub struct Shell {
    config: Config,
    jobs: JobTable,
    last_status: ExitStatus,
    running: bool,
}

impl Shell {
    pub fn new(config: Config) -> Self {
        if let Ok(exe_path) = env::current_exe() {
            env::set_var("SHELL", exe_path);
        }

        Self {
            jobs: JobTable::new(config.job_capacity),
            config,
            last_status: ExitStatus::Unset,
            running: true,
        }
    }

    pub fn run(&mut self, input: &mut dyn LineSource) {
        while self.running {
            self.reap_completed();

            let line = match input.read_line(PROMPT) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("end of input");
                    self.exit();
                    break;
                }
                Err(e) => {
                    report(&format!("error reading input: {}", e));
                    self.exit();
                    break;
                }
            };

            let line = truncate_line(&line, self.config.max_line);
            self.dispatch(Command::parse(line, self.config.max_args));
        }
        let _ = io::stdout().flush();
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::Noop => {}
            Command::Cd(path) => self.change_dir(path.as_deref()),
            Command::Status => say(format_args!("{}", self.last_status)),
            Command::Exit => self.exit(),
            Command::External(desc) => self.launch(desc),
        }
    }

    fn change_dir(&self, path: Option<&str>) {
        let home = env::var("HOME").unwrap_or_else(|_| "/".to_string());
        let target = path.unwrap_or(&home);
        debug!("cd {}", target);

        if let Err(source) = env::set_current_dir(target) {
            report_error(&ShellError::ChangeDir {
                path: target.to_string(),
                source,
            });
        }
    }

    fn launch(&mut self, desc: CommandDescriptor) {
        let pid = match exec::spawn(&desc) {
            Ok(pid) => pid,
            Err(e) => {
                report_error(&e);
                return;
            }
        };

        if desc.background {
            say(format_args!("background pid is {}", pid));
            if !self.jobs.insert(pid) {
                debug!("pid {} runs untracked", pid);
            }
            return;
        }

        match exec::wait_foreground(pid) {
            Ok(status) => {
                if let Some(signum) = status.signal() {
                    say(format_args!("terminated by signal {}", signum));
                }
                self.last_status = status;
            }
            Err(e) => {
                warn!("{}", e);
                report_error(&e);
            }
        }
    }

    /// Drains the completion queue, reporting and forgetting each finished
    /// background job, then collects any child whose SIGCHLD was merged with
    /// another one.
    fn reap_completed(&mut self) {
        if !COMPLETIONS.is_empty() {
            debug!("reaping {} completion(s)", COMPLETIONS.len());
        }

        while let Some(pid) = COMPLETIONS.pop() {
            if !self.jobs.mark_completed(pid) {
                debug!("pid {} completed untracked", pid);
            }
            match exec::reap(pid) {
                Some(status) => self.finish_job(pid, status),
                // not ours any more, or still running: keep whatever is tracked
                None => {
                    if self.jobs.contains(pid) {
                        warn!("tracked pid {} could not be reaped yet", pid);
                    }
                }
            }
        }

        while let Some((pid, status)) = exec::reap_any() {
            debug!("pid {} collected without its own notification", pid);
            self.jobs.mark_completed(pid);
            self.finish_job(pid, status);
        }
    }

    fn finish_job(&mut self, pid: Pid, status: WaitStatus) {
        match status {
            WaitStatus::Exited(_, code) => {
                say(format_args!(
                    "background pid {} is done: exit value {}",
                    pid, code
                ));
            }
            WaitStatus::Signaled(_, signal, _) => {
                say(format_args!(
                    "background pid {} is done: terminated by signal {}",
                    pid, signal as i32
                ));
            }
            other => debug!("pid {} reaped with {:?}", pid, other),
        }
        if let Some(job) = self.jobs.remove(pid) {
            debug!("forgot job {} ({:?})", job.pid, job.state);
        }
    }

    /// Kills every tracked job and stops the loop.
    fn exit(&mut self) {
        if !self.jobs.is_empty() {
            info!(
                "killing {} of {} tracked job slot(s)",
                self.jobs.len(),
                self.jobs.capacity()
            );
        }
        let pids: Vec<Pid> = self.jobs.pids().collect();
        for pid in pids {
            exec::terminate(pid);
            self.jobs.remove(pid);
        }
        self.running = false;
    }

    #[cfg(test)]
    fn last_status(&self) -> ExitStatus {
        self.last_status
    }
}

fn truncate_line(line: &str, max: usize) -> &str {
    if line.len() <= max {
        return line;
    }
    let mut end = max;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Writes one line to stdout. A closed stdout is logged, never fatal.
fn say(line: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(io::stdout(), "{}", line) {
        debug!("stdout write failed: {}", e);
    }
}

fn report(message: &str) {
    let _ = io::stdout().flush();
    if let Err(e) = writeln!(io::stderr(), "{}", message.red()) {
        debug!("stderr write failed: {}", e);
    }
}

fn report_error(err: &ShellError) {
    report(&err.to_string());
}
