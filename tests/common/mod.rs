#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Output, Stdio};

use nix::unistd::Pid;

pub fn smallsh() -> Command {
    Command::new(env!("CARGO_BIN_EXE_smallsh"))
}

/// Feeds `script` on stdin and collects everything once the shell exits.
pub fn run_script(script: impl AsRef<[u8]>) -> Output {
    run_script_with(smallsh(), script)
}

pub fn run_script_with(mut cmd: Command, script: impl AsRef<[u8]>) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start smallsh");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(script.as_ref())
        .expect("failed to write script");

    child.wait_with_output().expect("failed to wait for smallsh")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// A shell driven line by line, for tests that need timing or signals.
pub struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    transcript: String,
}

impl Session {
    pub fn start(args: &[&str]) -> Self {
        let mut child = smallsh()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to start smallsh");

        let stdin = child.stdin.take();
        let stdout = BufReader::new(child.stdout.take().expect("stdout is piped"));
        Session {
            child,
            stdin,
            stdout,
            transcript: String::new(),
        }
    }

    pub fn pid(&self) -> Pid {
        Pid::from_raw(self.child.id() as i32)
    }

    pub fn send(&mut self, line: &str) {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        writeln!(stdin, "{}", line).expect("failed to write to smallsh");
        stdin.flush().expect("failed to flush smallsh stdin");
    }

    /// Reads output lines until one contains `needle` and returns it.
    pub fn wait_for(&mut self, needle: &str) -> String {
        loop {
            let mut line = String::new();
            let n = self
                .stdout
                .read_line(&mut line)
                .expect("failed to read smallsh output");
            assert!(
                n > 0,
                "smallsh output ended before {:?}; transcript:\n{}",
                needle,
                self.transcript
            );
            self.transcript.push_str(&line);
            if line.contains(needle) {
                return line;
            }
        }
    }

    /// Sends a background command and returns the pid the shell announced.
    pub fn spawn_background(&mut self, command: &str) -> Pid {
        self.send(&format!("{} &", command));
        let line = self.wait_for("background pid is ");
        background_pid(&line)
    }

    /// Closes stdin, drains output and waits for exit.
    pub fn finish(mut self) -> (ExitStatus, String) {
        drop(self.stdin.take());
        let mut rest = String::new();
        std::io::Read::read_to_string(&mut self.stdout, &mut rest)
            .expect("failed to drain smallsh output");
        self.transcript.push_str(&rest);
        let status = self.child.wait().expect("failed to wait for smallsh");
        (status, self.transcript)
    }
}

pub fn background_pid(line: &str) -> Pid {
    let raw = line
        .rsplit("background pid is ")
        .next()
        .and_then(|tail| tail.trim().parse::<i32>().ok())
        .unwrap_or_else(|| panic!("no pid in {:?}", line));
    Pid::from_raw(raw)
}

/// True while the kernel still has an entry for `pid`, zombies included.
pub fn exists(pid: Pid) -> bool {
    std::path::Path::new(&format!("/proc/{}", pid)).exists()
}

/// True while `pid` exists and is not a zombie.
pub fn is_running(pid: Pid) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // state is the first field after the parenthesised command name
        Ok(stat) => stat
            .rsplit_once(") ")
            .map(|(_, rest)| !rest.starts_with('Z'))
            .unwrap_or(false),
        Err(_) => false,
    }
}
