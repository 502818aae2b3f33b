use std::io::{self, BufRead, IsTerminal, Write};

use tracing::debug;

use crate::editor::LineEditor;

/// Where command lines come from. `Ok(None)` means end of input.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Reads newline-terminated lines from any buffered reader, printing the
/// prompt to stdout first. Bytes that are not valid UTF-8 are replaced, so a
/// bad line is still handed to the shell instead of ending the session.
pub struct PlainReader<R> {
    reader: R,
}

impl<R: BufRead> PlainReader<R> {
    pub fn new(reader: R) -> Self {
        PlainReader { reader }
    }
}

impl<R: BufRead> LineSource for PlainReader<R> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        if let Err(e) = stdout.write_all(prompt.as_bytes()).and_then(|_| stdout.flush()) {
            debug!("prompt write failed: {}", e);
        }

        let mut line = Vec::new();
        loop {
            match self.reader.read_until(b'\n', &mut line) {
                Ok(0) if line.is_empty() => return Ok(None),
                Ok(_) => return Ok(Some(String::from_utf8_lossy(&line).into_owned())),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl LineSource for LineEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        LineEditor::read_line(self, prompt)
    }
}

/// The editor when stdin is a terminal, plain line reading otherwise.
pub fn stdin_source() -> Box<dyn LineSource> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        Box::new(LineEditor::new())
    } else {
        Box::new(PlainReader::new(stdin.lock()))
    }
}
