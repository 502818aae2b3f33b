use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, ClearType},
};

use super::buffer::LineBuffer;
use super::raw_mode::RawTerminal;

enum Outcome {
    Line,
    Cancel,
    Eof,
}

/// Interactive line reader for terminal sessions.
#[derive(Default)]
pub struct LineEditor {
    buffer: LineBuffer,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(None)` on Ctrl-D with an empty line. Ctrl-C abandons the
    /// line and yields an empty string, which the shell treats as a no-op.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.buffer.clear();
        let mut stdout = io::stdout();
        let _raw = RawTerminal::enable()?;

        execute!(stdout, Print(prompt))?;

        let outcome = loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            if let Some(outcome) = self.handle_key(key, prompt)? {
                break outcome;
            }
        };

        execute!(stdout, Print("\r\n"))?;
        match outcome {
            Outcome::Line => Ok(Some(self.buffer.take())),
            Outcome::Cancel => {
                self.buffer.clear();
                Ok(Some(String::new()))
            }
            Outcome::Eof => Ok(None),
        }
    }

    fn handle_key(&mut self, key: KeyEvent, prompt: &str) -> io::Result<Option<Outcome>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let changed = match key.code {
            KeyCode::Enter => return Ok(Some(Outcome::Line)),
            KeyCode::Char('c') if ctrl => return Ok(Some(Outcome::Cancel)),
            KeyCode::Char('d') if ctrl => {
                if self.buffer.is_empty() {
                    return Ok(Some(Outcome::Eof));
                }
                self.buffer.delete()
            }
            KeyCode::Char('a') if ctrl => {
                self.buffer.home();
                true
            }
            KeyCode::Char('e') if ctrl => {
                self.buffer.end();
                true
            }
            KeyCode::Char('k') if ctrl => {
                self.buffer.kill_to_end();
                true
            }
            KeyCode::Char('u') if ctrl => {
                self.buffer.kill_to_start();
                true
            }
            KeyCode::Char('w') if ctrl => self.buffer.kill_word(),
            KeyCode::Char('l') if ctrl => {
                execute!(io::stdout(), terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
                true
            }
            KeyCode::Char(_) if ctrl => false,
            KeyCode::Char(c) => {
                self.buffer.insert(c);
                true
            }
            KeyCode::Backspace => self.buffer.backspace(),
            KeyCode::Delete => self.buffer.delete(),
            KeyCode::Left => self.buffer.left(),
            KeyCode::Right => self.buffer.right(),
            KeyCode::Home => {
                self.buffer.home();
                true
            }
            KeyCode::End => {
                self.buffer.end();
                true
            }
            _ => false,
        };

        if changed {
            self.redraw(prompt)?;
        }
        Ok(None)
    }

    fn redraw(&self, prompt: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        let column = prompt.chars().count() + self.buffer.cursor();
        queue!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print(prompt),
            Print(self.buffer.as_str()),
            cursor::MoveToColumn(column as u16),
        )?;
        stdout.flush()
    }
}
