/// Text being edited plus a cursor measured in chars.
#[derive(Debug, Default)]
pub struct LineBuffer {
    text: String,
    cursor: usize,
}

impl LineBuffer {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_at(self.cursor);
        self.text.remove(at);
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.char_count() {
            return false;
        }
        let at = self.byte_at(self.cursor);
        self.text.remove(at);
        true
    }

    pub fn left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn right(&mut self) -> bool {
        if self.cursor >= self.char_count() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Ctrl-K
    pub fn kill_to_end(&mut self) {
        let at = self.byte_at(self.cursor);
        self.text.truncate(at);
    }

    /// Ctrl-U
    pub fn kill_to_start(&mut self) {
        let at = self.byte_at(self.cursor);
        self.text.drain(..at);
        self.cursor = 0;
    }

    /// Ctrl-W: the word before the cursor plus any spaces after it.
    pub fn kill_word(&mut self) -> bool {
        let chars: Vec<char> = self.text.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        if start == self.cursor {
            return false;
        }
        let (from, to) = (self.byte_at(start), self.byte_at(self.cursor));
        self.text.drain(from..to);
        self.cursor = start;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> LineBuffer {
        let mut buf = LineBuffer::default();
        s.chars().for_each(|c| buf.insert(c));
        buf
    }

    #[test]
    fn insert_in_the_middle() {
        let mut buf = typed("ehoo");
        assert!(buf.backspace());
        buf.left();
        buf.left();
        buf.insert('c');
        assert_eq!(buf.as_str(), "echo");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn edits_respect_multibyte_chars() {
        let mut buf = typed("héllo");
        buf.home();
        buf.right();
        assert!(buf.delete());
        assert_eq!(buf.as_str(), "hllo");
        buf.end();
        assert_eq!(buf.cursor(), 4);
        assert!(!buf.delete());
    }

    #[test]
    fn kill_commands() {
        let mut buf = typed("sleep 30 &");
        assert!(buf.kill_word());
        assert_eq!(buf.as_str(), "sleep 30 ");
        assert!(buf.kill_word());
        assert_eq!(buf.as_str(), "sleep ");

        buf.home();
        buf.right();
        buf.kill_to_end();
        assert_eq!(buf.as_str(), "s");

        buf.end();
        buf.kill_to_start();
        assert!(buf.is_empty());
        assert!(!buf.kill_word());
    }

    #[test]
    fn take_resets() {
        let mut buf = typed("status");
        assert_eq!(buf.take(), "status");
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), 0);
    }
}
