//! Input line editing
//!
//! A single-line editor for the command input area: cursor movement,
//! insertion and deletion, and up/down recall from the command history.

use unicode_width::UnicodeWidthStr;

use crate::history::CommandHistory;

/// The pending input line
#[derive(Debug, Default)]
pub struct InputLine {
    buffer: String,
    /// Byte offset of the cursor within the buffer
    cursor: usize,
    /// Position while browsing history; `None` means editing a fresh line
    history_index: Option<usize>,
    /// Fresh line stashed while browsing history
    stash: String,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Display width of the text left of the cursor, in terminal columns.
    pub fn cursor_columns(&self) -> usize {
        self.buffer[..self.cursor].width()
    }

    pub fn insert(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    #[allow(dead_code)]
    pub fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Replace the whole line (link activation with an Input destination).
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_owned();
        self.cursor = self.buffer.len();
        self.history_index = None;
    }

    pub fn backspace(&mut self) {
        if let Some(ch) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
            self.buffer.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(ch) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.buffer[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.history_index = None;
    }

    /// Take the line for submission, resetting the editor.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.history_index = None;
        std::mem::take(&mut self.buffer)
    }

    /// Recall the previous (older) history entry.
    pub fn history_prev(&mut self, history: &CommandHistory) {
        if history.is_empty() {
            return;
        }
        let index = match self.history_index {
            None => {
                self.stash = std::mem::take(&mut self.buffer);
                history.len() - 1
            }
            Some(0) => 0,
            Some(index) => index - 1,
        };
        if let Some(entry) = history.get(index) {
            self.buffer = entry.to_owned();
            self.cursor = self.buffer.len();
            self.history_index = Some(index);
        }
    }

    /// Recall the next (newer) history entry, or restore the stashed line.
    pub fn history_next(&mut self, history: &CommandHistory) {
        let Some(index) = self.history_index else {
            return;
        };
        if index + 1 >= history.len() {
            self.buffer = std::mem::take(&mut self.stash);
            self.cursor = self.buffer.len();
            self.history_index = None;
        } else if let Some(entry) = history.get(index + 1) {
            self.buffer = entry.to_owned();
            self.cursor = self.buffer.len();
            self.history_index = Some(index + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_cursor_movement() {
        let mut input = InputLine::new();
        for ch in "lok".chars() {
            input.insert(ch);
        }
        input.move_left();
        input.insert('o');
        assert_eq!(input.text(), "look");
        input.move_end();
        assert_eq!(input.cursor_columns(), 4);
    }

    #[test]
    fn test_backspace_and_delete_multibyte() {
        let mut input = InputLine::new();
        input.insert_str("héllo");
        input.backspace();
        input.backspace();
        assert_eq!(input.text(), "hél");
        input.move_home();
        input.delete();
        assert_eq!(input.text(), "él");
    }

    #[test]
    fn test_take_resets() {
        let mut input = InputLine::new();
        input.insert_str("north");
        assert_eq!(input.take(), "north");
        assert!(input.is_empty());
        assert_eq!(input.cursor_columns(), 0);
    }

    #[test]
    fn test_history_recall_round_trip() {
        let mut history = CommandHistory::with_path(None);
        history.add("look");
        history.add("north");

        let mut input = InputLine::new();
        input.insert_str("half-ty");

        input.history_prev(&history);
        assert_eq!(input.text(), "north");
        input.history_prev(&history);
        assert_eq!(input.text(), "look");
        // Already at the oldest entry
        input.history_prev(&history);
        assert_eq!(input.text(), "look");

        input.history_next(&history);
        assert_eq!(input.text(), "north");
        // Walking past the newest restores the stashed line
        input.history_next(&history);
        assert_eq!(input.text(), "half-ty");
        input.history_next(&history);
        assert_eq!(input.text(), "half-ty");
    }

    #[test]
    fn test_set_text_replaces_line() {
        let mut input = InputLine::new();
        input.insert_str("something");
        input.set_text("say hello");
        assert_eq!(input.text(), "say hello");
        assert_eq!(input.cursor_columns(), 9);
    }
}
