//! Input Controller - text editing and submission composition.
//!
//! [`compose`] turns the current input text and staging slot into a
//! [`Submission`]. The handler layer decides what to send for it.

use crate::attachment::{AttachmentFile, AttachmentStaging};

/// Single-line text buffer with a character cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    /// Cursor position in characters (not bytes)
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole buffer, cursor at the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_index(self.cursor);
        self.text.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor >= self.text.chars().count() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Delete the word before the cursor (Ctrl+W).
    pub fn delete_word(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let from = self.byte_index(start);
        let to = self.byte_index(self.cursor);
        self.text.replace_range(from..to, "");
        self.cursor = start;
    }
}

/// What the user submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Text only.
    Text { text: String },
    /// A file, with optional accompanying text (may be empty).
    File { file: AttachmentFile, text: String },
}

impl Submission {
    pub fn text(&self) -> &str {
        match self {
            Submission::Text { text } | Submission::File { text, .. } => text,
        }
    }
}

/// Build a submission from the input and staging slot.
///
/// Returns `None` without touching either when the trimmed text is empty
/// and nothing is staged. Otherwise the input is cleared and the staged
/// attachment (if any) is taken out of the slot.
pub fn compose(input: &mut InputBuffer, staging: &mut AttachmentStaging) -> Option<Submission> {
    let text = input.text().trim().to_string();
    if text.is_empty() && staging.is_empty() {
        return None;
    }

    input.clear();
    match staging.take() {
        Some(file) => Some(Submission::File { file, text }),
        None => Some(Submission::Text { text }),
    }
}
