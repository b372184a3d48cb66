use crossterm::event::KeyCode;

/// Cursor and scroll state of a single-line text input
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    /// Cursor position in characters
    cursor: usize,
    scroll_offset: usize,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn set_cursor_to_end(&mut self, value: &str) {
        self.cursor = value.chars().count();
    }

    /// Apply an editing key. Returns the new value when the text changed.
    pub fn handle_key(&mut self, key: KeyCode, value: &str, max_length: Option<usize>) -> Option<String> {
        let mut chars: Vec<char> = value.chars().collect();
        self.cursor = self.cursor.min(chars.len());

        match key {
            KeyCode::Char(c) => {
                if max_length.is_some_and(|max| chars.len() >= max) {
                    return None;
                }
                chars.insert(self.cursor, c);
                self.cursor += 1;
                Some(chars.into_iter().collect())
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                self.cursor -= 1;
                chars.remove(self.cursor);
                Some(chars.into_iter().collect())
            }
            KeyCode::Delete => {
                if self.cursor >= chars.len() {
                    return None;
                }
                chars.remove(self.cursor);
                Some(chars.into_iter().collect())
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(chars.len());
                None
            }
            KeyCode::Home => {
                self.cursor = 0;
                None
            }
            KeyCode::End => {
                self.cursor = chars.len();
                None
            }
            _ => None,
        }
    }

    /// Keep the cursor inside a window `width` characters wide
    pub fn update_scroll(&mut self, width: usize) {
        if width == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + width {
            self.scroll_offset = self.cursor + 1 - width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_delete_at_cursor() {
        let mut state = TextInputState::new();
        let value = state.handle_key(KeyCode::Char('a'), "", None).unwrap();
        let value = state.handle_key(KeyCode::Char('c'), &value, None).unwrap();
        state.handle_key(KeyCode::Left, &value, None);
        let value = state.handle_key(KeyCode::Char('b'), &value, None).unwrap();
        assert_eq!(value, "abc");

        let value = state.handle_key(KeyCode::Backspace, &value, None).unwrap();
        assert_eq!(value, "ac");
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn test_max_length() {
        let mut state = TextInputState::new();
        state.set_cursor_to_end("12");
        assert_eq!(state.handle_key(KeyCode::Char('3'), "12", Some(2)), None);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut state = TextInputState::new();
        state.set_cursor_to_end("0123456789");
        state.update_scroll(4);
        assert_eq!(state.scroll_offset(), 7);
    }
}
