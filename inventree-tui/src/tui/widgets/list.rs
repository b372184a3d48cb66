use crossterm::event::KeyCode;

/// Cursor and scroll state of a list or table
#[derive(Debug, Clone)]
pub struct ListState {
    selected: Option<usize>,
    scroll_offset: usize,
    scroll_off: usize, // Rows from edge before scrolling (like vim scrolloff)
    viewport_height: Option<usize>, // Last known viewport height from renderer
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListState {
    pub fn new() -> Self {
        Self {
            selected: None,
            scroll_offset: 0,
            scroll_off: 2,
            viewport_height: None,
        }
    }

    /// Set by the renderer with the actual area height
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = Some(height);
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index;
    }

    /// Keep the selection valid after the item count changed
    pub fn clamp(&mut self, item_count: usize) {
        self.selected = match (self.selected, item_count) {
            (_, 0) => None,
            (Some(sel), n) => Some(sel.min(n - 1)),
            (None, _) => Some(0),
        };
        let height = self.viewport_height.unwrap_or(item_count);
        self.update_scroll(height, item_count);
    }

    /// Handle navigation key, returns true if handled
    pub fn handle_key(&mut self, key: KeyCode, item_count: usize) -> bool {
        if item_count == 0 {
            return false;
        }
        let height = self.viewport_height.unwrap_or(10).max(1);

        let current = self.selected.unwrap_or(0);
        let last = item_count - 1;
        let next = match key {
            KeyCode::Up => match self.selected {
                Some(sel) => sel.saturating_sub(1),
                None => 0,
            },
            KeyCode::Down => match self.selected {
                Some(sel) => (sel + 1).min(last),
                None => 0,
            },
            KeyCode::PageUp => current.saturating_sub(height),
            KeyCode::PageDown => (current + height).min(last),
            KeyCode::Home => 0,
            KeyCode::End => last,
            _ => return false,
        };

        self.selected = Some(next);
        self.update_scroll(height, item_count);
        true
    }

    /// Update scroll offset so the selection stays visible with scrolloff
    pub fn update_scroll(&mut self, visible_height: usize, item_count: usize) {
        if let Some(sel) = self.selected {
            let min_scroll = sel.saturating_sub(visible_height.saturating_sub(self.scroll_off + 1));
            let max_scroll = sel.saturating_sub(self.scroll_off);

            if self.scroll_offset < min_scroll {
                self.scroll_offset = min_scroll;
            } else if self.scroll_offset > max_scroll {
                self.scroll_offset = max_scroll;
            }

            let max_offset = item_count.saturating_sub(visible_height);
            self.scroll_offset = self.scroll_offset.min(max_offset);
        } else {
            self.scroll_offset = 0;
        }
    }
}
