use crossterm::event::KeyCode;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::text_input::TextInputState;

/// Dropdown state for a text input with suggestions
#[derive(Debug, Clone, Default)]
pub struct AutocompleteState {
    pub input: TextInputState,
    filtered: Vec<String>,
    highlight: usize,
    open: bool,
}

impl AutocompleteState {
    pub fn handle_input_key(&mut self, key: KeyCode, value: &str, max_length: Option<usize>) -> Option<String> {
        self.input.handle_key(key, value, max_length)
    }

    pub fn set_cursor_to_end(&mut self, value: &str) {
        self.input.set_cursor_to_end(value);
    }

    /// Rank `options` against `query`, best match first
    pub fn update_filtered_options(&mut self, query: &str, options: &[String]) {
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &String)> = options
            .iter()
            .filter_map(|option| {
                if query.is_empty() {
                    Some((0, option))
                } else {
                    matcher.fuzzy_match(option, query).map(|score| (score, option))
                }
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        self.filtered = scored.into_iter().map(|(_, option)| option.clone()).collect();
        self.highlight = 0;
        self.open = !self.filtered.is_empty();
    }

    pub fn handle_navigate_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.highlight = self.highlight.saturating_sub(1),
            KeyCode::Down => {
                if self.highlight + 1 < self.filtered.len() {
                    self.highlight += 1;
                }
            }
            KeyCode::Esc => self.close(),
            _ => {}
        }
    }

    pub fn get_highlighted_option(&self) -> Option<String> {
        self.filtered.get(self.highlight).cloned()
    }

    pub fn filtered(&self) -> &[String] {
        &self.filtered
    }

    pub fn highlight(&self) -> usize {
        self.highlight
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
