use super::autocomplete::AutocompleteState;
use super::events::{AutocompleteEvent, TextInputEvent};
use super::text_input::TextInputState;

/// Field that combines value + state for the autocomplete input
#[derive(Debug, Clone, Default)]
pub struct AutocompleteField {
    pub value: String,
    pub state: AutocompleteState,
}

/// What an autocomplete event did to the field
#[derive(Debug, Clone, PartialEq)]
pub enum AutocompleteOutcome {
    Unchanged,
    /// Text changed; the caller may want fresh suggestions
    Edited,
    /// A suggestion was picked (or Enter pressed with the dropdown closed)
    Chosen(String),
}

impl AutocompleteField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle an event. `options` are the current suggestions to filter.
    pub fn handle_event(&mut self, event: AutocompleteEvent, options: &[String]) -> AutocompleteOutcome {
        use crossterm::event::KeyCode;

        match event {
            AutocompleteEvent::Input(KeyCode::Enter) => AutocompleteOutcome::Chosen(self.value.clone()),
            AutocompleteEvent::Input(key) => {
                if let Some(new_value) = self.state.handle_input_key(key, &self.value, None) {
                    self.value = new_value;
                    self.state.update_filtered_options(&self.value, options);
                    AutocompleteOutcome::Edited
                } else {
                    AutocompleteOutcome::Unchanged
                }
            }
            AutocompleteEvent::Navigate(KeyCode::Enter) => match self.state.get_highlighted_option() {
                Some(selected) => self.choose(selected),
                None => AutocompleteOutcome::Unchanged,
            },
            AutocompleteEvent::Navigate(key) => {
                self.state.handle_navigate_key(key);
                AutocompleteOutcome::Unchanged
            }
        }
    }

    fn choose(&mut self, selected: String) -> AutocompleteOutcome {
        self.value = selected.clone();
        self.state.close();
        self.state.set_cursor_to_end(&self.value);
        AutocompleteOutcome::Chosen(selected)
    }

    /// Re-filter after new suggestions arrived
    pub fn refresh_options(&mut self, options: &[String]) {
        self.state.update_filtered_options(&self.value, options);
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: String) {
        self.value = value;
        self.state.set_cursor_to_end(&self.value);
    }

    pub fn clear(&mut self) {
        self.set_value(String::new());
        self.state.close();
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }
}

/// Field that combines value + state for the text input
#[derive(Debug, Clone, Default)]
pub struct TextInputField {
    pub value: String,
    pub state: TextInputState,
}

impl TextInputField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns Some(value) on Submit, None otherwise
    pub fn handle_event(&mut self, event: TextInputEvent, max_length: Option<usize>) -> Option<String> {
        match event {
            TextInputEvent::Changed(key) => {
                if let Some(new_value) = self.state.handle_key(key, &self.value, max_length) {
                    self.value = new_value;
                }
                None
            }
            TextInputEvent::Submit => Some(self.value.clone()),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor is positioned at the end of the value
    pub fn set_value(&mut self, value: String) {
        self.value = value;
        self.state.set_cursor_to_end(&self.value);
    }

    /// Hand back the value and reset the field
    pub fn take(&mut self) -> String {
        let value = std::mem::take(&mut self.value);
        self.state.set_cursor_to_end("");
        value
    }
}
