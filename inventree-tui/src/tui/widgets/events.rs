use crossterm::event::KeyCode;

#[derive(Debug, Clone, PartialEq)]
pub enum TextInputEvent {
    Changed(KeyCode),
    Submit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AutocompleteEvent {
    /// Typing or cursor movement
    Input(KeyCode),
    /// Dropdown navigation (Up/Down/Enter/Esc)
    Navigate(KeyCode),
}

impl TextInputEvent {
    pub fn from_key(code: KeyCode) -> Self {
        match code {
            KeyCode::Enter => TextInputEvent::Submit,
            other => TextInputEvent::Changed(other),
        }
    }
}

impl AutocompleteEvent {
    pub fn from_key(code: KeyCode, dropdown_open: bool) -> Self {
        match code {
            KeyCode::Up | KeyCode::Down | KeyCode::Enter | KeyCode::Esc if dropdown_open => {
                AutocompleteEvent::Navigate(code)
            }
            other => AutocompleteEvent::Input(other),
        }
    }
}
