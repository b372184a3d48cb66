use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key combination, compared on code and modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self { code, modifiers: KeyModifiers::NONE }
    }

    pub fn ctrl(c: char) -> Self {
        Self { code: KeyCode::Char(c), modifiers: KeyModifiers::CONTROL }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        // Shift is folded into the character for printable keys
        let modifiers = key.modifiers.difference(KeyModifiers::SHIFT);
        self.code == key.code && self.modifiers == modifiers
    }

    pub fn label(&self) -> String {
        let key = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::F(n) => format!("F{}", n),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Delete => "Del".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            other => format!("{:?}", other),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("^{}", key)
        } else {
            key
        }
    }
}

impl From<KeyCode> for KeyBinding {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// Global input an app listens to regardless of focus
pub enum Subscription<Msg> {
    Keyboard { binding: KeyBinding, msg: Msg },
}

impl<Msg> Subscription<Msg> {
    pub fn keyboard(binding: impl Into<KeyBinding>, msg: Msg) -> Self {
        Subscription::Keyboard {
            binding: binding.into(),
            msg,
        }
    }
}
