//! Status line, notices and operator cues
//!
//! Tabs report what happened through `Feedback` instead of drawing anything
//! themselves. Spoken phrases and chimes are only logged.

use crate::inventory::InventoryError;
use crate::tui::ModalState;
use crate::tui::modals::Notice;

#[derive(Debug, Default)]
pub struct Feedback {
    status: String,
    pub notice: ModalState<Notice>,
    sound_enabled: bool,
    tts_enabled: bool,
}

impl Feedback {
    pub fn new(sound_enabled: bool, tts_enabled: bool) -> Self {
        Self {
            status: String::new(),
            notice: ModalState::Closed,
            sound_enabled,
            tts_enabled,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        log::info!("Status: {}", self.status);
    }

    /// Show a dismissible notice and mirror it in the status line
    pub fn notify(&mut self, notice: Notice) {
        self.set_status(notice.message.replace('\n', " "));
        self.notice.open_with(notice);
    }

    pub fn error(&mut self, err: &InventoryError) {
        log::warn!("{}: {}", err.title(), err);
        self.chime(false);
        self.notify(Notice::from(err));
    }

    /// Report `err` under a heading chosen by the caller
    pub fn error_titled(&mut self, title: &str, err: &InventoryError) {
        log::warn!("{}: {}", title, err);
        self.chime(false);
        self.notify(Notice::error(title, err.to_string()));
    }

    pub fn dismiss(&mut self) {
        self.notice.close();
    }

    pub fn say(&self, phrase: &str) {
        if self.tts_enabled {
            log::debug!("Speak: {}", phrase);
        }
    }

    pub fn chime(&self, success: bool) {
        if self.sound_enabled {
            log::debug!("Chime: {}", if success { "success" } else { "failure" });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::error::ValidationError;

    #[test]
    fn test_error_opens_notice_with_title() {
        let mut feedback = Feedback::new(false, false);
        feedback.error(&ValidationError::single("Destination not set.").into());

        let notice = feedback.notice.data().unwrap();
        assert_eq!(notice.title, "Invalid Input");
        assert_eq!(feedback.status(), "Destination not set.");

        feedback.dismiss();
        assert!(!feedback.notice.is_open());
    }
}
