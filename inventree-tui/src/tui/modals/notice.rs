use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::inventory::InventoryError;
use crate::tui::Theme;
use crate::tui::renderer::popup_area;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A dismissible message box
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

impl From<&InventoryError> for Notice {
    fn from(err: &InventoryError) -> Self {
        Notice::error(err.title(), err.to_string())
    }
}

pub fn render_notice(frame: &mut Frame, area: Rect, notice: &Notice, theme: &Theme) {
    let accent = match notice.kind {
        NoticeKind::Info => theme.accent_primary,
        NoticeKind::Error => theme.accent_error,
    };
    let lines = (notice.message.len() / 50) as u16 + 1;
    let popup = popup_area(area, 60, lines + 5);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", notice.title))
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
        .border_style(Style::default().fg(accent));

    let text = vec![
        Line::raw(""),
        Line::styled(notice.message.clone(), Style::default().fg(theme.text_primary)),
        Line::raw(""),
        Line::styled("Enter/Esc: dismiss", Style::default().fg(theme.text_secondary)),
    ];
    let widget = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(widget, popup);
}
