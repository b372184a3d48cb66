use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::tui::Theme;
use crate::tui::renderer::popup_area;

/// Yes/no question about a pending action `T`
#[derive(Debug, Clone)]
pub struct ConfirmState<T> {
    pub title: String,
    pub message: String,
    pub pending: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAnswer {
    Yes,
    No,
}

impl<T> ConfirmState<T> {
    pub fn new(title: impl Into<String>, message: impl Into<String>, pending: T) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            pending,
        }
    }

    pub fn answer(key: KeyCode) -> Option<ConfirmAnswer> {
        match key {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => Some(ConfirmAnswer::Yes),
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => Some(ConfirmAnswer::No),
            _ => None,
        }
    }
}

pub fn render_confirm<T>(frame: &mut Frame, area: Rect, state: &ConfirmState<T>, theme: &Theme) {
    let popup = popup_area(area, 60, 7);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", state.title))
        .border_style(Style::default().fg(theme.accent_warning));
    let text = vec![
        Line::raw(""),
        Line::styled(state.message.clone(), Style::default().fg(theme.text_primary)),
        Line::raw(""),
        Line::styled("Enter/y: confirm  Esc/n: cancel", Style::default().fg(theme.text_secondary)),
    ];
    frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), popup);
}
