use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::Theme;

/// Render `[x] Label` or `[ ] Label`
pub fn render_checkbox(frame: &mut Frame, area: Rect, label: &str, checked: bool, focused: bool, theme: &Theme) {
    let checkbox_char = if checked { "x" } else { " " };
    let display_text = format!("[{}] {}", checkbox_char, label);

    let mut text_style = if checked {
        Style::default().fg(theme.accent_primary)
    } else {
        Style::default().fg(theme.text_primary)
    };
    if focused {
        text_style = text_style.bg(theme.highlight_bg);
    }

    frame.render_widget(Paragraph::new(display_text).style(text_style), area);
}

/// Render a one-line radio group: `(*) Add  ( ) Remove  ( ) Count`
pub fn render_radio_group<T: PartialEq + std::fmt::Display>(
    frame: &mut Frame,
    area: Rect,
    options: &[T],
    selected: &T,
    focused: bool,
    theme: &Theme,
) {
    let mut spans = Vec::new();
    for option in options {
        let is_selected = option == selected;
        let marker = if is_selected { "(*)" } else { "( )" };
        let mut style = if is_selected {
            Style::default().fg(theme.accent_primary)
        } else {
            Style::default().fg(theme.text_secondary)
        };
        if focused && is_selected {
            style = style.bg(theme.highlight_bg);
        }
        spans.push(Span::styled(format!("{} {}", marker, option), style));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
