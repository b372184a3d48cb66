use ratatui::{
    Frame,
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::Theme;
use crate::tui::widgets::TextInputState;

/// Render a single-line input with a block cursor when focused
pub fn render_text_input(
    frame: &mut Frame,
    area: Rect,
    value: &str,
    state: &mut TextInputState,
    placeholder: Option<&str>,
    focused: bool,
    theme: &Theme,
) {
    // Minimal padding on both sides
    let visible_width = area.width.saturating_sub(2) as usize;
    state.update_scroll(visible_width);

    let chars: Vec<char> = value.chars().collect();
    let start_idx = state.scroll_offset().min(chars.len());
    let end_idx = (start_idx + visible_width).min(chars.len());
    let visible: &[char] = &chars[start_idx..end_idx];
    let cursor_in_visible = state.cursor().saturating_sub(start_idx);

    let widget = if value.is_empty() && !focused {
        let placeholder_text = format!(" {}", placeholder.unwrap_or_default());
        Paragraph::new(placeholder_text).style(Style::default().fg(theme.border_primary).italic())
    } else if focused && cursor_in_visible <= visible.len() {
        let before: String = visible[..cursor_in_visible].iter().collect();
        let cursor_char = visible
            .get(cursor_in_visible)
            .map(|c| c.to_string())
            .unwrap_or_else(|| " ".to_string());
        let after: String = visible.get(cursor_in_visible + 1..).unwrap_or_default().iter().collect();

        let text_style = Style::default().fg(theme.text_primary);
        let cursor_style = Style::default().fg(theme.text_primary).bg(theme.border_primary);

        let mut spans = vec![Span::raw(" ")];
        if !before.is_empty() {
            spans.push(Span::styled(before, text_style));
        }
        spans.push(Span::styled(cursor_char, cursor_style));
        if !after.is_empty() {
            spans.push(Span::styled(after, text_style));
        }
        Paragraph::new(Line::from(spans))
    } else {
        let text: String = visible.iter().collect();
        Paragraph::new(format!(" {}", text)).style(Style::default().fg(theme.text_primary))
    };

    frame.render_widget(widget, area);
}
