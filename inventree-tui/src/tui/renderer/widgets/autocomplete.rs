use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::text_input::render_text_input;
use crate::tui::Theme;
use crate::tui::widgets::AutocompleteField;

const MAX_DROPDOWN_ROWS: usize = 8;

/// Render an autocomplete input and, when open, its suggestions below it.
/// `bounds` limits how far the dropdown may extend.
pub fn render_autocomplete(
    frame: &mut Frame,
    area: Rect,
    bounds: Rect,
    field: &mut AutocompleteField,
    placeholder: Option<&str>,
    focused: bool,
    theme: &Theme,
) {
    let AutocompleteField { value, state } = field;
    render_text_input(frame, area, value, &mut state.input, placeholder, focused, theme);

    if !focused || !state.is_open() || state.filtered().is_empty() {
        return;
    }

    let options = state.filtered();
    let highlight = state.highlight();
    let space_below = (bounds.y + bounds.height).saturating_sub(area.y + area.height);
    let rows = options.len().min(MAX_DROPDOWN_ROWS) as u16;
    let height = (rows + 2).min(space_below);
    if height < 3 {
        return;
    }

    let dropdown = Rect {
        x: area.x,
        y: area.y + area.height,
        width: area.width,
        height,
    };

    // Keep the highlighted option in view
    let visible = (height - 2) as usize;
    let first = highlight.saturating_sub(visible.saturating_sub(1));
    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .map(|(i, option)| {
            let style = if i == highlight {
                Style::default().fg(theme.text_primary).bg(theme.highlight_bg)
            } else {
                Style::default().fg(theme.text_secondary)
            };
            Line::styled(format!(" {}", option), style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent_primary));
    frame.render_widget(Clear, dropdown);
    frame.render_widget(Paragraph::new(lines).block(block), dropdown);
}
