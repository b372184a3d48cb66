use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use unicode_width::UnicodeWidthStr;

use crate::inventory::RowModel;
use crate::tui::Theme;
use crate::tui::widgets::ModelTable;

/// Render a model table inside a bordered block titled `title`
pub fn render_model_table<R: RowModel>(
    frame: &mut Frame,
    area: Rect,
    table: &mut ModelTable<R>,
    title: &str,
    focused: bool,
    theme: &Theme,
) {
    let border_style = if focused {
        Style::default().fg(theme.accent_primary)
    } else {
        Style::default().fg(theme.border_secondary)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ({}) ", title, table.len()))
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if table.is_empty() {
        let empty = Paragraph::new(" No rows").style(Style::default().fg(theme.text_secondary));
        frame.render_widget(empty, inner);
        return;
    }

    // Header takes one line
    let body_height = inner.height.saturating_sub(1) as usize;
    table.list.set_viewport_height(body_height);
    table.list.update_scroll(body_height, table.grid().len());

    let headers = table.headers();
    let widths = column_widths(&headers, table.grid().iter().map(|g| g.cells.as_slice()));

    let header = Row::new(headers.iter().map(|h| Cell::from(*h)))
        .style(Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD));

    let selected = table.list.selected();
    let offset = table.list.scroll_offset();
    let rows: Vec<Row> = table
        .grid()
        .iter()
        .enumerate()
        .skip(offset)
        .take(body_height)
        .map(|(i, grid_row)| {
            let style = if Some(i) == selected && focused {
                Style::default().fg(theme.text_primary).bg(theme.highlight_bg)
            } else if Some(i) == selected {
                Style::default().fg(theme.text_primary).add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme.text_primary)
            };
            Row::new(grid_row.cells.iter().map(|c| Cell::from(c.as_str()))).style(style)
        })
        .collect();

    let widget = Table::new(rows, widths).header(header).column_spacing(2);
    frame.render_widget(widget, inner);
}

/// Size each column to its widest cell; the last column takes the rest
fn column_widths<'a>(headers: &[&str], rows: impl Iterator<Item = &'a [String]>) -> Vec<Constraint> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for cells in rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.width());
        }
    }

    let last = widths.len().saturating_sub(1);
    widths
        .into_iter()
        .enumerate()
        .map(|(i, w)| {
            if i == last {
                Constraint::Min(w as u16)
            } else {
                Constraint::Length(w.min(u16::MAX as usize) as u16)
            }
        })
        .collect()
}
