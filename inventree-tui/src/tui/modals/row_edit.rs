//! Row edit dialog
//!
//! Opening snapshots every editable field of a row into a text input.
//! Confirming builds a candidate row from the inputs and hands it to
//! `ModelTable::update_row`; the row is only touched when every input parses
//! and every domain rule passes.

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::inventory::{CellValue, FieldSpec, RowKey, RowModel, UpdateOptions};
use crate::tui::Theme;
use crate::tui::renderer::{popup_area, render_text_input};
use crate::tui::widgets::{EditRequest, ModelTable, TextInputEvent, TextInputField};

/// State for editing a single field of the row
#[derive(Debug, Clone)]
pub struct FieldEditState {
    pub spec: &'static FieldSpec,
    /// Value shown when the dialog opened
    pub original: String,
    pub input: TextInputField,
    pub is_dirty: bool,
}

impl FieldEditState {
    pub fn new(spec: &'static FieldSpec, value: Option<CellValue>) -> Self {
        let original = value.map(|v| v.to_string()).unwrap_or_default();
        let mut input = TextInputField::new();
        input.set_value(original.clone());
        Self {
            spec,
            original,
            input,
            is_dirty: false,
        }
    }

    pub fn update_dirty(&mut self) {
        self.is_dirty = self.input.value() != self.original;
    }

    pub fn label(&self) -> &'static str {
        self.spec.display.unwrap_or(self.spec.name)
    }

    /// Parse the input as the field's declared kind
    pub fn parse_value(&self) -> Result<CellValue, String> {
        CellValue::parse(self.input.value(), self.spec.kind).map_err(|e| format!("{}: {}", self.label(), e))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Row updated and table resynchronized
    Applied,
    /// Dialog stays open showing the reason
    Invalid(String),
    /// Row was removed while the dialog was open
    Vanished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEditAction {
    None,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct RowEditState {
    pub table: &'static str,
    pub key: RowKey,
    pub title: String,
    pub fields: Vec<FieldEditState>,
    pub focused_field_idx: usize,
    pub error: Option<String>,
    pub options: UpdateOptions,
}

impl RowEditState {
    /// Snapshot the editable fields of the requested row
    pub fn open<R: RowModel>(table: &ModelTable<R>, request: &EditRequest) -> Option<Self> {
        let row = table.get(&request.key)?;
        let fields: Vec<FieldEditState> = R::editable_fields()
            .into_iter()
            .map(|spec| FieldEditState::new(spec, row.value(spec.name)))
            .collect();
        if fields.is_empty() {
            return None;
        }

        Some(Self {
            table: request.table,
            key: request.key.clone(),
            title: row.title_name(),
            fields,
            focused_field_idx: 0,
            error: None,
            options: UpdateOptions::validated(),
        })
    }

    pub fn has_changes(&self) -> bool {
        self.fields.iter().any(|f| f.is_dirty)
    }

    pub fn handle_key(&mut self, key: KeyCode) -> RowEditAction {
        match key {
            KeyCode::Esc => RowEditAction::Cancel,
            KeyCode::Enter => RowEditAction::Confirm,
            KeyCode::Up | KeyCode::BackTab => {
                self.focused_field_idx = self.focused_field_idx.saturating_sub(1);
                RowEditAction::None
            }
            KeyCode::Down | KeyCode::Tab => {
                self.focused_field_idx = (self.focused_field_idx + 1).min(self.fields.len().saturating_sub(1));
                RowEditAction::None
            }
            other => {
                if let Some(field) = self.fields.get_mut(self.focused_field_idx) {
                    if let KeyCode::Char(c) = other {
                        if !field.spec.kind.accepts(c) {
                            return RowEditAction::None;
                        }
                    }
                    field.input.handle_event(TextInputEvent::Changed(other), None);
                    field.update_dirty();
                    self.error = None;
                }
                RowEditAction::None
            }
        }
    }

    /// Validate the inputs and apply them to the row in `table`
    pub fn confirm<R: RowModel>(&mut self, table: &mut ModelTable<R>) -> EditOutcome {
        let Some(row) = table.get(&self.key) else {
            return EditOutcome::Vanished;
        };

        let mut candidate = row.clone();
        let mut reasons = Vec::new();
        for field in &self.fields {
            match field.parse_value() {
                Ok(value) => {
                    if let Err(e) = candidate.set_value(field.spec.name, value) {
                        reasons.push(e.to_string());
                    }
                }
                Err(reason) => reasons.push(reason),
            }
        }

        let result = if reasons.is_empty() {
            table
                .update_row(&self.key, &candidate, self.options)
                .map_err(|e| e.to_string())
        } else {
            Err(reasons.join(". "))
        };

        match result {
            Ok(()) => {
                log::debug!("Applied edit to {} in '{}'", self.title, self.table);
                EditOutcome::Applied
            }
            Err(message) => {
                self.error = Some(message.clone());
                EditOutcome::Invalid(message)
            }
        }
    }
}

pub fn render_row_edit(frame: &mut Frame, area: Rect, state: &mut RowEditState, theme: &Theme) {
    let height = state.fields.len() as u16 * 2 + 7;
    let popup = popup_area(area, 64, height);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Edit {}{} ", state.title, if state.has_changes() { " *" } else { "" }))
        .border_style(Style::default().fg(theme.accent_primary));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut constraints: Vec<Constraint> = state.fields.iter().map(|_| Constraint::Length(2)).collect();
    constraints.push(Constraint::Min(2));
    constraints.push(Constraint::Length(1));
    let chunks = Layout::vertical(constraints).split(inner);

    for (i, field) in state.fields.iter_mut().enumerate() {
        let focused = i == state.focused_field_idx;
        let [label_area, input_area] = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(chunks[i]);
        let label_style = if focused {
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_secondary)
        };
        let dirty = if field.is_dirty { " *" } else { "" };
        let label = Line::from(vec![
            Span::styled(field.label(), label_style),
            Span::styled(format!(" ({}){}", field.spec.kind.label(), dirty), Style::default().fg(theme.text_secondary)),
        ]);
        frame.render_widget(Paragraph::new(label), label_area);
        let TextInputField { value, state: input_state } = &mut field.input;
        render_text_input(frame, input_area, value, input_state, None, focused, theme);
    }

    let error_area = chunks[state.fields.len()];
    if let Some(error) = &state.error {
        let error = Paragraph::new(error.as_str())
            .style(Style::default().fg(theme.accent_error))
            .wrap(Wrap { trim: true });
        frame.render_widget(error, error_area);
    }

    let help = Paragraph::new("Enter: save  Esc: cancel  Up/Down: field").style(Style::default().fg(theme.text_secondary));
    frame.render_widget(help, chunks[state.fields.len() + 1]);
}
