//! Stock Operations tab
//!
//! Scan an item, pick add/remove/count and enter an amount. The table below
//! lists recent stock history, newest first, with part names filled in as
//! they load.

use chrono::NaiveDateTime;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::sync::Arc;

use super::feedback::Feedback;
use super::{Context, cycle_focus, scan_stock_item};
use crate::api::InventoryApi;
use crate::inventory::row::format_quantity;
use crate::inventory::{
    AdjustMethod, CachedStockItem, HistoryFetcher, InventoryError, RowKey, RowModel, TrackingRow, UpdateOptions,
    adjust_item, parse_amount,
};
use crate::tui::renderer::{popup_area, render_model_table, render_radio_group, render_text_input};
use crate::tui::widgets::{ModelTable, TextInputEvent, TextInputField};
use crate::tui::{Command, ModalState, Theme};

pub const TABLE_ID: &str = "stock-tracking-table";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Items,
    Method,
    Table,
}

const FOCUS_ORDER: [Focus; 3] = [Focus::Items, Focus::Method, Focus::Table];

pub enum Msg {
    ItemScanned(Result<(Arc<CachedStockItem>, String), InventoryError>),
    Adjusted(Result<String, InventoryError>),
    HistoryFetched(Result<Vec<TrackingRow>, String>),
    PartNameLoaded { key: RowKey, result: Result<String, String> },
}

/// Amount entry for one scanned item
pub struct AdjustDialog {
    pub item: Arc<CachedStockItem>,
    pub part_name: String,
    pub method: AdjustMethod,
    pub amount: TextInputField,
    pub error: Option<String>,
}

impl AdjustDialog {
    pub fn new(item: Arc<CachedStockItem>, part_name: String, method: AdjustMethod) -> Self {
        let mut amount = TextInputField::new();
        amount.set_value(format_quantity(method.default_amount(item.original_quantity())));
        let mut dialog = Self {
            item,
            part_name,
            method,
            amount,
            error: None,
        };
        dialog.revalidate();
        dialog
    }

    pub fn title(&self) -> String {
        format!("Adjust Stock: {} ({})", self.item.title_name(), self.part_name)
    }

    fn parsed(&self) -> Result<f64, String> {
        parse_amount(self.amount.value(), self.method, self.item.original_quantity()).map_err(|e| e.to_string())
    }

    fn revalidate(&mut self) {
        self.error = self.parsed().err();
    }

    pub fn can_confirm(&self) -> bool {
        self.error.is_none()
    }
}

pub struct State {
    pub focus: Focus,
    pub item_input: TextInputField,
    pub method: AdjustMethod,
    pub table: ModelTable<TrackingRow>,
    pub dialog: ModalState<AdjustDialog>,

    history: HistoryFetcher,
    /// History older than the lookback window measured from here is never shown
    opened_at: NaiveDateTime,
    fetching: bool,
    refetch_pending: bool,
}

impl State {
    pub fn new(ctx: &Context) -> Result<Self, InventoryError> {
        let tab = &ctx.config.stock_ops_tab;
        Ok(Self {
            focus: Focus::Items,
            item_input: TextInputField::new(),
            method: AdjustMethod::default(),
            table: ModelTable::new(TABLE_ID, Some("pk"))?.allow_delete(false),
            dialog: ModalState::Closed,
            history: HistoryFetcher::new(
                ctx.api.clone(),
                ctx.limiter.clone(),
                tab.history_chunk_size,
                ctx.config.history_lookback(),
            ),
            opened_at: chrono::Local::now().naive_local(),
            fetching: false,
            refetch_pending: false,
        })
    }

    fn most_recent_pk(&self) -> Option<i64> {
        self.table.rows().map(|row| row.pk()).max()
    }
}

fn method_phrase(method: AdjustMethod) -> &'static str {
    match method {
        AdjustMethod::Add => "Adding to",
        AdjustMethod::Remove => "Removing from",
        AdjustMethod::Count => "Counting",
    }
}

/// Load history newer than what is shown. A request made while one is in
/// flight runs once the current one finishes.
pub fn refresh_history(state: &mut State) -> Command<Msg> {
    if state.fetching {
        state.refetch_pending = true;
        return Command::None;
    }
    state.fetching = true;

    let history = state.history.clone();
    let most_recent = state.most_recent_pk();
    let since = state.opened_at;
    Command::perform(
        async move {
            history
                .fetch_recent(most_recent, since)
                .await
                .map_err(|e| format!("{:#}", e))
        },
        Msg::HistoryFetched,
    )
}

fn load_part_name(history: HistoryFetcher, key: RowKey, stock_pk: i64) -> Command<Msg> {
    Command::perform(
        async move { history.load_part_name(stock_pk).await.map_err(|e| format!("{:#}", e)) },
        move |result| Msg::PartNameLoaded { key, result },
    )
}

async fn scan_with_part(
    api: Arc<dyn InventoryApi>,
    barcode: String,
) -> Result<(Arc<CachedStockItem>, String), InventoryError> {
    let item = scan_stock_item(api, &barcode).await?;
    let part_name = item.part().await?.name.clone();
    Ok((item, part_name))
}

fn handle_dialog_key(state: &mut State, key: KeyCode, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    let Some(dialog) = state.dialog.data_mut() else {
        return Command::None;
    };

    match key {
        KeyCode::Esc => {
            state.dialog.close();
            feedback.set_status("Adjustment cancelled");
            Command::None
        }
        KeyCode::Enter => {
            let amount = match dialog.parsed() {
                Ok(amount) => amount,
                Err(reason) => {
                    log::debug!("Confirm disabled: {}", reason);
                    return Command::None;
                }
            };
            let Some(dialog) = state.dialog.take() else {
                return Command::None;
            };
            let api = ctx.api.clone();
            Command::perform(
                async move { adjust_item(api.as_ref(), &dialog.item, dialog.method, amount).await },
                Msg::Adjusted,
            )
        }
        other => {
            dialog.amount.handle_event(TextInputEvent::Changed(other), None);
            dialog.revalidate();
            Command::None
        }
    }
}

pub fn handle_key(state: &mut State, key: KeyEvent, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    if state.dialog.is_open() {
        return handle_dialog_key(state, key.code, ctx, feedback);
    }

    match key.code {
        KeyCode::Tab => {
            state.focus = cycle_focus(&FOCUS_ORDER, state.focus, true);
            return Command::None;
        }
        KeyCode::BackTab => {
            state.focus = cycle_focus(&FOCUS_ORDER, state.focus, false);
            return Command::None;
        }
        _ => {}
    }

    match state.focus {
        Focus::Items => match TextInputEvent::from_key(key.code) {
            TextInputEvent::Submit => {
                let barcode = state.item_input.take();
                if barcode.trim().is_empty() {
                    return Command::None;
                }
                Command::perform(scan_with_part(ctx.api.clone(), barcode), Msg::ItemScanned)
            }
            event => {
                state.item_input.handle_event(event, None);
                Command::None
            }
        },
        Focus::Method => {
            let current = AdjustMethod::ALL.iter().position(|m| *m == state.method).unwrap_or(0);
            let len = AdjustMethod::ALL.len();
            let next = match key.code {
                KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => (current + 1) % len,
                KeyCode::Left | KeyCode::Up => (current + len - 1) % len,
                _ => current,
            };
            state.method = AdjustMethod::ALL[next];
            Command::None
        }
        Focus::Table => {
            state.table.handle_key(key.code);
            Command::None
        }
    }
}

pub fn update(state: &mut State, msg: Msg, _ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    match msg {
        Msg::ItemScanned(Ok((item, part_name))) => {
            feedback.say(&format!("{} {}", method_phrase(state.method), part_name));
            state.dialog.open_with(AdjustDialog::new(item, part_name, state.method));
            Command::None
        }
        Msg::ItemScanned(Err(e)) => {
            feedback.error(&e);
            Command::None
        }

        Msg::Adjusted(Ok(message)) => {
            feedback.chime(true);
            feedback.set_status(message);
            refresh_history(state)
        }
        Msg::Adjusted(Err(e)) => {
            feedback.error(&e);
            Command::None
        }

        Msg::HistoryFetched(result) => {
            state.fetching = false;
            let mut commands = Vec::new();
            match result {
                Ok(rows) => {
                    for row in rows {
                        let key = row.row_key();
                        let stock_pk = row.stock_pk();
                        if state.table.add(row) {
                            commands.push(load_part_name(state.history.clone(), key, stock_pk));
                        }
                    }
                }
                Err(e) => log::warn!("Failed to fetch stock history: {}", e),
            }
            if std::mem::take(&mut state.refetch_pending) {
                commands.push(refresh_history(state));
            }
            Command::batch(commands)
        }

        Msg::PartNameLoaded { key, result } => {
            match result {
                Ok(name) => {
                    let Some(named) = state.table.get(&key).map(|row| row.with_part_name(name)) else {
                        return Command::None;
                    };
                    if let Err(e) = state.table.update_row(&key, &named, UpdateOptions::unchecked()) {
                        log::warn!("Failed to apply part name: {}", e);
                    }
                }
                Err(e) => log::warn!("{}", e),
            }
            Command::None
        }
    }
}

pub fn view(state: &mut State, frame: &mut Frame, area: Rect, theme: &Theme) {
    let [input_area, method_area, table_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(3)]).areas(area);

    render_text_input(
        frame,
        input_area,
        &state.item_input.value,
        &mut state.item_input.state,
        Some("Scan Items"),
        state.focus == Focus::Items,
        theme,
    );
    render_radio_group(
        frame,
        method_area,
        &AdjustMethod::ALL,
        &state.method,
        state.focus == Focus::Method,
        theme,
    );
    render_model_table(frame, table_area, &mut state.table, "Recent History", state.focus == Focus::Table, theme);

    if let Some(dialog) = state.dialog.data_mut() {
        render_adjust_dialog(frame, area, dialog, theme);
    }
}

fn render_adjust_dialog(frame: &mut Frame, area: Rect, dialog: &mut AdjustDialog, theme: &Theme) {
    let popup = popup_area(area, 64, 9);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent_primary))
        .title(format!(" {} ", dialog.title()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [info_area, _, input_area, error_area, hint_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let info = vec![
        Line::from(vec![
            Span::styled("Method: ", Style::default().fg(theme.text_secondary)),
            Span::styled(dialog.method.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("In stock: ", Style::default().fg(theme.text_secondary)),
            Span::raw(format_quantity(dialog.item.original_quantity())),
        ]),
    ];
    frame.render_widget(Paragraph::new(info), info_area);

    render_text_input(
        frame,
        input_area,
        &dialog.amount.value,
        &mut dialog.amount.state,
        Some("Amount"),
        true,
        theme,
    );

    if let Some(error) = &dialog.error {
        frame.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(theme.accent_error)),
            error_area,
        );
    }

    let confirm_style = if dialog.can_confirm() {
        Style::default().fg(theme.accent_success)
    } else {
        Style::default().fg(theme.border_secondary)
    };
    let hint = Line::from(vec![
        Span::styled("Enter", confirm_style.add_modifier(Modifier::BOLD)),
        Span::styled(" confirm  ", confirm_style),
        Span::styled("Esc", Style::default().fg(theme.text_secondary).add_modifier(Modifier::BOLD)),
        Span::styled(" cancel", Style::default().fg(theme.text_secondary)),
    ]);
    frame.render_widget(Paragraph::new(hint), hint_area);
}
