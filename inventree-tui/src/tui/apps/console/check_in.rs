//! Check-In Items tab
//!
//! Each scanned item goes back to its part's default location after a
//! confirmation. Every confirmed check-in is kept as a history row.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    widgets::Paragraph,
};
use std::sync::Arc;

use super::feedback::Feedback;
use super::{Context, button_line, cycle_focus, scan_stock_item};
use crate::api::InventoryApi;
use crate::inventory::{
    CheckInOutcome, CheckInPlan, CheckInRow, InventoryError, RowModel, execute_check_in, prepare_check_in,
};
use crate::tui::modals::{ConfirmAnswer, ConfirmState, render_confirm};
use crate::tui::renderer::{render_model_table, render_text_input};
use crate::tui::widgets::{ModelTable, TableEvent, TextInputEvent, TextInputField};
use crate::tui::{Command, ModalState, Theme};

pub const TABLE_ID: &str = "check-in-items-table";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Items,
    Table,
    Clear,
}

const FOCUS_ORDER: [Focus; 3] = [Focus::Items, Focus::Table, Focus::Clear];

pub enum Msg {
    Prepared(Result<CheckInPlan, InventoryError>),
    CheckedIn(Result<CheckInOutcome, InventoryError>),
}

pub struct State {
    pub focus: Focus,
    pub item_input: TextInputField,
    pub table: ModelTable<CheckInRow>,
    pub confirm: ModalState<ConfirmState<CheckInPlan>>,
}

impl State {
    pub fn new() -> Result<Self, InventoryError> {
        Ok(Self {
            focus: Focus::Items,
            item_input: TextInputField::new(),
            table: ModelTable::new(TABLE_ID, Some("timestamp"))?,
            confirm: ModalState::Closed,
        })
    }
}

async fn plan_check_in(api: Arc<dyn InventoryApi>, barcode: String) -> Result<CheckInPlan, InventoryError> {
    let item = scan_stock_item(api, &barcode).await?;
    prepare_check_in(item).await
}

fn confirm_dialog(plan: CheckInPlan) -> ConfirmState<CheckInPlan> {
    let current = plan
        .previous_location
        .as_ref()
        .map(|l| l.name.as_str())
        .unwrap_or("None");
    let message = format!(
        "{}\n\nCurrent location: {}\nDefault location: {}",
        plan.prompt(),
        current,
        plan.destination.name
    );
    ConfirmState::new(format!("Check-In: {}", plan.item.title_name()), message, plan)
}

fn handle_confirm_key(state: &mut State, key: KeyCode, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    match ConfirmState::<CheckInPlan>::answer(key) {
        None => Command::None,
        Some(ConfirmAnswer::No) => {
            state.confirm.close();
            feedback.set_status("Check-in cancelled");
            Command::None
        }
        Some(ConfirmAnswer::Yes) => {
            let Some(dialog) = state.confirm.take() else {
                return Command::None;
            };
            let api = ctx.api.clone();
            let now = chrono::Local::now().naive_local();
            Command::perform(
                async move { execute_check_in(api.as_ref(), dialog.pending, now).await },
                Msg::CheckedIn,
            )
        }
    }
}

pub fn handle_key(state: &mut State, key: KeyEvent, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    if state.confirm.is_open() {
        return handle_confirm_key(state, key.code, ctx, feedback);
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
                Command::perform(plan_check_in(ctx.api.clone(), barcode), Msg::Prepared)
            }
            event => {
                state.item_input.handle_event(event, None);
                Command::None
            }
        },
        Focus::Table => {
            if let TableEvent::Deleted(row) = state.table.handle_key(key.code) {
                feedback.set_status(format!("Removed {} from history", row.title_name()));
            }
            Command::None
        }
        Focus::Clear => {
            if key.code == KeyCode::Enter {
                state.table.clear();
                feedback.set_status("Cleared History");
            }
            Command::None
        }
    }
}

pub fn update(state: &mut State, msg: Msg, _ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    match msg {
        Msg::Prepared(Ok(plan)) => {
            feedback.say(&format!("Check in {}", plan.part_name));
            state.confirm.open_with(confirm_dialog(plan));
        }
        Msg::Prepared(Err(e @ InventoryError::Validation(_))) => feedback.error_titled("Check-In Error", &e),
        Msg::Prepared(Err(e)) => feedback.error(&e),

        Msg::CheckedIn(Ok(outcome)) => {
            feedback.chime(true);
            feedback.set_status(outcome.message);
            state.table.add(outcome.row);
        }
        Msg::CheckedIn(Err(e)) => feedback.error_titled("Transfer Failed", &e),
    }
    Command::None
}

pub fn view(state: &mut State, frame: &mut Frame, area: Rect, theme: &Theme) {
    let [input_area, table_area, buttons_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)]).areas(area);

    render_text_input(
        frame,
        input_area,
        &state.item_input.value,
        &mut state.item_input.state,
        Some("Scan Items"),
        state.focus == Focus::Items,
        theme,
    );
    render_model_table(frame, table_area, &mut state.table, "Checked In", state.focus == Focus::Table, theme);
    frame.render_widget(
        Paragraph::new(button_line(&[("Clear History", state.focus == Focus::Clear)], theme)),
        buttons_area,
    );

    if let Some(dialog) = state.confirm.data() {
        render_confirm(frame, area, dialog, theme);
    }
}
