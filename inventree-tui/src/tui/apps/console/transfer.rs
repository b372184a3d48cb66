//! Transfer Items tab
//!
//! Pick a destination (scan or search), scan stock items into the table,
//! optionally edit quantities, then move everything with one transfer.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::sync::Arc;

use super::feedback::Feedback;
use super::{Context, button_line, cycle_focus, scan_stock_item};
use crate::api::{InventoryApi, ModelType, ScannedObject, StockLocation, scan_barcode};
use crate::inventory::{
    InventoryError, RowModel, TransferOptions, TransferRow, location_path, transfer_items,
};
use crate::tui::modals::{EditOutcome, Notice, RowEditAction, RowEditState, render_row_edit};
use crate::tui::renderer::{render_autocomplete, render_checkbox, render_model_table, render_text_input};
use crate::tui::widgets::{
    AutocompleteEvent, AutocompleteField, AutocompleteOutcome, ModelTable, TableEvent, TextInputEvent,
    TextInputField,
};
use crate::tui::{Command, ModalState, Theme};

pub const TABLE_ID: &str = "transfer-items-table";

/// Shortest query sent to the location search
const MIN_SEARCH_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Destination,
    Items,
    SetDefault,
    Table,
    Done,
    Cancel,
}

const FOCUS_ORDER: [Focus; 6] = [
    Focus::Destination,
    Focus::Items,
    Focus::SetDefault,
    Focus::Table,
    Focus::Done,
    Focus::Cancel,
];

pub enum Msg {
    // Destination
    LocationsFound {
        seq: u64,
        result: Result<Vec<StockLocation>, String>,
    },
    DestinationScanned(Result<StockLocation, InventoryError>),
    DestinationPathLoaded {
        pk: i64,
        result: Result<String, String>,
    },

    // Items
    ItemScanned(Result<TransferRow, InventoryError>),

    // Submission
    Transferred(Result<String, InventoryError>),
}

pub struct State {
    pub focus: Focus,

    // Destination
    pub destination_input: AutocompleteField,
    location_results: Vec<StockLocation>,
    search_seq: u64,
    pub destination: Option<StockLocation>,
    destination_path: Option<String>,

    // Items
    pub item_input: TextInputField,
    pub set_default_location: bool,
    pub table: ModelTable<TransferRow>,

    // Modals
    pub edit: ModalState<RowEditState>,

    pub submitting: bool,
}

impl State {
    pub fn new() -> Result<Self, InventoryError> {
        Ok(Self {
            focus: Focus::Destination,
            destination_input: AutocompleteField::new(),
            location_results: Vec::new(),
            search_seq: 0,
            destination: None,
            destination_path: None,
            item_input: TextInputField::new(),
            set_default_location: false,
            table: ModelTable::new(TABLE_ID, Some("part_name"))?.editable(true),
            edit: ModalState::Closed,
            submitting: false,
        })
    }

    fn location_labels(&self) -> Vec<String> {
        self.location_results.iter().map(location_label).collect()
    }

    fn destination_text(&self) -> String {
        match (&self.destination, &self.destination_path) {
            (None, _) => "None".to_string(),
            (Some(location), Some(path)) => format!("{} ({})", location.name, path),
            (Some(location), None) => location.name.clone(),
        }
    }
}

fn location_label(location: &StockLocation) -> String {
    location.pathstring.clone().unwrap_or_else(|| location.name.clone())
}

fn set_destination(state: &mut State, location: StockLocation, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    feedback.say(&format!("Destination set to {}", location.name));
    feedback.set_status(format!("Destination set to {}", location.name));

    state.destination_input.clear();
    state.destination_path = None;
    state.focus = Focus::Items;

    let api = ctx.api.clone();
    let pk = location.pk;
    let target = location.clone();
    state.destination = Some(location);
    Command::perform(
        async move { location_path(api.as_ref(), &target).await.map_err(|e| e.to_string()) },
        move |result| Msg::DestinationPathLoaded { pk, result },
    )
}

fn search_locations(state: &mut State, ctx: &Context) -> Command<Msg> {
    let query = state.destination_input.value().trim().to_string();
    if query.chars().count() < MIN_SEARCH_LEN {
        return Command::None;
    }
    state.search_seq += 1;
    let seq = state.search_seq;
    let api = ctx.api.clone();
    Command::perform(
        async move { api.search_locations(&query).await.map_err(|e| e.to_string()) },
        move |result| Msg::LocationsFound { seq, result },
    )
}

/// Typed text that is not a search result is treated as a barcode
fn choose_destination(state: &mut State, chosen: String, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    if let Some(location) = state
        .location_results
        .iter()
        .find(|l| location_label(l) == chosen)
        .cloned()
    {
        return set_destination(state, location, ctx, feedback);
    }

    if chosen.trim().is_empty() {
        return Command::None;
    }
    let api = ctx.api.clone();
    Command::perform(scan_location(api, chosen), Msg::DestinationScanned)
}

async fn scan_location(api: Arc<dyn InventoryApi>, barcode: String) -> Result<StockLocation, InventoryError> {
    match scan_barcode(api.as_ref(), &barcode, &[ModelType::StockLocation]).await? {
        ScannedObject::StockLocation(location) => Ok(location),
        other => Err(InventoryError::ScanOrSearch(format!("Not a stock location: {:?}", other))),
    }
}

async fn load_row(api: Arc<dyn InventoryApi>, barcode: String) -> Result<TransferRow, InventoryError> {
    let item = scan_stock_item(api, &barcode).await?;
    Ok(TransferRow::load(item).await?)
}

fn scan_item(state: &mut State, ctx: &Context) -> Command<Msg> {
    let barcode = state.item_input.take();
    if barcode.trim().is_empty() {
        return Command::None;
    }
    let api = ctx.api.clone();
    Command::perform(load_row(api, barcode), Msg::ItemScanned)
}

fn submit(state: &mut State, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    if state.submitting {
        return Command::None;
    }

    let mut errors = Vec::new();
    if state.table.is_empty() {
        errors.push("No items have been scanned yet.");
        state.focus = Focus::Items;
    }
    if state.destination.is_none() {
        errors.push("Destination not set.");
        state.focus = Focus::Destination;
    }
    let Some(destination) = state.destination.clone().filter(|_| errors.is_empty()) else {
        feedback.chime(false);
        feedback.notify(Notice::error("Submission Error", errors.join("\n")));
        feedback.set_status(format!("Error: {}", errors.join(" ")));
        return Command::None;
    };

    let items: Vec<_> = state.table.rows().map(|row| Arc::clone(row.item())).collect();
    let options = TransferOptions {
        set_default_location: state.set_default_location,
    };
    state.submitting = true;
    feedback.set_status(format!("Transferring {} item(s)...", items.len()));

    let api = ctx.api.clone();
    Command::perform(
        async move { transfer_items(api.as_ref(), &items, &destination, options).await },
        Msg::Transferred,
    )
}

fn handle_edit_key(state: &mut State, key: KeyCode, feedback: &mut Feedback) {
    let Some(edit) = state.edit.data_mut() else { return };
    match edit.handle_key(key) {
        RowEditAction::None => {}
        RowEditAction::Cancel => state.edit.close(),
        RowEditAction::Confirm => match edit.confirm(&mut state.table) {
            EditOutcome::Applied => {
                feedback.set_status(format!("Updated {}", edit.title));
                state.edit.close();
            }
            EditOutcome::Invalid(reason) => log::debug!("Edit rejected: {}", reason),
            EditOutcome::Vanished => state.edit.close(),
        },
    }
}

pub fn handle_key(state: &mut State, key: KeyEvent, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    if state.edit.is_open() {
        handle_edit_key(state, key.code, feedback);
        return Command::None;
    }

    let dropdown_open = state.focus == Focus::Destination && state.destination_input.is_open();
    match key.code {
        KeyCode::Tab if !dropdown_open => {
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
        Focus::Destination => {
            let event = AutocompleteEvent::from_key(key.code, dropdown_open);
            let labels = state.location_labels();
            match state.destination_input.handle_event(event, &labels) {
                AutocompleteOutcome::Unchanged => Command::None,
                AutocompleteOutcome::Edited => search_locations(state, ctx),
                AutocompleteOutcome::Chosen(chosen) => choose_destination(state, chosen, ctx, feedback),
            }
        }
        Focus::Items => match TextInputEvent::from_key(key.code) {
            TextInputEvent::Submit => scan_item(state, ctx),
            event => {
                state.item_input.handle_event(event, None);
                Command::None
            }
        },
        Focus::SetDefault => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                state.set_default_location = !state.set_default_location;
            }
            Command::None
        }
        Focus::Table => {
            match state.table.handle_key(key.code) {
                TableEvent::EditRequested(request) => {
                    if let Some(edit) = RowEditState::open(&state.table, &request) {
                        state.edit.open_with(edit);
                    }
                }
                TableEvent::Deleted(row) => {
                    feedback.set_status(format!("Removed {}", row.title_name()));
                }
                TableEvent::Navigated | TableEvent::Ignored => {}
            }
            Command::None
        }
        Focus::Done if key.code == KeyCode::Enter => submit(state, ctx, feedback),
        Focus::Cancel if key.code == KeyCode::Enter => {
            state.table.clear();
            feedback.set_status("Transfer cancelled");
            Command::None
        }
        Focus::Done | Focus::Cancel => Command::None,
    }
}

pub fn update(state: &mut State, msg: Msg, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    match msg {
        Msg::LocationsFound { seq, result } => {
            // A newer search is already in flight
            if seq != state.search_seq {
                return Command::None;
            }
            match result {
                Ok(locations) => {
                    state.location_results = locations;
                    let labels = state.location_labels();
                    state.destination_input.refresh_options(&labels);
                }
                Err(e) => log::warn!("Location search failed: {}", e),
            }
            Command::None
        }

        Msg::DestinationScanned(Ok(location)) => set_destination(state, location, ctx, feedback),
        Msg::DestinationScanned(Err(e)) => {
            feedback.error(&e);
            Command::None
        }

        Msg::DestinationPathLoaded { pk, result } => {
            if state.destination.as_ref().map(|l| l.pk) != Some(pk) {
                return Command::None;
            }
            match result {
                Ok(path) => state.destination_path = Some(path),
                Err(e) => log::warn!("Failed to resolve path of location #{}: {}", pk, e),
            }
            Command::None
        }

        Msg::ItemScanned(Ok(row)) => {
            let part_name = row.part_name().to_string();
            if state.table.add(row) {
                feedback.say(&format!("Added {}", part_name));
                feedback.chime(true);
                feedback.set_status(format!("Added {}", part_name));
            } else {
                feedback.say("Item has already been added");
                feedback.chime(false);
                feedback.set_status("Item has already been added");
            }
            Command::None
        }
        Msg::ItemScanned(Err(e)) => {
            feedback.error(&e);
            Command::None
        }

        Msg::Transferred(result) => {
            state.submitting = false;
            match result {
                Ok(message) => {
                    feedback.chime(true);
                    feedback.set_status(message);
                    state.table.clear();
                }
                Err(e) => feedback.error(&e),
            }
            Command::None
        }
    }
}

pub fn view(state: &mut State, frame: &mut Frame, area: Rect, theme: &Theme) {
    let [destination_area, label_area, items_area, options_area, table_area, buttons_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let label = Line::from(vec![
        Span::styled("Destination: ", Style::default().fg(theme.text_secondary)),
        Span::styled(
            state.destination_text(),
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(label), label_area);

    render_text_input(
        frame,
        items_area,
        &state.item_input.value,
        &mut state.item_input.state,
        Some("Scan Items"),
        state.focus == Focus::Items,
        theme,
    );
    render_checkbox(
        frame,
        options_area,
        "Set as default location",
        state.set_default_location,
        state.focus == Focus::SetDefault,
        theme,
    );
    render_model_table(frame, table_area, &mut state.table, "Items", state.focus == Focus::Table, theme);
    frame.render_widget(
        Paragraph::new(button_line(
            &[("Done", state.focus == Focus::Done), ("Cancel", state.focus == Focus::Cancel)],
            theme,
        )),
        buttons_area,
    );

    // Drawn last so the dropdown overlays the rows below
    render_autocomplete(
        frame,
        destination_area,
        area,
        &mut state.destination_input,
        Some("Scan Location Barcode"),
        state.focus == Focus::Destination,
        theme,
    );

    if let Some(edit) = state.edit.data_mut() {
        render_row_edit(frame, area, edit, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeInventory;
    use crate::api::{Part, StockItem};
    use crate::inventory::CachedStockItem;
    use crate::tui::command::collect_messages;
    use crossterm::event::KeyModifiers;

    fn location(pk: i64, name: &str) -> StockLocation {
        StockLocation { pk, name: name.to_string(), description: None, parent: None, pathstring: None }
    }

    fn setup() -> (Arc<FakeInventory>, Context, Feedback, State) {
        let fake = Arc::new(FakeInventory::new());
        fake.insert_part(Part {
            pk: 1,
            name: "Bolt".to_string(),
            description: None,
            default_location: None,
            in_stock: None,
        });
        fake.insert_location(location(10, "Bench"));
        fake.insert_location(location(20, "Bin 3"));
        fake.insert_stock_item(StockItem { pk: 5, part: 1, quantity: 10.0, location: Some(10), serial: None });
        fake.register_barcode("ITEM-5", serde_json::json!({"stockitem": {"pk": 5}}));
        fake.register_barcode("LOC-20", serde_json::json!({"stocklocation": {"pk": 20}}));
        let ctx = Context::for_tests(fake.clone());
        (fake, ctx, Feedback::new(false, false), State::new().unwrap())
    }

    fn row(fake: &Arc<FakeInventory>, pk: i64) -> TransferRow {
        let item = StockItem { pk, part: 1, quantity: 10.0, location: Some(10), serial: None };
        TransferRow::new(Arc::new(CachedStockItem::new(item, fake.clone())), "Bolt".to_string(), "Bench".to_string())
    }

    fn press(state: &mut State, code: KeyCode, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE), ctx, feedback)
    }

    fn type_text(state: &mut State, text: &str, ctx: &Context, feedback: &mut Feedback) {
        for c in text.chars() {
            let _ = press(state, KeyCode::Char(c), ctx, feedback);
        }
    }

    #[test]
    fn test_done_without_items_or_destination() {
        let (_fake, ctx, mut feedback, mut state) = setup();
        state.focus = Focus::Done;
        let command = press(&mut state, KeyCode::Enter, &ctx, &mut feedback);

        assert!(command.is_none());
        let notice = feedback.notice.data().unwrap();
        assert_eq!(notice.title, "Submission Error");
        assert_eq!(notice.message, "No items have been scanned yet.\nDestination not set.");
        assert_eq!(feedback.status(), "Error: No items have been scanned yet. Destination not set.");
        assert_eq!(state.focus, Focus::Destination);
    }

    #[tokio::test]
    async fn test_scan_item_adds_row_once() {
        let (_fake, ctx, mut feedback, mut state) = setup();
        state.focus = Focus::Items;

        for expected in ["Added Bolt", "Item has already been added"] {
            type_text(&mut state, "ITEM-5", &ctx, &mut feedback);
            let command = press(&mut state, KeyCode::Enter, &ctx, &mut feedback);
            for msg in collect_messages(command).await {
                let _ = update(&mut state, msg, &ctx, &mut feedback);
            }
            assert_eq!(feedback.status(), expected);
        }
        assert_eq!(state.table.len(), 1);
        assert_eq!(state.item_input.value(), "");
    }

    #[tokio::test]
    async fn test_destination_barcode_sets_destination_and_path() {
        let (_fake, ctx, mut feedback, mut state) = setup();
        type_text(&mut state, "LOC-20", &ctx, &mut feedback);
        let command = press(&mut state, KeyCode::Enter, &ctx, &mut feedback);

        let mut pending = collect_messages(command).await;
        while let Some(msg) = pending.pop() {
            let next = update(&mut state, msg, &ctx, &mut feedback);
            pending.extend(collect_messages(next).await);
        }
        assert_eq!(state.destination.as_ref().map(|l| l.pk), Some(20));
        assert_eq!(state.destination_text(), "Bin 3 (Bin 3)");
        assert_eq!(state.focus, Focus::Items);
    }

    #[tokio::test]
    async fn test_stale_location_results_are_dropped() {
        let (_fake, ctx, mut feedback, mut state) = setup();
        state.search_seq = 2;
        let _ = update(
            &mut state,
            Msg::LocationsFound { seq: 1, result: Ok(vec![location(20, "Bin 3")]) },
            &ctx,
            &mut feedback,
        );
        assert!(state.location_results.is_empty());
    }

    #[tokio::test]
    async fn test_successful_transfer_clears_table() {
        let (fake, ctx, mut feedback, mut state) = setup();
        state.table.add(row(&fake, 5));
        state.destination = Some(location(20, "Bin 3"));
        state.focus = Focus::Done;

        let command = press(&mut state, KeyCode::Enter, &ctx, &mut feedback);
        for msg in collect_messages(command).await {
            let _ = update(&mut state, msg, &ctx, &mut feedback);
        }
        assert_eq!(feedback.status(), "Transferred 1 item to Bin 3");
        assert!(state.table.is_empty());
        assert_eq!(fake.adjustments().len(), 1);
    }

    #[tokio::test]
    async fn test_default_location_failure_still_clears_table() {
        let (fake, ctx, mut feedback, mut state) = setup();
        fake.fail_next("set_default_location", 1);
        state.table.add(row(&fake, 5));
        state.destination = Some(location(20, "Bin 3"));
        state.set_default_location = true;
        state.focus = Focus::Done;

        let command = press(&mut state, KeyCode::Enter, &ctx, &mut feedback);
        for msg in collect_messages(command).await {
            let _ = update(&mut state, msg, &ctx, &mut feedback);
        }
        assert_eq!(fake.adjustments().len(), 1);
        assert!(state.table.is_empty());
        assert!(!feedback.notice.is_open());
        assert_eq!(
            feedback.status(),
            "Transferred 1 item to Bin 3 (default location not updated for part #1)"
        );
    }

    #[tokio::test]
    async fn test_rejected_transfer_keeps_table() {
        let (fake, ctx, mut feedback, mut state) = setup();
        fake.reject_adjustments("Location is structural");
        state.table.add(row(&fake, 5));
        state.destination = Some(location(20, "Bin 3"));
        state.focus = Focus::Done;

        let command = press(&mut state, KeyCode::Enter, &ctx, &mut feedback);
        for msg in collect_messages(command).await {
            let _ = update(&mut state, msg, &ctx, &mut feedback);
        }
        assert_eq!(state.table.len(), 1);
        assert!(feedback.notice.is_open());
        assert!(!state.submitting);
    }

    #[test]
    fn test_cancel_clears_table() {
        let (fake, ctx, mut feedback, mut state) = setup();
        state.table.add(row(&fake, 5));
        state.focus = Focus::Cancel;
        let _ = press(&mut state, KeyCode::Enter, &ctx, &mut feedback);
        assert!(state.table.is_empty());
    }

    #[test]
    fn test_enter_on_table_opens_edit_dialog() {
        let (fake, ctx, mut feedback, mut state) = setup();
        state.table.add(row(&fake, 5));
        state.focus = Focus::Table;
        let _ = press(&mut state, KeyCode::Enter, &ctx, &mut feedback);
        assert!(state.edit.is_open());

        let _ = press(&mut state, KeyCode::Esc, &ctx, &mut feedback);
        assert!(!state.edit.is_open());
    }
}
