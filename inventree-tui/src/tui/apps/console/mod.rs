//! Operator console
//!
//! Four tabs (Transfer Items, Check-In Items, Stock Operations, Part Search)
//! sharing one status line and one notice overlay. Tabs own their state and
//! messages; this module routes keys to the active tab and wraps each tab's
//! messages in its own.

pub mod check_in;
pub mod feedback;
pub mod part_search;
pub mod stock_ops;
pub mod transfer;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use semver::Version;
use std::sync::Arc;

use crate::api::resilience::{ConcurrencyConfig, ConcurrencyLimiter};
use crate::api::{InventoryApi, ModelType, ScannedObject, scan_barcode};
use crate::config::Config;
use crate::inventory::{CachedStockItem, InventoryError};
use crate::tui::modals::render_notice;
use crate::tui::{App, Command, KeyBinding, Subscription, Theme};
use feedback::Feedback;

/// What every tab needs to reach the server and read settings
#[derive(Clone)]
pub struct Context {
    pub api: Arc<dyn InventoryApi>,
    pub config: Arc<Config>,
    /// Bounds background lookups (part names, stock locations) across tabs
    pub limiter: ConcurrencyLimiter,
}

impl Context {
    pub fn new(api: Arc<dyn InventoryApi>, config: Config) -> Self {
        Self {
            api,
            config: Arc::new(config),
            limiter: ConcurrencyLimiter::new(ConcurrencyConfig::default()),
        }
    }

    #[cfg(test)]
    pub fn for_tests(api: Arc<dyn InventoryApi>) -> Self {
        Self::new(api, Config::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Transfer,
    CheckIn,
    StockOps,
    PartSearch,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Transfer, Tab::CheckIn, Tab::StockOps, Tab::PartSearch];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Transfer => "Transfer Items",
            Tab::CheckIn => "Check-In Items",
            Tab::StockOps => "Stock Operations",
            Tab::PartSearch => "Part Search",
        }
    }

    fn key(&self) -> KeyCode {
        let n = Tab::ALL.iter().position(|t| t == self).unwrap_or(0) as u8;
        KeyCode::F(n + 1)
    }
}

pub enum Msg {
    SwitchTab(Tab),
    Quit,
    Key(KeyEvent),
    DismissNotice,
    UpdateChecked(Result<Option<Version>, String>),

    Transfer(transfer::Msg),
    CheckIn(check_in::Msg),
    StockOps(stock_ops::Msg),
    PartSearch(part_search::Msg),
}

pub struct State {
    pub ctx: Context,
    pub tab: Tab,
    pub feedback: Feedback,
    pub transfer: transfer::State,
    pub check_in: check_in::State,
    pub stock_ops: stock_ops::State,
    pub part_search: part_search::State,
    pub newer_version: Option<Version>,
    theme: Theme,
}

impl State {
    /// Fails when a table is misconfigured
    pub fn new(ctx: Context) -> Result<Self, InventoryError> {
        Ok(Self {
            feedback: Feedback::new(ctx.config.sound_enabled, ctx.config.tts_enabled),
            transfer: transfer::State::new()?,
            check_in: check_in::State::new()?,
            stock_ops: stock_ops::State::new(&ctx)?,
            part_search: part_search::State::new(),
            tab: Tab::default(),
            newer_version: None,
            theme: Theme::dark(),
            ctx,
        })
    }

    /// Drop late worker results for every table
    fn unmount(&mut self) {
        self.transfer.table.unmount();
        self.check_in.table.unmount();
        self.stock_ops.table.unmount();
    }
}

pub struct ConsoleApp;

impl App for ConsoleApp {
    type State = State;
    type Msg = Msg;
    type InitParams = State;

    fn init(mut state: State) -> (State, Command<Msg>) {
        let mut commands = vec![stock_ops::refresh_history(&mut state.stock_ops).map(Msg::StockOps)];
        if state.ctx.config.update_check {
            commands.push(Command::perform(
                async { crate::update::check_for_update().await.map_err(|e| format!("{:#}", e)) },
                Msg::UpdateChecked,
            ));
        }
        (state, Command::batch(commands))
    }

    fn update(state: &mut State, msg: Msg) -> Command<Msg> {
        let State {
            ctx,
            feedback,
            transfer,
            check_in,
            stock_ops,
            part_search,
            ..
        } = state;

        match msg {
            Msg::SwitchTab(tab) => {
                state.tab = tab;
                Command::None
            }
            Msg::Quit => {
                log::info!("Quitting");
                state.unmount();
                Command::Quit
            }
            Msg::DismissNotice => {
                feedback.dismiss();
                Command::None
            }
            Msg::UpdateChecked(Ok(version)) => {
                state.newer_version = version;
                Command::None
            }
            Msg::UpdateChecked(Err(e)) => {
                log::warn!("Update check failed: {}", e);
                Command::None
            }

            Msg::Key(key) => match state.tab {
                Tab::Transfer => transfer::handle_key(transfer, key, ctx, feedback).map(Msg::Transfer),
                Tab::CheckIn => check_in::handle_key(check_in, key, ctx, feedback).map(Msg::CheckIn),
                Tab::StockOps => stock_ops::handle_key(stock_ops, key, ctx, feedback).map(Msg::StockOps),
                Tab::PartSearch => part_search::handle_key(part_search, key, ctx, feedback).map(Msg::PartSearch),
            },

            Msg::Transfer(msg) => transfer::update(transfer, msg, ctx, feedback).map(Msg::Transfer),
            Msg::CheckIn(msg) => check_in::update(check_in, msg, ctx, feedback).map(Msg::CheckIn),
            Msg::StockOps(msg) => stock_ops::update(stock_ops, msg, ctx, feedback).map(Msg::StockOps),
            Msg::PartSearch(msg) => part_search::update(part_search, msg, ctx, feedback).map(Msg::PartSearch),
        }
    }

    fn view(state: &mut State, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(area);

        let theme = state.theme.clone();
        frame.render_widget(Paragraph::new(header_line(state, &theme)), header_area);

        match state.tab {
            Tab::Transfer => transfer::view(&mut state.transfer, frame, body_area, &theme),
            Tab::CheckIn => check_in::view(&mut state.check_in, frame, body_area, &theme),
            Tab::StockOps => stock_ops::view(&mut state.stock_ops, frame, body_area, &theme),
            Tab::PartSearch => part_search::view(&mut state.part_search, frame, body_area, &theme),
        }

        frame.render_widget(Paragraph::new(status_line(state, &theme)), status_area);

        if let Some(notice) = state.feedback.notice.data() {
            render_notice(frame, area, notice, &theme);
        }
    }

    fn subscriptions(_state: &State) -> Vec<Subscription<Msg>> {
        let mut subs = vec![Subscription::keyboard(KeyBinding::ctrl('q'), Msg::Quit)];
        subs.extend(
            Tab::ALL
                .iter()
                .map(|tab| Subscription::keyboard(tab.key(), Msg::SwitchTab(*tab))),
        );
        subs
    }

    fn on_key(state: &State, key: KeyEvent) -> Option<Msg> {
        if state.feedback.notice.is_open() {
            return matches!(key.code, KeyCode::Enter | KeyCode::Esc).then_some(Msg::DismissNotice);
        }
        Some(Msg::Key(key))
    }

    fn title() -> &'static str {
        "InvenTree TUI"
    }
}

fn header_line(state: &State, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!(" {} ", state.ctx.config.app_name),
        Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
    )];
    for tab in Tab::ALL {
        let label = format!(" {} {} ", KeyBinding::new(tab.key()).label(), tab.label());
        let style = if tab == state.tab {
            Style::default()
                .fg(theme.text_primary)
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_secondary)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn status_line(state: &State, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!(" {}", state.feedback.status()),
        Style::default().fg(theme.text_primary),
    )];
    if let Some(version) = &state.newer_version {
        spans.push(Span::styled(
            format!("  [v{} available]", version),
            Style::default().fg(theme.accent_warning),
        ));
    }
    spans.push(Span::styled(
        "  Tab: next field  ^Q: quit",
        Style::default().fg(theme.text_secondary),
    ));
    Line::from(spans)
}

/// Next (or previous) entry of a tab's focus order
pub(crate) fn cycle_focus<T: Copy + PartialEq>(order: &[T], current: T, forward: bool) -> T {
    let len = order.len();
    let idx = order.iter().position(|f| *f == current).unwrap_or(0);
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    order[next]
}

/// A row of `[ Label ]` buttons, the focused one highlighted
pub(crate) fn button_line(buttons: &[(&str, bool)], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    for (label, focused) in buttons {
        let style = if *focused {
            Style::default()
                .fg(theme.text_primary)
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_secondary)
        };
        spans.push(Span::styled(format!("[ {} ]", label), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Resolve a barcode that must be a stock item
pub(crate) async fn scan_stock_item(
    api: Arc<dyn InventoryApi>,
    barcode: &str,
) -> Result<Arc<CachedStockItem>, InventoryError> {
    match scan_barcode(api.as_ref(), barcode, &[ModelType::StockItem]).await? {
        ScannedObject::StockItem(item) => Ok(Arc::new(CachedStockItem::new(item, api))),
        other => Err(InventoryError::ScanOrSearch(format!("Not a stock item: {:?}", other))),
    }
}
