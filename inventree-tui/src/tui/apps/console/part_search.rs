//! Part Search tab
//!
//! Search parts by name and browse their stock as a two-level tree. The
//! first few results expand on their own; others load stock when opened.

use crossterm::event::{KeyCode, KeyEvent};
use futures::future::join_all;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::feedback::Feedback;
use super::{Context, cycle_focus};
use crate::api::resilience::ConcurrencyLimiter;
use crate::api::{InventoryApi, Part};
use crate::inventory::row::format_quantity;
use crate::inventory::InventoryError;
use crate::tui::modals::Notice;
use crate::tui::renderer::render_text_input;
use crate::tui::widgets::{ListState, TextInputEvent, TextInputField};
use crate::tui::{Command, Resource, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Results,
}

const FOCUS_ORDER: [Focus; 2] = [Focus::Search, Focus::Results];

pub enum Msg {
    Searched {
        seq: u64,
        result: Result<Vec<Part>, InventoryError>,
    },
    StockLoaded {
        part: i64,
        result: Result<Vec<StockLine>, String>,
    },
}

/// One stock item under a part
#[derive(Debug, Clone, PartialEq)]
pub struct StockLine {
    pub pk: i64,
    pub location: String,
    pub quantity: f64,
}

impl StockLine {
    pub fn label(&self) -> String {
        format!(
            "Stock #{}, location: {}, Q: {}",
            self.pk,
            self.location,
            format_quantity(self.quantity)
        )
    }
}

#[derive(Debug, Clone)]
pub struct PartNode {
    pub part: Part,
    pub stock: Resource<Vec<StockLine>>,
    pub expanded: bool,
}

/// A visible line of the result tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TreeLine {
    Part(usize),
    Stock(usize, usize),
    /// Loading / error / empty placeholder under an expanded part
    Placeholder(usize),
}

pub struct State {
    pub focus: Focus,
    pub search_input: TextInputField,
    pub results: Resource<Vec<PartNode>>,
    pub list: ListState,
    search_seq: u64,
}

impl State {
    pub fn new() -> Self {
        Self {
            focus: Focus::Search,
            search_input: TextInputField::new(),
            results: Resource::NotAsked,
            list: ListState::new(),
            search_seq: 0,
        }
    }

    fn nodes(&self) -> &[PartNode] {
        self.results.success().map(Vec::as_slice).unwrap_or(&[])
    }

    fn node_mut(&mut self, part: i64) -> Option<&mut PartNode> {
        match &mut self.results {
            Resource::Success(nodes) => nodes.iter_mut().find(|n| n.part.pk == part),
            _ => None,
        }
    }

    fn lines(&self) -> Vec<TreeLine> {
        let mut lines = Vec::new();
        for (idx, node) in self.nodes().iter().enumerate() {
            lines.push(TreeLine::Part(idx));
            if !node.expanded {
                continue;
            }
            match &node.stock {
                Resource::Success(stock) if !stock.is_empty() => {
                    lines.extend((0..stock.len()).map(|line| TreeLine::Stock(idx, line)));
                }
                _ => lines.push(TreeLine::Placeholder(idx)),
            }
        }
        lines
    }

    pub fn root_label(&self) -> String {
        match &self.results {
            Resource::NotAsked => "Results".to_string(),
            Resource::Loading => "Searching...".to_string(),
            Resource::Success(nodes) => format!("Results: Found {} parts", nodes.len()),
            Resource::Failure(err) => format!("Search failed: {}", err),
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// Location name, or a `Location #pk` fallback when the lookup fails
async fn location_label(api: &dyn InventoryApi, limiter: &ConcurrencyLimiter, pk: i64) -> String {
    let result = match limiter.acquire().await {
        Ok(_permit) => api.get_location(pk).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    result.map(|location| location.name).unwrap_or_else(|e| {
        log::warn!("Failed to load location #{}: {}", pk, e);
        format!("Location #{}", pk)
    })
}

async fn load_stock(
    api: Arc<dyn InventoryApi>,
    limiter: ConcurrencyLimiter,
    part: i64,
) -> Result<Vec<StockLine>, String> {
    let items = {
        let _permit = limiter.acquire().await.map_err(|e| e.to_string())?;
        api.list_stock_items(part).await.map_err(|e| e.to_string())?
    };

    // One lookup per distinct location
    let location_pks: BTreeSet<i64> = items.iter().filter_map(|item| item.location).collect();
    let (api, limiter) = (api.as_ref(), &limiter);
    let lookups = location_pks
        .into_iter()
        .map(|pk| async move { (pk, location_label(api, limiter, pk).await) });
    let names: HashMap<i64, String> = join_all(lookups).await.into_iter().collect();

    Ok(items
        .into_iter()
        .map(|item| StockLine {
            pk: item.pk,
            location: item
                .location
                .and_then(|pk| names.get(&pk).cloned())
                .unwrap_or_else(|| "None".to_string()),
            quantity: item.quantity,
        })
        .collect())
}

fn expand(node: &mut PartNode, ctx: &Context) -> Command<Msg> {
    node.expanded = true;
    if !matches!(node.stock, Resource::NotAsked | Resource::Failure(_)) {
        return Command::None;
    }
    node.stock = Resource::Loading;
    let part = node.part.pk;
    Command::perform(load_stock(ctx.api.clone(), ctx.limiter.clone(), part), move |result| Msg::StockLoaded {
        part,
        result,
    })
}

fn submit_search(state: &mut State, ctx: &Context) -> Command<Msg> {
    let query = state.search_input.take();
    let query = query.trim().to_string();
    if query.is_empty() {
        return Command::None;
    }

    state.search_seq += 1;
    let seq = state.search_seq;
    state.results = Resource::Loading;
    state.list = ListState::new();

    let api = ctx.api.clone();
    Command::perform(
        async move { api.search_parts(&query).await.map_err(InventoryError::from) },
        move |result| Msg::Searched { seq, result },
    )
}

fn toggle_selected(state: &mut State, key: KeyCode, ctx: &Context) -> Command<Msg> {
    let lines = state.lines();
    let Some(line) = state.list.selected().and_then(|idx| lines.get(idx).copied()) else {
        return Command::None;
    };
    let TreeLine::Part(idx) = line else {
        return Command::None;
    };
    let Resource::Success(nodes) = &mut state.results else {
        return Command::None;
    };
    let Some(node) = nodes.get_mut(idx) else {
        return Command::None;
    };

    let command = match key {
        KeyCode::Left => {
            node.expanded = false;
            Command::None
        }
        KeyCode::Right => expand(node, ctx),
        _ if node.expanded => {
            node.expanded = false;
            Command::None
        }
        _ => expand(node, ctx),
    };
    let count = state.lines().len();
    state.list.clamp(count);
    command
}

pub fn handle_key(state: &mut State, key: KeyEvent, ctx: &Context, _feedback: &mut Feedback) -> Command<Msg> {
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
        Focus::Search => match TextInputEvent::from_key(key.code) {
            TextInputEvent::Submit => submit_search(state, ctx),
            event => {
                state.search_input.handle_event(event, None);
                Command::None
            }
        },
        Focus::Results => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                toggle_selected(state, key.code, ctx)
            }
            code => {
                let count = state.lines().len();
                state.list.handle_key(code, count);
                Command::None
            }
        },
    }
}

pub fn update(state: &mut State, msg: Msg, ctx: &Context, feedback: &mut Feedback) -> Command<Msg> {
    match msg {
        Msg::Searched { seq, result } => {
            if seq != state.search_seq {
                return Command::None;
            }
            let parts = match result {
                Ok(parts) => parts,
                Err(e) => {
                    state.results = Resource::Failure(e.to_string());
                    feedback.error(&e);
                    return Command::None;
                }
            };

            feedback.set_status(format!("Search found {} parts", parts.len()));
            if parts.is_empty() {
                feedback.notify(Notice::info("No Parts Found", "The part search yielded no results."));
            }

            let auto_expand = ctx.config.part_search_tab.auto_expand;
            let mut nodes: Vec<PartNode> = parts
                .into_iter()
                .map(|part| PartNode { part, stock: Resource::NotAsked, expanded: false })
                .collect();
            let commands: Vec<_> = nodes.iter_mut().take(auto_expand).map(|node| expand(node, ctx)).collect();
            state.results = Resource::Success(nodes);
            let count = state.lines().len();
            state.list.clamp(count);
            Command::batch(commands)
        }

        Msg::StockLoaded { part, result } => {
            if let Err(e) = &result {
                log::warn!("Failed to load stock of part #{}: {}", part, e);
            }
            if let Some(node) = state.node_mut(part) {
                node.stock = result.into();
            }
            let count = state.lines().len();
            state.list.clamp(count);
            Command::None
        }
    }
}

fn line_text(state: &State, line: TreeLine) -> String {
    let nodes = state.nodes();
    match line {
        TreeLine::Part(idx) => {
            let node = &nodes[idx];
            let marker = if node.expanded { "▾" } else { "▸" };
            format!("{} {}", marker, node.part.name)
        }
        TreeLine::Stock(idx, line) => match nodes[idx].stock.success().and_then(|s| s.get(line)) {
            Some(stock) => format!("    {}", stock.label()),
            None => String::new(),
        },
        TreeLine::Placeholder(idx) => match &nodes[idx].stock {
            Resource::Loading | Resource::NotAsked => "    loading...".to_string(),
            Resource::Failure(err) => format!("    failed to load stock: {}", err),
            Resource::Success(_) => "    No stock".to_string(),
        },
    }
}

pub fn view(state: &mut State, frame: &mut Frame, area: Rect, theme: &Theme) {
    let [input_area, tree_area] = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);

    render_text_input(
        frame,
        input_area,
        &state.search_input.value,
        &mut state.search_input.state,
        Some("Search Parts"),
        state.focus == Focus::Search,
        theme,
    );

    let focused = state.focus == Focus::Results;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", state.root_label()))
        .border_style(Style::default().fg(if focused { theme.accent_primary } else { theme.border_secondary }));
    let inner = block.inner(tree_area);
    frame.render_widget(block, tree_area);

    let lines = state.lines();
    let height = inner.height as usize;
    state.list.set_viewport_height(height);
    state.list.update_scroll(height, lines.len());

    let offset = state.list.scroll_offset();
    let selected = state.list.selected();
    let rendered: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(idx, line)| {
            let mut style = match line {
                TreeLine::Part(_) => Style::default().fg(theme.text_primary).add_modifier(Modifier::BOLD),
                _ => Style::default().fg(theme.text_secondary),
            };
            if focused && selected == Some(idx) {
                style = style.bg(theme.highlight_bg);
            }
            Line::from(Span::styled(line_text(state, *line), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(rendered), inner);
}
