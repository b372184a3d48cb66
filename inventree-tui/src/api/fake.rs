//! In-memory `InventoryApi` used by tests
//!
//! Records every call so tests can assert on what reached the "server".

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::client::InventoryApi;
use super::error::ApiError;
use super::models::{Part, StockAdjustment, StockItem, StockLocation, TrackingEntry};

#[derive(Default)]
struct FakeState {
    stock_items: HashMap<i64, StockItem>,
    parts: HashMap<i64, Part>,
    locations: HashMap<i64, StockLocation>,
    tracking: Vec<TrackingEntry>,
    barcodes: HashMap<String, Value>,
    adjustments: Vec<StockAdjustment>,
    default_location_updates: Vec<(i64, i64)>,
    calls: HashMap<&'static str, usize>,
    /// Remaining forced failures per operation
    failures: HashMap<&'static str, usize>,
    adjust_error: Option<String>,
}

#[derive(Default)]
pub struct FakeInventory {
    state: Mutex<FakeState>,
}

impl FakeInventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    /// Count the call and fail it if a failure was queued for `op`
    fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        self.with_state(|s| {
            *s.calls.entry(op).or_default() += 1;
            match s.failures.get_mut(op) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    Err(ApiError::Status { status: 503, body: format!("{} unavailable", op) })
                }
                _ => Ok(()),
            }
        })
    }

    pub fn insert_stock_item(&self, item: StockItem) {
        self.with_state(|s| s.stock_items.insert(item.pk, item));
    }

    pub fn insert_part(&self, part: Part) {
        self.with_state(|s| s.parts.insert(part.pk, part));
    }

    pub fn insert_location(&self, location: StockLocation) {
        self.with_state(|s| s.locations.insert(location.pk, location));
    }

    pub fn push_tracking(&self, entry: TrackingEntry) {
        self.with_state(|s| s.tracking.push(entry));
    }

    pub fn register_barcode(&self, barcode: &str, payload: Value) {
        self.with_state(|s| s.barcodes.insert(barcode.to_string(), payload));
    }

    /// Make the next `times` calls of `op` fail with a 503
    pub fn fail_next(&self, op: &'static str, times: usize) {
        self.with_state(|s| s.failures.insert(op, times));
    }

    /// Make every adjustment fail with the given server message
    pub fn reject_adjustments(&self, message: &str) {
        self.with_state(|s| s.adjust_error = Some(message.to_string()));
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.with_state(|s| s.calls.get(op).copied().unwrap_or(0))
    }

    pub fn adjustments(&self) -> Vec<StockAdjustment> {
        self.with_state(|s| s.adjustments.clone())
    }

    pub fn default_location_updates(&self) -> Vec<(i64, i64)> {
        self.with_state(|s| s.default_location_updates.clone())
    }
}

fn not_found(what: &str, pk: i64) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("{} #{} not found", what, pk),
    }
}

#[async_trait]
impl InventoryApi for FakeInventory {
    async fn scan_barcode(&self, barcode: &str) -> Result<Value, ApiError> {
        self.enter("scan_barcode")?;
        self.with_state(|s| s.barcodes.get(barcode).cloned())
            .ok_or_else(|| ApiError::Rejected("No match found for barcode data".to_string()))
    }

    async fn get_stock_item(&self, pk: i64) -> Result<StockItem, ApiError> {
        self.enter("get_stock_item")?;
        self.with_state(|s| s.stock_items.get(&pk).cloned())
            .ok_or_else(|| not_found("Stock item", pk))
    }

    async fn get_location(&self, pk: i64) -> Result<StockLocation, ApiError> {
        self.enter("get_location")?;
        self.with_state(|s| s.locations.get(&pk).cloned())
            .ok_or_else(|| not_found("Location", pk))
    }

    async fn get_part(&self, pk: i64) -> Result<Part, ApiError> {
        self.enter("get_part")?;
        self.with_state(|s| s.parts.get(&pk).cloned())
            .ok_or_else(|| not_found("Part", pk))
    }

    async fn search_parts(&self, search: &str) -> Result<Vec<Part>, ApiError> {
        self.enter("search_parts")?;
        let needle = search.to_lowercase();
        Ok(self.with_state(|s| {
            let mut parts: Vec<Part> = s
                .parts
                .values()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            parts.sort_by_key(|p| p.pk);
            parts
        }))
    }

    async fn search_locations(&self, search: &str) -> Result<Vec<StockLocation>, ApiError> {
        self.enter("search_locations")?;
        let needle = search.to_lowercase();
        Ok(self.with_state(|s| {
            let mut locations: Vec<StockLocation> = s
                .locations
                .values()
                .filter(|l| l.name.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            locations.sort_by_key(|l| l.pk);
            locations
        }))
    }

    async fn list_stock_items(&self, part: i64) -> Result<Vec<StockItem>, ApiError> {
        self.enter("list_stock_items")?;
        Ok(self.with_state(|s| {
            let mut items: Vec<StockItem> = s
                .stock_items
                .values()
                .filter(|i| i.part == part)
                .cloned()
                .collect();
            items.sort_by_key(|i| i.pk);
            items
        }))
    }

    async fn list_tracking(&self, limit: u32, offset: u32) -> Result<Vec<TrackingEntry>, ApiError> {
        self.enter("list_tracking")?;
        Ok(self.with_state(|s| {
            let mut entries = s.tracking.clone();
            entries.sort_by(|a, b| b.pk.cmp(&a.pk));
            entries
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect()
        }))
    }

    async fn adjust_stock(&self, adjustment: &StockAdjustment) -> Result<(), ApiError> {
        self.enter("adjust_stock")?;
        self.with_state(|s| {
            if let Some(message) = &s.adjust_error {
                return Err(ApiError::Rejected(message.clone()));
            }
            s.adjustments.push(adjustment.clone());
            Ok(())
        })
    }

    async fn set_default_location(&self, part: i64, location: i64) -> Result<(), ApiError> {
        self.enter("set_default_location")?;
        self.with_state(|s| s.default_location_updates.push((part, location)));
        Ok(())
    }
}
