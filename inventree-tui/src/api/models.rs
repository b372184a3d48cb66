//! InvenTree REST models
//!
//! Only the fields the console reads are modelled; everything else in the
//! server payload is ignored by serde.

use serde::{Deserialize, Serialize};

/// A stock item as reported by `/api/stock/{pk}/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockItem {
    pub pk: i64,
    /// Primary key of the part this item is an instance of
    pub part: i64,
    pub quantity: f64,
    /// Current stock location, if the item is placed anywhere
    #[serde(default)]
    pub location: Option<i64>,
    #[serde(default)]
    pub serial: Option<String>,
}

/// A stock location as reported by `/api/stock/location/{pk}/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockLocation {
    pub pk: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<i64>,
    /// Full slash-separated path, present on newer servers
    #[serde(default)]
    pub pathstring: Option<String>,
}

/// A part as reported by `/api/part/{pk}/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub pk: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Location new stock of this part is checked into
    #[serde(default)]
    pub default_location: Option<i64>,
    #[serde(default)]
    pub in_stock: Option<f64>,
}

/// A stock tracking (history) entry from `/api/stock/track/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingEntry {
    pub pk: i64,
    /// Primary key of the stock item the entry belongs to
    pub item: i64,
    pub date: String,
    #[serde(default)]
    pub label: String,
    pub tracking_type: i64,
    #[serde(default)]
    pub deltas: Option<serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Paginated list envelope used when `limit` is passed; `count` and the
/// links are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
}

/// Model types a barcode scan can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    StockItem,
    StockLocation,
}

impl ModelType {
    /// Key used by the barcode endpoint for this model type
    pub fn scan_key(&self) -> &'static str {
        match self {
            ModelType::StockItem => "stockitem",
            ModelType::StockLocation => "stocklocation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelType::StockItem => "stock item",
            ModelType::StockLocation => "stock location",
        }
    }
}

/// A fully fetched object resolved from a barcode
#[derive(Debug, Clone, PartialEq)]
pub enum ScannedObject {
    StockItem(StockItem),
    StockLocation(StockLocation),
}

/// Stock adjustment methods understood by `/api/stock/{method}/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockMethod {
    Transfer,
    Add,
    Remove,
    Count,
}

impl StockMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockMethod::Transfer => "transfer",
            StockMethod::Add => "add",
            StockMethod::Remove => "remove",
            StockMethod::Count => "count",
        }
    }
}

/// One line of a batched adjustment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdjustmentLine {
    pub pk: i64,
    pub quantity: f64,
}

/// A batched stock adjustment request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockAdjustment {
    #[serde(skip)]
    pub method: Option<StockMethod>,
    pub items: Vec<AdjustmentLine>,
    /// Destination, only sent for transfers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<i64>,
    #[serde(default)]
    pub notes: String,
}

impl StockAdjustment {
    pub fn new(method: StockMethod, items: Vec<AdjustmentLine>) -> Self {
        Self {
            method: Some(method),
            items,
            location: None,
            notes: String::new(),
        }
    }

    pub fn transfer(items: Vec<AdjustmentLine>, location: i64) -> Self {
        Self {
            location: Some(location),
            ..Self::new(StockMethod::Transfer, items)
        }
    }

    pub fn method(&self) -> StockMethod {
        self.method.unwrap_or(StockMethod::Transfer)
    }
}
