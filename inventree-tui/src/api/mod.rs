//! InvenTree REST access
//!
//! The rest of the crate depends on the `InventoryApi` trait only.

pub mod client;
pub mod error;
#[cfg(test)]
pub mod fake;
pub mod models;
pub mod resilience;
pub mod scanner;

pub use client::{InvenTreeClient, InventoryApi};
pub use error::ApiError;
pub use models::{
    AdjustmentLine, ModelType, Part, ScannedObject, StockAdjustment, StockItem, StockLocation,
    StockMethod, TrackingEntry,
};
pub use scanner::{ScanError, scan_barcode};
