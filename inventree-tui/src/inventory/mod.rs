//! Inventory domain: cached stock items, row models and the operations
//! the console dispatches against the remote inventory.

pub mod cache;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod row;
pub mod rows;

pub use cache::{CachedStockItem, location_path};
pub use dispatch::{
    AdjustMethod, CheckInOutcome, CheckInPlan, TransferOptions, adjust_item, execute_check_in, parse_amount,
    prepare_check_in, transfer_items,
};
pub use error::InventoryError;
pub use history::HistoryFetcher;
pub use row::{CellValue, FieldSpec, RowKey, RowModel, UpdateOptions};
pub use rows::{CheckInRow, TrackingRow, TransferRow};
