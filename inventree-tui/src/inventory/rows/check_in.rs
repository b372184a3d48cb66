//! Check-in history rows
//!
//! One row per check-in event. The same stock item can be checked in several
//! times, so identity includes a per-process event sequence number. Rows are
//! history: every field is frozen.

use chrono::NaiveDateTime;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::inventory::cache::CachedStockItem;
use crate::inventory::row::{
    CellValue, FieldKind, FieldSpec, RowError, RowModel, check_editable, hash_identity,
};

static CHECK_IN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct CheckInRow {
    item: Arc<CachedStockItem>,
    part_name: String,
    quantity: f64,
    previous_location: String,
    new_location: String,
    timestamp: NaiveDateTime,
    sequence: u64,
}

impl CheckInRow {
    pub fn new(
        item: Arc<CachedStockItem>,
        part_name: String,
        previous_location: String,
        new_location: String,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            quantity: item.quantity(),
            item,
            part_name,
            previous_location,
            new_location,
            timestamp,
            sequence: CHECK_IN_SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn item(&self) -> &Arc<CachedStockItem> {
        &self.item
    }
}

impl RowModel for CheckInRow {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::frozen("stock_number", "Stock#", FieldKind::Integer),
        FieldSpec::frozen("part_name", "Part Name", FieldKind::Text),
        FieldSpec::frozen("quantity", "Q", FieldKind::Decimal),
        FieldSpec::frozen("previous_location", "Prev Loc", FieldKind::Text),
        FieldSpec::frozen("new_location", "New Loc", FieldKind::Text),
        FieldSpec::frozen("timestamp", "Check-In Timestamp", FieldKind::Timestamp),
    ];

    fn value(&self, field: &str) -> Option<CellValue> {
        match field {
            "stock_number" => Some(CellValue::Integer(self.item.pk())),
            "part_name" => Some(CellValue::Text(self.part_name.clone())),
            "quantity" => Some(CellValue::Decimal(self.quantity)),
            "previous_location" => Some(CellValue::Text(self.previous_location.clone())),
            "new_location" => Some(CellValue::Text(self.new_location.clone())),
            "timestamp" => Some(CellValue::Timestamp(self.timestamp)),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: CellValue) -> Result<(), RowError> {
        check_editable::<Self>(field, &value)?;
        Ok(())
    }

    fn title_name(&self) -> String {
        self.item.title_name()
    }

    fn identity(&self) -> u64 {
        hash_identity((self.item.pk(), self.sequence))
    }
}
