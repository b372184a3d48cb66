//! Rows of the transfer and check-in item tables

use std::sync::Arc;

use crate::api::ApiError;
use crate::inventory::cache::CachedStockItem;
use crate::inventory::row::{
    CellValue, FieldKind, FieldSpec, RowError, RowModel, UpdateOptions, check_editable,
    format_quantity, hash_identity,
};

/// A scanned stock item waiting to be transferred
#[derive(Debug, Clone)]
pub struct TransferRow {
    item: Arc<CachedStockItem>,
    part_name: String,
    location_name: String,
    /// Value typed into an edit candidate; `None` reads through to the item
    pending_quantity: Option<f64>,
}

impl TransferRow {
    /// Build a row, fetching the part and location names it displays
    pub async fn load(item: Arc<CachedStockItem>) -> Result<Self, ApiError> {
        let part_name = item.part().await?.name.clone();
        let location_name = item.location_name().await?;
        Ok(Self::new(item, part_name, location_name))
    }

    pub fn new(item: Arc<CachedStockItem>, part_name: String, location_name: String) -> Self {
        Self {
            item,
            part_name,
            location_name,
            pending_quantity: None,
        }
    }

    pub fn item(&self) -> &Arc<CachedStockItem> {
        &self.item
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn quantity(&self) -> f64 {
        self.pending_quantity.unwrap_or_else(|| self.item.quantity())
    }
}

impl RowModel for TransferRow {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::frozen("stock_number", "Stock Number", FieldKind::Integer),
        FieldSpec::frozen("part_name", "Part Name", FieldKind::Text),
        FieldSpec::editable("quantity", "Quantity", FieldKind::Decimal),
        FieldSpec::frozen("current_location", "Current Location", FieldKind::Text),
    ];

    fn value(&self, field: &str) -> Option<CellValue> {
        match field {
            "stock_number" => Some(CellValue::Integer(self.item.pk())),
            "part_name" => Some(CellValue::Text(self.part_name.clone())),
            "quantity" => Some(CellValue::Decimal(self.quantity())),
            "current_location" => Some(CellValue::Text(self.location_name.clone())),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: CellValue) -> Result<(), RowError> {
        check_editable::<Self>(field, &value)?;
        self.pending_quantity = value.as_f64();
        Ok(())
    }

    fn validate_update(&self, other: &Self, options: UpdateOptions) -> Vec<String> {
        let mut reasons = Vec::new();
        let quantity = other.quantity();
        let original = self.item.original_quantity();
        if quantity > original && !options.allow_greater {
            reasons.push(format!(
                "Quantity is greater than the original stock quantity ({})",
                format_quantity(original)
            ));
        }
        if quantity <= 0.0 {
            reasons.push("Quantity must be greater than zero".to_string());
        }
        reasons
    }

    fn apply_update(&mut self, other: &Self) {
        self.item.set_quantity(other.quantity());
        self.pending_quantity = None;
    }

    fn title_name(&self) -> String {
        self.item.title_name()
    }

    fn identity(&self) -> u64 {
        hash_identity(self.item.pk())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeInventory;
    use crate::api::{Part, StockItem};

    fn cached(pk: i64, quantity: f64) -> Arc<CachedStockItem> {
        let item = StockItem { pk, part: 1, quantity, location: None, serial: None };
        Arc::new(CachedStockItem::new(item, Arc::new(FakeInventory::new())))
    }

    fn row(item: &Arc<CachedStockItem>) -> TransferRow {
        TransferRow::new(item.clone(), "Bolt".to_string(), "Shelf A".to_string())
    }

    fn candidate(original: &TransferRow, quantity: f64) -> TransferRow {
        let mut candidate = original.clone();
        candidate.set_value("quantity", CellValue::Decimal(quantity)).unwrap();
        candidate
    }

    #[test]
    fn test_quantity_above_original_rejected_and_untouched() {
        let item = cached(5, 10.0);
        let mut original = row(&item);
        let candidate = candidate(&original, 12.0);

        let err = original.update(&candidate, UpdateOptions::validated()).unwrap_err();
        assert!(err.to_string().contains("10"));
        assert_eq!(original.quantity(), 10.0);
        assert_eq!(item.quantity(), 10.0);
    }

    #[test]
    fn test_rejected_update_keeps_prior_override() {
        let item = cached(5, 10.0);
        item.set_quantity(12.0);
        let mut original = row(&item);
        let candidate = candidate(&original, 12.0);

        let err = original.update(&candidate, UpdateOptions::validated()).unwrap_err();
        assert!(err.to_string().contains("10"));
        assert_eq!(item.quantity(), 12.0);
        assert_eq!(original.quantity(), 12.0);
        assert_eq!(item.original_quantity(), 10.0);
    }

    #[test]
    fn test_quantity_above_original_allowed_with_override() {
        let item = cached(5, 10.0);
        let mut original = row(&item);
        let candidate = candidate(&original, 12.0);

        let options = UpdateOptions { validate: true, allow_greater: true };
        original.update(&candidate, options).unwrap();
        assert_eq!(item.quantity(), 12.0);
    }

    #[test]
    fn test_candidate_edit_does_not_leak_into_shared_item() {
        let item = cached(5, 10.0);
        let original = row(&item);
        let _candidate = candidate(&original, 3.0);
        assert_eq!(item.quantity(), 10.0);
    }

    #[test]
    fn test_update_is_visible_to_other_rows_of_same_item() {
        let item = cached(5, 10.0);
        let mut first = row(&item);
        let second = row(&item);

        first.update(&candidate(&first, 4.0), UpdateOptions::validated()).unwrap();
        assert_eq!(second.value("quantity"), Some(CellValue::Decimal(4.0)));
    }

    #[test]
    fn test_identity_follows_pk() {
        let a = row(&cached(5, 10.0));
        let b = row(&cached(5, 3.0));
        let c = row(&cached(6, 10.0));
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
        assert_eq!(a.title_name(), "Stock #5");
    }

    #[tokio::test]
    async fn test_load_fetches_names() {
        let fake = Arc::new(FakeInventory::new());
        fake.insert_part(Part {
            pk: 1,
            name: "Washer".to_string(),
            description: None,
            default_location: None,
            in_stock: None,
        });
        let item = StockItem { pk: 9, part: 1, quantity: 2.0, location: None, serial: None };
        let row = TransferRow::load(Arc::new(CachedStockItem::new(item, fake))).await.unwrap();

        assert_eq!(row.part_name(), "Washer");
        assert_eq!(row.value("current_location"), Some(CellValue::Text("None".to_string())));
    }
}
