//! Row-model backed table
//!
//! `ModelTable` owns a keyed collection of row models and a grid of
//! rendered cells. `resynchronize` reconciles the grid with the collection
//! without rebuilding it: new keys are appended, vanished keys removed,
//! changed cells overwritten, and rows re-sorted only when something changed.

use crossterm::event::KeyCode;
use std::collections::{HashMap, HashSet};

use super::list::ListState;
use crate::inventory::error::{InventoryError, ValidationError};
use crate::inventory::row::{CellValue, FieldSpec, RowKey, RowModel, UpdateOptions};

/// One displayed row: its key and the cell text last written to the grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub key: RowKey,
    pub cells: Vec<String>,
    sort_value: Option<CellValue>,
}

/// Emitted when the operator selects a row of an editable table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub table: &'static str,
    pub key: RowKey,
}

#[derive(Debug)]
pub enum TableEvent<R> {
    Ignored,
    Navigated,
    EditRequested(EditRequest),
    Deleted(R),
}

pub struct ModelTable<R: RowModel> {
    id: &'static str,
    rows: HashMap<RowKey, R>,
    grid: Vec<GridRow>,
    columns: Vec<&'static FieldSpec>,
    sort_key: Option<&'static str>,
    editable: bool,
    allow_delete: bool,
    mounted: bool,
    pub list: ListState,
}

impl<R: RowModel> ModelTable<R> {
    /// Fails when `sort_key` is not a field of `R`
    pub fn new(id: &'static str, sort_key: Option<&'static str>) -> Result<Self, InventoryError> {
        if let Some(key) = sort_key {
            if R::field(key).is_none() {
                return Err(InventoryError::Configuration(format!(
                    "table '{}': invalid sort key '{}', expected one of: {}",
                    id,
                    key,
                    R::field_names().join(", ")
                )));
            }
        }

        Ok(Self {
            id,
            rows: HashMap::new(),
            grid: Vec::new(),
            columns: R::column_fields(),
            sort_key,
            editable: false,
            allow_delete: true,
            mounted: true,
            list: ListState::new(),
        })
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn allow_delete(mut self, allow_delete: bool) -> Self {
        self.allow_delete = allow_delete;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &RowKey) -> Option<&R> {
        self.rows.get(key)
    }

    /// Column headings in declaration order
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().filter_map(|c| R::display_name(c.name).ok()).collect()
    }

    pub fn grid(&self) -> &[GridRow] {
        &self.grid
    }

    /// Rows in displayed order
    pub fn rows(&self) -> impl Iterator<Item = &R> {
        self.grid.iter().filter_map(|g| self.rows.get(&g.key))
    }

    /// Insert unless a row with the same key exists. Returns whether it was inserted.
    pub fn add(&mut self, row: R) -> bool {
        if !self.mounted {
            log::debug!("Table '{}' is unmounted, dropping row", self.id);
            return false;
        }
        let key = row.row_key();
        if self.rows.contains_key(&key) {
            return false;
        }
        self.rows.insert(key, row);
        self.resynchronize();
        true
    }

    pub fn remove(&mut self, key: &RowKey) -> Option<R> {
        if !self.mounted {
            return None;
        }
        let removed = self.rows.remove(key);
        if removed.is_some() {
            self.resynchronize();
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.mounted {
            return;
        }
        self.rows.clear();
        self.resynchronize();
    }

    /// Apply `other` onto the row at `key` (see `RowModel::update`), then
    /// resynchronize. Missing rows are ignored.
    pub fn update_row(&mut self, key: &RowKey, other: &R, options: UpdateOptions) -> Result<(), ValidationError> {
        if !self.mounted {
            return Ok(());
        }
        let Some(row) = self.rows.get_mut(key) else {
            log::debug!("Row {} vanished from '{}' before update", key, self.id);
            return Ok(());
        };
        row.update(other, options)?;
        self.resynchronize();
        Ok(())
    }

    /// Reconcile the grid with the collection. Returns whether anything changed.
    pub fn resynchronize(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        let mut changed = false;

        // Append rows for keys the grid does not show yet
        let shown: HashSet<&RowKey> = self.grid.iter().map(|g| &g.key).collect();
        let mut appended = Vec::new();
        for (key, row) in &self.rows {
            if !shown.contains(key) {
                appended.push(GridRow {
                    key: key.clone(),
                    cells: self.columns.iter().map(|c| cell_text(row, c)).collect(),
                    sort_value: self.sort_key.and_then(|k| row.value(k)),
                });
            }
        }
        changed |= !appended.is_empty();
        self.grid.extend(appended);

        // Drop rows whose key vanished
        let before = self.grid.len();
        self.grid.retain(|g| self.rows.contains_key(&g.key));
        changed |= self.grid.len() != before;

        // Overwrite stale cells
        for grid_row in &mut self.grid {
            let Some(row) = self.rows.get(&grid_row.key) else { continue };
            for (cell, column) in grid_row.cells.iter_mut().zip(&self.columns) {
                let live = cell_text(row, column);
                if *cell != live {
                    *cell = live;
                    changed = true;
                }
            }
            if let Some(sort_key) = self.sort_key {
                let live = row.value(sort_key);
                if grid_row.sort_value != live {
                    grid_row.sort_value = live;
                    changed = true;
                }
            }
        }

        if changed && self.sort_key.is_some() {
            let highlighted = self.highlighted_key().cloned();
            // Newest / last first
            self.grid.sort_by(|a, b| match (&b.sort_value, &a.sort_value) {
                (Some(x), Some(y)) => x.compare(y),
                (x, y) => x.is_some().cmp(&y.is_some()),
            });
            if let Some(key) = highlighted {
                self.list.select(self.grid.iter().position(|g| g.key == key));
            }
        }

        self.list.clamp(self.grid.len());
        changed
    }

    pub fn highlighted_key(&self) -> Option<&RowKey> {
        self.list.selected().and_then(|i| self.grid.get(i)).map(|g| &g.key)
    }

    /// Edit request for the highlighted row; `None` on non-editable tables
    pub fn select_current(&self) -> Option<EditRequest> {
        if !self.editable {
            return None;
        }
        self.highlighted_key().map(|key| EditRequest {
            table: self.id,
            key: key.clone(),
        })
    }

    /// Remove the highlighted row and move the highlight up one
    pub fn delete_highlighted(&mut self) -> Option<R> {
        if !self.mounted || !self.allow_delete || self.is_empty() {
            return None;
        }
        let index = self.list.selected()?;
        let key = self.grid.get(index)?.key.clone();
        let removed = self.rows.remove(&key);
        self.list.select(Some(index.saturating_sub(1)));
        self.resynchronize();
        removed
    }

    pub fn handle_key(&mut self, key: KeyCode) -> TableEvent<R> {
        match key {
            KeyCode::Enter => match self.select_current() {
                Some(request) => TableEvent::EditRequested(request),
                None => TableEvent::Ignored,
            },
            KeyCode::Delete | KeyCode::Backspace => match self.delete_highlighted() {
                Some(row) => TableEvent::Deleted(row),
                None => TableEvent::Ignored,
            },
            other => {
                if self.list.handle_key(other, self.grid.len()) {
                    TableEvent::Navigated
                } else {
                    TableEvent::Ignored
                }
            }
        }
    }

    /// Stop accepting changes; later adds, removals and syncs are no-ops
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    #[cfg(test)]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

fn cell_text<R: RowModel>(row: &R, column: &FieldSpec) -> String {
    row.value(column.name).map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::row::{FieldKind, RowError, check_editable, hash_identity};

    #[derive(Debug, Clone)]
    struct PartRow {
        pk: i64,
        part_name: String,
        quantity: f64,
    }

    impl RowModel for PartRow {
        const FIELDS: &'static [FieldSpec] = &[
            FieldSpec::frozen("pk", "#", FieldKind::Integer),
            FieldSpec::frozen("part_name", "Part Name", FieldKind::Text),
            FieldSpec::editable("quantity", "Quantity", FieldKind::Decimal),
        ];

        fn value(&self, field: &str) -> Option<CellValue> {
            match field {
                "pk" => Some(CellValue::Integer(self.pk)),
                "part_name" => Some(CellValue::Text(self.part_name.clone())),
                "quantity" => Some(CellValue::Decimal(self.quantity)),
                _ => None,
            }
        }

        fn set_value(&mut self, field: &str, value: CellValue) -> Result<(), RowError> {
            check_editable::<Self>(field, &value)?;
            self.quantity = value.as_f64().unwrap_or(self.quantity);
            Ok(())
        }

        fn validate_update(&self, other: &Self, _options: UpdateOptions) -> Vec<String> {
            if other.quantity < 0.0 {
                vec!["Quantity cannot be negative".to_string()]
            } else {
                Vec::new()
            }
        }

        fn title_name(&self) -> String {
            format!("Part #{}", self.pk)
        }

        fn identity(&self) -> u64 {
            hash_identity(self.pk)
        }
    }

    fn part(pk: i64, name: &str) -> PartRow {
        PartRow { pk, part_name: name.to_string(), quantity: 1.0 }
    }

    fn names(table: &ModelTable<PartRow>) -> Vec<String> {
        table.grid().iter().map(|g| g.cells[1].clone()).collect()
    }

    fn grid_keys_match(table: &ModelTable<PartRow>) -> bool {
        let mut grid: Vec<_> = table.grid().iter().map(|g| g.key.clone()).collect();
        let mut rows: Vec<_> = table.rows.keys().cloned().collect();
        grid.sort();
        rows.sort();
        grid == rows
    }

    #[test]
    fn test_invalid_sort_key_fails_at_construction() {
        let result = ModelTable::<PartRow>::new("parts", Some("colour"));
        assert!(matches!(result, Err(InventoryError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let mut table = ModelTable::new("parts", None).unwrap();
        assert!(table.add(part(1, "Bolt")));
        assert!(!table.add(part(1, "Bolt again")));
        assert_eq!(table.len(), 1);
        assert_eq!(table.grid().len(), 1);
    }

    #[test]
    fn test_sorted_descending_by_part_name() {
        let mut table = ModelTable::new("parts", Some("part_name")).unwrap();
        table.add(part(1, "Bolt"));
        table.add(part(2, "Nut"));
        table.add(part(3, "Washer"));
        assert_eq!(names(&table), vec!["Washer", "Nut", "Bolt"]);

        table.add(part(4, "Anchor"));
        assert_eq!(names(&table), vec!["Washer", "Nut", "Bolt", "Anchor"]);
    }

    #[test]
    fn test_grid_matches_collection_after_mixed_operations() {
        let mut table = ModelTable::new("parts", Some("pk")).unwrap();
        for pk in 1..=6 {
            table.add(part(pk, "P"));
            assert!(grid_keys_match(&table));
        }
        table.remove(&part(3, "P").row_key());
        assert!(grid_keys_match(&table));
        table.add(part(3, "P"));
        table.remove(&part(6, "P").row_key());
        assert!(grid_keys_match(&table));
        table.clear();
        assert!(grid_keys_match(&table));
        assert!(table.grid().is_empty());
    }

    #[test]
    fn test_changed_cell_is_rewritten_in_place() {
        let mut table = ModelTable::new("parts", None).unwrap().editable(true);
        let row = part(1, "Bolt");
        let key = row.row_key();
        table.add(row.clone());

        let mut candidate = row.clone();
        candidate.set_value("quantity", CellValue::Decimal(7.0)).unwrap();
        table.update_row(&key, &candidate, UpdateOptions::validated()).unwrap();

        assert_eq!(table.grid()[0].cells[2], "7");
        assert!(!table.resynchronize());
    }

    #[test]
    fn test_failed_update_leaves_grid_unchanged() {
        let mut table = ModelTable::new("parts", None).unwrap();
        let row = part(1, "Bolt");
        let key = row.row_key();
        table.add(row.clone());

        let mut candidate = row.clone();
        candidate.set_value("quantity", CellValue::Decimal(-2.0)).unwrap();
        assert!(table.update_row(&key, &candidate, UpdateOptions::validated()).is_err());
        assert_eq!(table.grid()[0].cells[2], "1");
    }

    #[test]
    fn test_delete_moves_highlight_up() {
        let mut table = ModelTable::new("parts", Some("pk")).unwrap();
        for pk in 1..=3 {
            table.add(part(pk, "P"));
        }
        // Grid is 3, 2, 1; highlight the middle row
        table.list.select(Some(1));
        let removed = table.delete_highlighted().unwrap();
        assert_eq!(removed.pk, 2);
        assert_eq!(table.list.selected(), Some(0));

        table.list.select(Some(0));
        table.delete_highlighted();
        assert_eq!(table.list.selected(), Some(0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_delete_disabled() {
        let mut table = ModelTable::new("parts", None).unwrap().allow_delete(false);
        table.add(part(1, "Bolt"));
        assert!(table.delete_highlighted().is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_selection_only_on_editable_tables() {
        let mut table = ModelTable::new("parts", None).unwrap();
        table.add(part(1, "Bolt"));
        assert!(matches!(table.handle_key(KeyCode::Enter), TableEvent::Ignored));

        let mut table = ModelTable::new("parts", None).unwrap().editable(true);
        table.add(part(1, "Bolt"));
        match table.handle_key(KeyCode::Enter) {
            TableEvent::EditRequested(request) => {
                assert_eq!(request.table, "parts");
                assert_eq!(request.key, part(1, "Bolt").row_key());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unmounted_table_ignores_changes() {
        let mut table = ModelTable::new("parts", None).unwrap();
        table.add(part(1, "Bolt"));
        table.unmount();

        assert!(!table.add(part(2, "Nut")));
        assert!(!table.resynchronize());
        assert!(table.remove(&part(1, "Bolt").row_key()).is_none());
        table.clear();
        table.list.select(Some(0));
        assert!(table.delete_highlighted().is_none());

        assert_eq!(table.len(), 1);
        assert_eq!(table.grid().len(), 1);
        assert!(grid_keys_match(&table));
    }

    #[test]
    fn test_headers_use_display_names() {
        let table = ModelTable::<PartRow>::new("parts", None).unwrap();
        assert_eq!(table.headers(), vec!["#", "Part Name", "Quantity"]);
    }

    #[test]
    fn test_sort_keeps_highlight_on_same_row() {
        let mut table = ModelTable::new("parts", Some("part_name")).unwrap();
        table.add(part(1, "Bolt"));
        table.add(part(2, "Nut"));
        // Grid: Nut, Bolt; highlight Bolt
        table.list.select(Some(1));
        table.add(part(3, "Anchor"));
        assert_eq!(table.highlighted_key(), Some(&part(1, "Bolt").row_key()));
    }
}
