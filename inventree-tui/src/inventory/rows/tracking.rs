//! Stock history rows for the stock operations tab

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::api::TrackingEntry;
use crate::inventory::row::{
    CellValue, FieldKind, FieldSpec, RowError, RowModel, check_editable, format_quantity,
    hash_identity,
};

pub const LOADING_PART_NAME: &str = "loading...";

const LOCATION_CHANGED: i64 = 20;
const STOCK_REMOVED: i64 = 12;
const STOCK_ADDED: i64 = 11;
const STOCK_COUNTED: i64 = 10;
const STATUS_CHANGED: i64 = 25;

#[derive(Debug, Clone)]
pub struct TrackingRow {
    entry: TrackingEntry,
    timestamp: NaiveDateTime,
    part_name: String,
}

/// Parse the server's tracking date into local time
pub fn parse_tracking_date(date: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn delta<'a>(entry: &'a TrackingEntry, key: &str) -> Option<&'a Value> {
    entry.deltas.as_ref()?.get(key)
}

fn delta_number(entry: &TrackingEntry, key: &str) -> Option<f64> {
    let value = delta(entry, key)?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn delta_text(entry: &TrackingEntry, key: &str) -> Option<String> {
    match delta(entry, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.as_f64().map(format_quantity).unwrap_or_else(|| n.to_string())),
        other => Some(other.to_string()),
    }
}

/// One-line description of what the entry changed
pub fn op_string(entry: &TrackingEntry) -> String {
    let q = delta_number(entry, "quantity");
    let described = match entry.tracking_type {
        LOCATION_CHANGED => delta_text(entry, "location").map(|l| format!("moved -> {}", l)),
        STOCK_REMOVED => delta_number(entry, "removed").zip(q).map(|(removed, q)| {
            format!(
                "{} - {} = {}",
                format_quantity(q + removed),
                format_quantity(removed),
                format_quantity(q)
            )
        }),
        STOCK_ADDED => delta_number(entry, "added").zip(q).map(|(added, q)| {
            format!(
                "{} + {} = {}",
                format_quantity(q - added),
                format_quantity(added),
                format_quantity(q)
            )
        }),
        STOCK_COUNTED => q.map(|q| format!("= {}", format_quantity(q))),
        STATUS_CHANGED => delta_text(entry, "status").map(|s| format!("status -> {}", s)),
        _ => None,
    };

    described.unwrap_or_else(|| {
        let deltas = entry
            .deltas
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_else(|| "{}".to_string());
        format!("[{}] : {}", entry.tracking_type, deltas)
    })
}

pub fn short_label(entry: &TrackingEntry) -> String {
    match entry.tracking_type {
        LOCATION_CHANGED => "Moved".to_string(),
        STOCK_REMOVED => "Removed".to_string(),
        STOCK_ADDED => "Added".to_string(),
        STOCK_COUNTED => "Counted".to_string(),
        STATUS_CHANGED => "Status".to_string(),
        _ => entry.label.clone(),
    }
}

impl TrackingRow {
    /// `None` when the entry's date cannot be read
    pub fn from_entry(entry: TrackingEntry) -> Option<Self> {
        let timestamp = parse_tracking_date(&entry.date)?;
        Some(Self {
            entry,
            timestamp,
            part_name: LOADING_PART_NAME.to_string(),
        })
    }

    pub fn pk(&self) -> i64 {
        self.entry.pk
    }

    pub fn stock_pk(&self) -> i64 {
        self.entry.item
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Copy of this row carrying a loaded part name, applied with `update`
    pub fn with_part_name(&self, part_name: impl Into<String>) -> Self {
        Self {
            part_name: part_name.into(),
            ..self.clone()
        }
    }

    pub fn info(&self) -> String {
        format!("[{}] {}: {}", self.entry.date, self.entry.label, op_string(&self.entry))
    }
}

impl RowModel for TrackingRow {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::frozen("pk", "#", FieldKind::Integer),
        FieldSpec::frozen("timestamp_str", "Timestamp", FieldKind::Text),
        FieldSpec::hidden("timestamp", FieldKind::Timestamp),
        FieldSpec::frozen("stock_pk", "Stk#", FieldKind::Integer),
        FieldSpec::editable("part_name", "Part", FieldKind::Text),
        FieldSpec::hidden("label", FieldKind::Text),
        FieldSpec::frozen("short_label", "Label", FieldKind::Text),
        FieldSpec::frozen("op_string", "Info", FieldKind::Text),
        FieldSpec::hidden("info", FieldKind::Text),
    ];

    fn value(&self, field: &str) -> Option<CellValue> {
        match field {
            "pk" => Some(CellValue::Integer(self.entry.pk)),
            "timestamp_str" => Some(CellValue::Text(self.timestamp.format("%Y-%m-%d %H:%M").to_string())),
            "timestamp" => Some(CellValue::Timestamp(self.timestamp)),
            "stock_pk" => Some(CellValue::Integer(self.entry.item)),
            "part_name" => Some(CellValue::Text(self.part_name.clone())),
            "label" => Some(CellValue::Text(self.entry.label.clone())),
            "short_label" => Some(CellValue::Text(short_label(&self.entry))),
            "op_string" => Some(CellValue::Text(op_string(&self.entry))),
            "info" => Some(CellValue::Text(self.info())),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: CellValue) -> Result<(), RowError> {
        check_editable::<Self>(field, &value)?;
        if let CellValue::Text(name) = value {
            self.part_name = name;
        }
        Ok(())
    }

    fn title_name(&self) -> String {
        format!("Tracking Item #{}", self.entry.pk)
    }

    fn identity(&self) -> u64 {
        hash_identity(self.entry.pk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::row::UpdateOptions;

    fn entry(pk: i64, tracking_type: i64, deltas: Value) -> TrackingEntry {
        TrackingEntry {
            pk,
            item: 40,
            date: "2024-05-01 09:30:00".to_string(),
            label: "Stock removed".to_string(),
            tracking_type,
            deltas: Some(deltas),
            notes: None,
        }
    }

    #[test]
    fn test_op_strings() {
        let removed = entry(1, 12, serde_json::json!({"removed": 2.0, "quantity": 8.0}));
        assert_eq!(op_string(&removed), "10 - 2 = 8");

        let added = entry(2, 11, serde_json::json!({"added": 5, "quantity": 15}));
        assert_eq!(op_string(&added), "10 + 5 = 15");

        let counted = entry(3, 10, serde_json::json!({"quantity": 7.5}));
        assert_eq!(op_string(&counted), "= 7.5");

        let moved = entry(4, 20, serde_json::json!({"location": 12}));
        assert_eq!(op_string(&moved), "moved -> 12");

        let status = entry(5, 25, serde_json::json!({"status": 50}));
        assert_eq!(op_string(&status), "status -> 50");
    }

    #[test]
    fn test_unknown_type_falls_back_to_raw_deltas() {
        let other = entry(6, 99, serde_json::json!({"x": 1}));
        assert_eq!(op_string(&other), r#"[99] : {"x":1}"#);
        assert_eq!(short_label(&other), "Stock removed");
    }

    #[test]
    fn test_parse_tracking_date_formats() {
        assert!(parse_tracking_date("2024-05-01").is_some());
        assert!(parse_tracking_date("2024-05-01 09:30").is_some());
        assert!(parse_tracking_date("2024-05-01T09:30:00.123").is_some());
        assert!(parse_tracking_date("2024-05-01T09:30:00Z").is_some());
        assert!(parse_tracking_date("yesterday").is_none());
    }

    #[test]
    fn test_part_name_loads_through_update() {
        let mut row = TrackingRow::from_entry(entry(7, 10, serde_json::json!({"quantity": 1}))).unwrap();
        assert_eq!(row.value("part_name"), Some(CellValue::Text(LOADING_PART_NAME.to_string())));

        let named = row.with_part_name("Bolt");
        row.update(&named, UpdateOptions::unchecked()).unwrap();
        assert_eq!(row.value("part_name"), Some(CellValue::Text("Bolt".to_string())));
        assert_eq!(row.title_name(), "Tracking Item #7");
    }

    #[test]
    fn test_hidden_fields_are_not_columns() {
        let columns: Vec<_> = TrackingRow::column_fields().iter().map(|f| f.name).collect();
        assert_eq!(
            columns,
            vec!["pk", "timestamp_str", "stock_pk", "part_name", "short_label", "op_string"]
        );
    }
}
