//! Row models
//!
//! A row model is the display projection of one domain object: a fixed list
//! of named fields, each frozen or editable, each with a declared kind and an
//! optional column heading. Fields without a heading are still valid fields,
//! they just never become grid columns.

use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use super::error::ValidationError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Declared value kind of a field. Drives the edit dialog's parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Timestamp,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "whole number",
            FieldKind::Decimal => "number",
            FieldKind::Timestamp => "timestamp",
        }
    }

    /// Whether `c` may be typed into an input of this kind
    pub fn accepts(&self, c: char) -> bool {
        match self {
            FieldKind::Integer => c.is_ascii_digit() || c == '-',
            FieldKind::Decimal => c.is_ascii_digit() || matches!(c, '-' | '.'),
            FieldKind::Text | FieldKind::Timestamp => true,
        }
    }
}

/// Static metadata for one field of a row model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Column heading; `None` hides the field from the grid
    pub display: Option<&'static str>,
    pub frozen: bool,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn frozen(name: &'static str, display: &'static str, kind: FieldKind) -> Self {
        Self { name, display: Some(display), frozen: true, kind }
    }

    pub const fn editable(name: &'static str, display: &'static str, kind: FieldKind) -> Self {
        Self { name, display: Some(display), frozen: false, kind }
    }

    pub const fn hidden(name: &'static str, kind: FieldKind) -> Self {
        Self { name, display: None, frozen: true, kind }
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Timestamp(NaiveDateTime),
}

impl CellValue {
    /// Parse operator input as a value of `kind`
    pub fn parse(input: &str, kind: FieldKind) -> Result<CellValue, String> {
        let trimmed = input.trim();
        match kind {
            FieldKind::Text => Ok(CellValue::Text(input.to_string())),
            FieldKind::Integer => trimmed
                .parse::<i64>()
                .map(CellValue::Integer)
                .map_err(|_| format!("'{}' is not a whole number", trimmed)),
            FieldKind::Decimal => match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(CellValue::Decimal(v)),
                _ => Err(format!("'{}' is not a number", trimmed)),
            },
            FieldKind::Timestamp => NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
                .map(CellValue::Timestamp)
                .map_err(|_| format!("'{}' is not a timestamp (YYYY-MM-DD HH:MM:SS)", trimmed)),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    /// Total order used for sorting grid rows
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::Timestamp(a), CellValue::Timestamp(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.to_string().cmp(&b.to_string()),
            },
        }
    }
}

/// Quantities are decimals on the server but usually whole; show `10`, not `10.0`
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Decimal(v) => write!(f, "{}", format_quantity(*v)),
            CellValue::Timestamp(t) => write!(f, "{}", t.format(TIMESTAMP_FORMAT)),
        }
    }
}

/// Stable key of a row in its table, derived from the row identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(pub String);

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Run the variant's domain rules before mutating
    pub validate: bool,
    /// Allow quantities above the last known stock quantity
    pub allow_greater: bool,
}

impl UpdateOptions {
    pub fn validated() -> Self {
        Self { validate: true, allow_greater: false }
    }

    pub fn unchecked() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{0}' has no column")]
    HiddenField(String),

    #[error("field '{0}' is frozen")]
    FrozenField(String),

    #[error("field '{field}' expects a {expected}")]
    KindMismatch { field: String, expected: &'static str },
}

pub trait RowModel: Clone + Send + Sync + 'static {
    /// All fields in declaration order
    const FIELDS: &'static [FieldSpec];

    /// Current value of `field`, `None` for unknown fields
    fn value(&self, field: &str) -> Option<CellValue>;

    /// Set an editable field. Used on candidates built by the edit dialog.
    fn set_value(&mut self, field: &str, value: CellValue) -> Result<(), RowError>;

    /// Domain rules a candidate must satisfy, every failure reason
    fn validate_update(&self, _other: &Self, _options: UpdateOptions) -> Vec<String> {
        Vec::new()
    }

    /// Copy editable values from `other`. Must not fail; validation runs first.
    fn apply_update(&mut self, other: &Self) {
        for field in Self::editable_fields() {
            let Some(value) = other.value(field.name) else { continue };
            if let Err(e) = self.set_value(field.name, value) {
                log::warn!("Skipping field while applying update: {}", e);
            }
        }
    }

    fn title_name(&self) -> String;

    /// Identity hash; equal for rows over the same backing entity
    fn identity(&self) -> u64;

    fn field_names() -> Vec<&'static str> {
        Self::FIELDS.iter().map(|f| f.name).collect()
    }

    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }

    fn editable_fields() -> Vec<&'static FieldSpec> {
        Self::FIELDS.iter().filter(|f| !f.frozen).collect()
    }

    fn column_fields() -> Vec<&'static FieldSpec> {
        Self::FIELDS.iter().filter(|f| f.display.is_some()).collect()
    }

    fn display_name(field: &str) -> Result<&'static str, RowError> {
        let spec = Self::field(field).ok_or_else(|| RowError::UnknownField(field.to_string()))?;
        spec.display.ok_or_else(|| RowError::HiddenField(field.to_string()))
    }

    /// Apply `other`'s editable values, all or nothing
    fn update(&mut self, other: &Self, options: UpdateOptions) -> Result<(), ValidationError> {
        if options.validate {
            let reasons = self.validate_update(other, options);
            if !reasons.is_empty() {
                return Err(ValidationError::new(reasons));
            }
        }
        self.apply_update(other);
        Ok(())
    }

    fn row_key(&self) -> RowKey {
        RowKey(self.identity().to_string())
    }
}

/// Check that `field` may be set on `R` with a value of the right kind
pub fn check_editable<R: RowModel>(field: &str, value: &CellValue) -> Result<&'static FieldSpec, RowError> {
    let spec = R::field(field).ok_or_else(|| RowError::UnknownField(field.to_string()))?;
    if spec.frozen {
        return Err(RowError::FrozenField(field.to_string()));
    }
    let matches = match spec.kind {
        FieldKind::Text => matches!(value, CellValue::Text(_)),
        FieldKind::Integer => matches!(value, CellValue::Integer(_)),
        FieldKind::Decimal => value.as_f64().is_some(),
        FieldKind::Timestamp => matches!(value, CellValue::Timestamp(_)),
    };
    if !matches {
        return Err(RowError::KindMismatch {
            field: field.to_string(),
            expected: spec.kind.label(),
        });
    }
    Ok(spec)
}

pub fn hash_identity<T: Hash>(value: T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
