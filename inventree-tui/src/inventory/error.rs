//! Error taxonomy of the inventory layer

use thiserror::Error;

use crate::api::{ApiError, ScanError};

/// Every reason a proposed edit or adjustment was refused.
/// Displayed as one line, reasons joined with ". ".
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", reasons.join(". "))]
pub struct ValidationError {
    pub reasons: Vec<String>,
}

impl ValidationError {
    pub fn new(reasons: Vec<String>) -> Self {
        Self { reasons }
    }

    pub fn single(reason: impl Into<String>) -> Self {
        Self {
            reasons: vec![reason.into()],
        }
    }
}

#[derive(Debug, Error)]
pub enum InventoryError {
    /// Lookup failed or resolved to an object of the wrong type
    #[error("{0}")]
    ScanOrSearch(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Requested operation is deliberately not implemented
    #[error("{0}")]
    Unsupported(String),

    /// Remote call failed after local validation passed
    #[error("{0}")]
    Remote(#[from] ApiError),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<ScanError> for InventoryError {
    fn from(err: ScanError) -> Self {
        InventoryError::ScanOrSearch(err.to_string())
    }
}

impl InventoryError {
    /// Short heading for the notice that reports this error
    pub fn title(&self) -> &'static str {
        match self {
            InventoryError::ScanOrSearch(_) => "Scan Error",
            InventoryError::Validation(_) => "Invalid Input",
            InventoryError::Unsupported(_) => "Submission Error",
            InventoryError::Remote(_) => "Server Error",
            InventoryError::Configuration(_) => "Configuration Error",
        }
    }
}
