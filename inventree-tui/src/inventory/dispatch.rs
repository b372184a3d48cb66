//! Submission of transfers, adjustments and check-ins
//!
//! Every operation is validated locally before anything is sent, and each
//! results in exactly one batched adjustment call.

use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::cache::CachedStockItem;
use super::error::{InventoryError, ValidationError};
use super::row::format_quantity;
use super::rows::CheckInRow;
use crate::api::{AdjustmentLine, InventoryApi, StockAdjustment, StockLocation, StockMethod};

/// Single-item stock adjustments offered by the stock operations tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdjustMethod {
    Add,
    #[default]
    Remove,
    Count,
}

impl AdjustMethod {
    pub const ALL: [AdjustMethod; 3] = [AdjustMethod::Remove, AdjustMethod::Add, AdjustMethod::Count];

    pub fn stock_method(&self) -> StockMethod {
        match self {
            AdjustMethod::Add => StockMethod::Add,
            AdjustMethod::Remove => StockMethod::Remove,
            AdjustMethod::Count => StockMethod::Count,
        }
    }

    /// Value the amount input starts with
    pub fn default_amount(&self, original: f64) -> f64 {
        match self {
            AdjustMethod::Count => original,
            _ => 1.0,
        }
    }
}

impl fmt::Display for AdjustMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AdjustMethod::Add => "Add",
            AdjustMethod::Remove => "Remove",
            AdjustMethod::Count => "Count",
        };
        f.write_str(label)
    }
}

/// Check an adjustment amount against the item's stock on hand
pub fn validate_amount(method: AdjustMethod, amount: f64, original: f64) -> Result<(), ValidationError> {
    let mut reasons = Vec::new();
    if !amount.is_finite() {
        reasons.push("Amount must be a number".to_string());
    } else {
        match method {
            AdjustMethod::Remove => {
                if amount <= 0.0 {
                    reasons.push("Amount must be greater than zero".to_string());
                }
                if amount > original {
                    reasons.push(format!(
                        "Cannot remove more than the stock quantity ({})",
                        format_quantity(original)
                    ));
                }
            }
            AdjustMethod::Add => {
                if amount <= 0.0 {
                    reasons.push("Amount must be greater than zero".to_string());
                }
            }
            AdjustMethod::Count => {
                if amount < 0.0 {
                    reasons.push("Count cannot be negative".to_string());
                }
            }
        }
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(reasons))
    }
}

/// Parse and validate what the operator typed in the adjust dialog
pub fn parse_amount(input: &str, method: AdjustMethod, original: f64) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::single("Enter an amount"));
    }
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::single(format!("'{}' is not a number", trimmed)))?;
    validate_amount(method, amount, original)?;
    Ok(amount)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferOptions {
    /// Also make the destination the default location of every moved part
    pub set_default_location: bool,
}

/// Move every item, in full, to `destination` with one batched call
pub async fn transfer_items(
    api: &dyn InventoryApi,
    items: &[Arc<CachedStockItem>],
    destination: &StockLocation,
    options: TransferOptions,
) -> Result<String, InventoryError> {
    if items.is_empty() {
        return Err(ValidationError::single("No items have been scanned yet.").into());
    }

    if let Some(item) = items.iter().find(|item| item.is_quantity_overridden()) {
        return Err(InventoryError::Unsupported(format!(
            "{}: transferring part of a stock item ({} of {}) is not implemented",
            item.title_name(),
            format_quantity(item.quantity()),
            format_quantity(item.original_quantity())
        )));
    }

    let lines = items
        .iter()
        .map(|item| AdjustmentLine {
            pk: item.pk(),
            quantity: item.quantity(),
        })
        .collect();
    let mut adjustment = StockAdjustment::transfer(lines, destination.pk);
    adjustment.notes = "Transferred with inventree-tui".to_string();
    api.adjust_stock(&adjustment).await?;
    log::info!("Transferred {} item(s) to location #{}", items.len(), destination.pk);

    // The move is committed from here on; default-location failures only
    // downgrade the summary.
    let mut not_updated = Vec::new();
    if options.set_default_location {
        let parts: BTreeSet<i64> = items.iter().map(|item| item.stock_item().part).collect();
        for part in parts {
            match api.set_default_location(part, destination.pk).await {
                Ok(()) => log::debug!("Default location of part #{} set to #{}", part, destination.pk),
                Err(e) => {
                    log::warn!("Failed to set default location of part #{}: {}", part, e);
                    not_updated.push(format!("#{}", part));
                }
            }
        }
    }

    let noun = if items.len() == 1 { "item" } else { "items" };
    let mut summary = format!("Transferred {} {} to {}", items.len(), noun, destination.name);
    if !not_updated.is_empty() {
        let label = if not_updated.len() == 1 { "part" } else { "parts" };
        summary.push_str(&format!(" (default location not updated for {} {})", label, not_updated.join(", ")));
    }
    Ok(summary)
}

/// Apply one add/remove/count to a single item
pub async fn adjust_item(
    api: &dyn InventoryApi,
    item: &CachedStockItem,
    method: AdjustMethod,
    amount: f64,
) -> Result<String, InventoryError> {
    validate_amount(method, amount, item.original_quantity())?;

    let adjustment = StockAdjustment::new(
        method.stock_method(),
        vec![AdjustmentLine {
            pk: item.pk(),
            quantity: amount,
        }],
    );
    api.adjust_stock(&adjustment).await?;
    log::info!(
        "Adjusted {} ({} {})",
        item.title_name(),
        method.stock_method().as_str(),
        format_quantity(amount)
    );
    Ok(format!("Stock item adjusted ({})", method.stock_method().as_str()))
}

/// A check-in that passed the default-location check and awaits confirmation
#[derive(Debug, Clone)]
pub struct CheckInPlan {
    pub item: Arc<CachedStockItem>,
    pub part_name: String,
    pub previous_location: Option<StockLocation>,
    pub destination: StockLocation,
}

impl CheckInPlan {
    pub fn prompt(&self) -> String {
        format!(
            "Check in {} ({}) to {}?",
            self.item.title_name(),
            self.part_name,
            self.destination.name
        )
    }

    pub fn already_there(&self) -> bool {
        self.previous_location.as_ref().map(|l| l.pk) == Some(self.destination.pk)
    }
}

#[derive(Debug, Clone)]
pub struct CheckInOutcome {
    pub message: String,
    pub row: CheckInRow,
}

/// Resolve where a scanned item would be checked in.
/// Fails when the part has no default location.
pub async fn prepare_check_in(item: Arc<CachedStockItem>) -> Result<CheckInPlan, InventoryError> {
    let Some(destination) = item.default_location().await?.cloned() else {
        return Err(ValidationError::single(format!(
            "Cannot check-in {}: No default location",
            item.title_name()
        ))
        .into());
    };
    let part_name = item.part().await?.name.clone();
    let previous_location = item.location().await?.cloned();

    Ok(CheckInPlan {
        item,
        part_name,
        previous_location,
        destination,
    })
}

/// Move a confirmed check-in, skipping the call when nothing would change
pub async fn execute_check_in(
    api: &dyn InventoryApi,
    plan: CheckInPlan,
    now: NaiveDateTime,
) -> Result<CheckInOutcome, InventoryError> {
    let message = if plan.already_there() {
        format!("{} was already at {}", plan.item.title_name(), plan.destination.name)
    } else {
        transfer_items(
            api,
            std::slice::from_ref(&plan.item),
            &plan.destination,
            TransferOptions::default(),
        )
        .await?;
        format!("{} checked in to {}", plan.item.title_name(), plan.destination.name)
    };

    let previous = plan
        .previous_location
        .as_ref()
        .map(|l| l.name.clone())
        .unwrap_or_else(|| "None".to_string());
    let row = CheckInRow::new(
        plan.item.clone(),
        plan.part_name.clone(),
        previous,
        plan.destination.name.clone(),
        now,
    );
    Ok(CheckInOutcome { message, row })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeInventory;
    use crate::api::{Part, StockItem};
    use crate::inventory::row::RowModel;

    fn location(pk: i64, name: &str) -> StockLocation {
        StockLocation { pk, name: name.to_string(), description: None, parent: None, pathstring: None }
    }

    fn setup(default_location: Option<i64>) -> Arc<FakeInventory> {
        let fake = Arc::new(FakeInventory::new());
        fake.insert_part(Part {
            pk: 1,
            name: "Bolt".to_string(),
            description: None,
            default_location,
            in_stock: None,
        });
        fake.insert_location(location(10, "Bench"));
        fake.insert_location(location(20, "Bin 3"));
        fake
    }

    fn cached(fake: &Arc<FakeInventory>, pk: i64, quantity: f64, location: Option<i64>) -> Arc<CachedStockItem> {
        let item = StockItem { pk, part: 1, quantity, location, serial: None };
        Arc::new(CachedStockItem::new(item, fake.clone()))
    }

    #[test]
    fn test_validate_amount_rules() {
        assert!(validate_amount(AdjustMethod::Remove, 5.0, 5.0).is_ok());
        assert!(validate_amount(AdjustMethod::Remove, 6.0, 5.0).is_err());
        assert!(validate_amount(AdjustMethod::Remove, 0.0, 5.0).is_err());
        assert!(validate_amount(AdjustMethod::Add, 100.0, 5.0).is_ok());
        assert!(validate_amount(AdjustMethod::Add, 0.0, 5.0).is_err());
        assert!(validate_amount(AdjustMethod::Count, 0.0, 5.0).is_ok());
        assert!(validate_amount(AdjustMethod::Count, -1.0, 5.0).is_err());
    }

    #[test]
    fn test_parse_amount_reports_bad_input() {
        assert_eq!(parse_amount(" 3 ", AdjustMethod::Add, 1.0), Ok(3.0));
        let err = parse_amount("three", AdjustMethod::Add, 1.0).unwrap_err();
        assert_eq!(err.to_string(), "'three' is not a number");
        assert_eq!(AdjustMethod::Count.default_amount(4.0), 4.0);
        assert_eq!(AdjustMethod::Remove.default_amount(4.0), 1.0);
    }

    #[tokio::test]
    async fn test_partial_transfer_is_unsupported_and_sends_nothing() {
        let fake = setup(None);
        let item = cached(&fake, 5, 10.0, Some(10));
        item.set_quantity(4.0);

        let err = transfer_items(fake.as_ref(), &[item], &location(20, "Bin 3"), TransferOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Unsupported(_)));
        assert_eq!(fake.call_count("adjust_stock"), 0);
    }

    #[tokio::test]
    async fn test_transfer_is_one_batched_call() {
        let fake = setup(None);
        let items = vec![cached(&fake, 5, 10.0, Some(10)), cached(&fake, 6, 2.0, None)];
        let options = TransferOptions { set_default_location: true };

        let summary = transfer_items(fake.as_ref(), &items, &location(20, "Bin 3"), options)
            .await
            .unwrap();

        assert_eq!(summary, "Transferred 2 items to Bin 3");
        let adjustments = fake.adjustments();
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].items.len(), 2);
        assert_eq!(adjustments[0].location, Some(20));
        assert_eq!(fake.default_location_updates(), vec![(1, 20)]);
    }

    #[tokio::test]
    async fn test_failed_default_location_keeps_transfer_committed() {
        let fake = setup(None);
        fake.fail_next("set_default_location", 1);
        let items = vec![cached(&fake, 5, 10.0, Some(10))];
        let options = TransferOptions { set_default_location: true };

        let summary = transfer_items(fake.as_ref(), &items, &location(20, "Bin 3"), options)
            .await
            .unwrap();

        assert_eq!(summary, "Transferred 1 item to Bin 3 (default location not updated for part #1)");
        assert_eq!(fake.adjustments().len(), 1);
        assert!(fake.default_location_updates().is_empty());
    }

    #[tokio::test]
    async fn test_remote_rejection_is_recoverable_error() {
        let fake = setup(None);
        fake.reject_adjustments("Location is structural");
        let items = vec![cached(&fake, 5, 10.0, Some(10))];

        let err = transfer_items(fake.as_ref(), &items, &location(20, "Bin 3"), TransferOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Remote(_)));
        assert_eq!(err.to_string(), "Location is structural");
    }

    #[tokio::test]
    async fn test_adjust_revalidates_before_sending() {
        let fake = setup(None);
        let item = cached(&fake, 5, 3.0, None);

        let err = adjust_item(fake.as_ref(), &item, AdjustMethod::Remove, 4.0).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
        assert_eq!(fake.call_count("adjust_stock"), 0);

        let message = adjust_item(fake.as_ref(), &item, AdjustMethod::Count, 0.0).await.unwrap();
        assert_eq!(message, "Stock item adjusted (count)");
        assert_eq!(fake.adjustments()[0].method(), StockMethod::Count);
    }

    #[tokio::test]
    async fn test_check_in_without_default_location_fails_fast() {
        let fake = setup(None);
        let err = prepare_check_in(cached(&fake, 5, 1.0, Some(10))).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot check-in Stock #5: No default location");
    }

    #[tokio::test]
    async fn test_check_in_moves_item_to_default() {
        let fake = setup(Some(20));
        let plan = prepare_check_in(cached(&fake, 5, 1.0, Some(10))).await.unwrap();
        assert_eq!(plan.prompt(), "Check in Stock #5 (Bolt) to Bin 3?");

        let now = chrono::Local::now().naive_local();
        let outcome = execute_check_in(fake.as_ref(), plan, now).await.unwrap();
        assert_eq!(outcome.message, "Stock #5 checked in to Bin 3");
        assert_eq!(fake.adjustments().len(), 1);
        assert_eq!(
            outcome.row.value("previous_location").map(|v| v.to_string()),
            Some("Bench".to_string())
        );
    }

    #[tokio::test]
    async fn test_check_in_skips_call_when_already_there() {
        let fake = setup(Some(20));
        let plan = prepare_check_in(cached(&fake, 5, 1.0, Some(20))).await.unwrap();

        let now = chrono::Local::now().naive_local();
        let outcome = execute_check_in(fake.as_ref(), plan, now).await.unwrap();
        assert_eq!(outcome.message, "Stock #5 was already at Bin 3");
        assert_eq!(fake.call_count("adjust_stock"), 0);
    }
}
