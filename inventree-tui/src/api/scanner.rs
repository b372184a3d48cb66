//! Barcode scan resolution
//!
//! A scan payload is keyed by model type (`{"stockitem": {"pk": 4, ...}}`).
//! Only model types in the caller's whitelist are accepted; anything else is
//! reported back to the operator.

use serde_json::Value;
use thiserror::Error;

use super::client::InventoryApi;
use super::error::ApiError;
use super::models::{ModelType, ScannedObject};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Nothing to scan")]
    Empty,

    #[error("Item found but not in whitelist: {found}")]
    NotInWhitelist { found: String },

    #[error("Scan response had no primary key for {0}")]
    MissingPk(&'static str),

    #[error("{0}")]
    Api(#[from] ApiError),
}

/// Pick the first whitelisted model type present in a scan payload
pub fn item_class(payload: &Value, whitelist: &[ModelType]) -> Option<ModelType> {
    whitelist
        .iter()
        .copied()
        .find(|model| payload.get(model.scan_key()).is_some())
}

/// Resolve a barcode to a fully fetched object of a whitelisted type
pub async fn scan_barcode(
    api: &dyn InventoryApi,
    barcode: &str,
    whitelist: &[ModelType],
) -> Result<ScannedObject, ScanError> {
    let barcode = barcode.trim();
    if barcode.is_empty() {
        return Err(ScanError::Empty);
    }

    let payload = api.scan_barcode(barcode).await?;
    let Some(model) = item_class(&payload, whitelist) else {
        if let Some(Value::String(error)) = payload.get("error") {
            return Err(ApiError::Rejected(error.clone()).into());
        }
        return Err(ScanError::NotInWhitelist {
            found: describe_payload(&payload),
        });
    };

    let pk = payload
        .get(model.scan_key())
        .and_then(|obj| obj.get("pk"))
        .and_then(Value::as_i64)
        .ok_or(ScanError::MissingPk(model.scan_key()))?;

    log::debug!("Scanned {} #{}", model.label(), pk);

    let object = match model {
        ModelType::StockItem => ScannedObject::StockItem(api.get_stock_item(pk).await?),
        ModelType::StockLocation => ScannedObject::StockLocation(api.get_location(pk).await?),
    };
    Ok(object)
}

fn describe_payload(payload: &Value) -> String {
    match payload {
        Value::Object(map) => {
            let keys: Vec<&str> = map
                .keys()
                .map(String::as_str)
                .filter(|k| !matches!(*k, "barcode_data" | "barcode_hash" | "plugin" | "success"))
                .collect();
            if keys.is_empty() {
                "unknown barcode".to_string()
            } else {
                keys.join(", ")
            }
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeInventory;
    use crate::api::models::StockItem;

    #[test]
    fn test_item_class_respects_whitelist_order() {
        let payload = serde_json::json!({"stocklocation": {"pk": 1}, "stockitem": {"pk": 2}});
        assert_eq!(
            item_class(&payload, &[ModelType::StockItem, ModelType::StockLocation]),
            Some(ModelType::StockItem)
        );
        assert_eq!(item_class(&serde_json::json!({"part": {"pk": 3}}), &[ModelType::StockItem]), None);
    }

    #[tokio::test]
    async fn test_scan_fetches_whitelisted_object() {
        let fake = FakeInventory::new();
        fake.insert_stock_item(StockItem { pk: 4, part: 1, quantity: 3.0, location: None, serial: None });
        fake.register_barcode("ITEM-4", serde_json::json!({"stockitem": {"pk": 4}}));

        let scanned = scan_barcode(&fake, "ITEM-4", &[ModelType::StockItem]).await.unwrap();
        assert!(matches!(scanned, ScannedObject::StockItem(ref item) if item.pk == 4));
    }

    #[tokio::test]
    async fn test_scan_rejects_type_outside_whitelist() {
        let fake = FakeInventory::new();
        fake.register_barcode("LOC-1", serde_json::json!({"stocklocation": {"pk": 1}, "plugin": "InvenTreeBarcode"}));

        let err = scan_barcode(&fake, "LOC-1", &[ModelType::StockItem]).await.unwrap_err();
        assert!(matches!(err, ScanError::NotInWhitelist { ref found } if found == "stocklocation"));
    }

    #[tokio::test]
    async fn test_scan_empty_input_makes_no_call() {
        let fake = FakeInventory::new();
        let err = scan_barcode(&fake, "   ", &[ModelType::StockItem]).await.unwrap_err();
        assert!(matches!(err, ScanError::Empty));
        assert_eq!(fake.call_count("scan_barcode"), 0);
    }
}
