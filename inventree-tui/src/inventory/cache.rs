//! Cached stock items
//!
//! A `CachedStockItem` wraps a stock item fetched from the server. Related
//! objects (part, location, default location) are fetched on first access and
//! kept for the lifetime of the wrapper; a new scan produces a new wrapper.
//! The quantity can be overridden locally without touching the server, and
//! the override is seen by every row sharing the same `Arc`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};
use tokio::sync::OnceCell;

use crate::api::{ApiError, InventoryApi, Part, StockItem, StockLocation};

pub struct CachedStockItem {
    item: StockItem,
    api: Arc<dyn InventoryApi>,
    part: OnceCell<Part>,
    location: OnceCell<Option<StockLocation>>,
    default_location: OnceCell<Option<StockLocation>>,
    quantity: RwLock<Option<f64>>,
}

impl CachedStockItem {
    pub fn new(item: StockItem, api: Arc<dyn InventoryApi>) -> Self {
        Self {
            item,
            api,
            part: OnceCell::new(),
            location: OnceCell::new(),
            default_location: OnceCell::new(),
            quantity: RwLock::new(None),
        }
    }

    pub fn pk(&self) -> i64 {
        self.item.pk
    }

    pub fn stock_item(&self) -> &StockItem {
        &self.item
    }

    pub fn title_name(&self) -> String {
        format!("Stock #{}", self.item.pk)
    }

    pub async fn part(&self) -> Result<&Part, ApiError> {
        self.part
            .get_or_try_init(|| self.api.get_part(self.item.part))
            .await
    }

    /// Current location, `None` when the item is not placed anywhere
    pub async fn location(&self) -> Result<Option<&StockLocation>, ApiError> {
        let location = self
            .location
            .get_or_try_init(|| async {
                match self.item.location {
                    Some(pk) => self.api.get_location(pk).await.map(Some),
                    None => Ok(None),
                }
            })
            .await?;
        Ok(location.as_ref())
    }

    /// The part's default location, `None` when none is configured
    pub async fn default_location(&self) -> Result<Option<&StockLocation>, ApiError> {
        let location = self
            .default_location
            .get_or_try_init(|| async {
                match self.part().await?.default_location {
                    Some(pk) => self.api.get_location(pk).await.map(Some),
                    None => Ok(None),
                }
            })
            .await?;
        Ok(location.as_ref())
    }

    pub async fn location_name(&self) -> Result<String, ApiError> {
        Ok(self
            .location()
            .await?
            .map(|l| l.name.clone())
            .unwrap_or_else(|| "None".to_string()))
    }

    /// Quantity the operator intends to commit
    pub fn quantity(&self) -> f64 {
        self.quantity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .unwrap_or(self.item.quantity)
    }

    pub fn set_quantity(&self, quantity: f64) {
        *self
            .quantity
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(quantity);
    }

    /// Last quantity reported by the server
    pub fn original_quantity(&self) -> f64 {
        self.item.quantity
    }

    pub fn is_quantity_overridden(&self) -> bool {
        self.quantity() != self.original_quantity()
    }
}

impl PartialEq for CachedStockItem {
    fn eq(&self, other: &Self) -> bool {
        self.item.pk == other.item.pk
    }
}

impl Eq for CachedStockItem {}

impl Hash for CachedStockItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.item.pk.hash(state);
    }
}

impl fmt::Debug for CachedStockItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedStockItem")
            .field("pk", &self.item.pk)
            .field("part", &self.item.part)
            .field("quantity", &self.quantity())
            .field("original_quantity", &self.item.quantity)
            .finish()
    }
}

/// Full `A/B/C` path of a location, walking parents when the server did not
/// send a pathstring
pub async fn location_path(api: &dyn InventoryApi, location: &StockLocation) -> Result<String, ApiError> {
    if let Some(path) = location.pathstring.as_deref().filter(|p| !p.is_empty()) {
        return Ok(path.to_string());
    }

    let mut names = vec![location.name.clone()];
    let mut parent = location.parent;
    // Guard against cycles in malformed trees
    for _ in 0..32 {
        let Some(pk) = parent else { break };
        let next = api.get_location(pk).await?;
        names.push(next.name.clone());
        parent = next.parent;
    }
    names.reverse();
    Ok(names.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeInventory;

    fn sample_item(pk: i64, part: i64, quantity: f64, location: Option<i64>) -> StockItem {
        StockItem { pk, part, quantity, location, serial: None }
    }

    fn location(pk: i64, name: &str, parent: Option<i64>) -> StockLocation {
        StockLocation { pk, name: name.to_string(), description: None, parent, pathstring: None }
    }

    fn fixture() -> Arc<FakeInventory> {
        let fake = Arc::new(FakeInventory::new());
        fake.insert_part(Part {
            pk: 1,
            name: "Bolt".to_string(),
            description: None,
            default_location: Some(20),
            in_stock: None,
        });
        fake.insert_location(location(10, "Shelf A", None));
        fake.insert_location(location(20, "Bin 3", Some(10)));
        fake
    }

    #[tokio::test]
    async fn test_part_is_fetched_once() {
        let fake = fixture();
        let cached = CachedStockItem::new(sample_item(5, 1, 10.0, Some(10)), fake.clone());

        assert_eq!(cached.part().await.unwrap().name, "Bolt");
        assert_eq!(cached.part().await.unwrap().name, "Bolt");
        assert_eq!(fake.call_count("get_part"), 1);
    }

    #[tokio::test]
    async fn test_missing_location_is_none_without_request() {
        let fake = fixture();
        let cached = CachedStockItem::new(sample_item(5, 1, 10.0, None), fake.clone());

        assert!(cached.location().await.unwrap().is_none());
        assert_eq!(cached.location_name().await.unwrap(), "None");
        assert_eq!(fake.call_count("get_location"), 0);
    }

    #[tokio::test]
    async fn test_default_location_comes_from_part() {
        let fake = fixture();
        let cached = CachedStockItem::new(sample_item(5, 1, 10.0, Some(10)), fake.clone());

        let default = cached.default_location().await.unwrap().unwrap();
        assert_eq!(default.name, "Bin 3");
    }

    #[test]
    fn test_quantity_override_keeps_original() {
        let fake = fixture();
        let cached = CachedStockItem::new(sample_item(5, 1, 10.0, None), fake);

        assert_eq!(cached.quantity(), 10.0);
        assert!(!cached.is_quantity_overridden());

        cached.set_quantity(4.0);
        assert_eq!(cached.quantity(), 4.0);
        assert_eq!(cached.original_quantity(), 10.0);
        assert!(cached.is_quantity_overridden());
    }

    #[test]
    fn test_equality_by_pk_only() {
        let fake = fixture();
        let a = CachedStockItem::new(sample_item(5, 1, 10.0, None), fake.clone());
        let b = CachedStockItem::new(sample_item(5, 2, 3.0, Some(10)), fake.clone());
        let c = CachedStockItem::new(sample_item(6, 1, 10.0, None), fake);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_location_path_walks_parents() {
        let fake = fixture();
        let bin = location(20, "Bin 3", Some(10));
        assert_eq!(location_path(fake.as_ref(), &bin).await.unwrap(), "Shelf A/Bin 3");

        let with_path = StockLocation {
            pathstring: Some("Warehouse/Shelf A".to_string()),
            ..location(10, "Shelf A", None)
        };
        assert_eq!(location_path(fake.as_ref(), &with_path).await.unwrap(), "Warehouse/Shelf A");
    }
}
