//! InvenTree REST client
//!
//! `InventoryApi` is the seam the rest of the crate talks to; `InvenTreeClient`
//! is the HTTP implementation used by the binary. Tests use an in-memory fake.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::error::ApiError;
use super::models::{Page, Part, StockAdjustment, StockItem, StockLocation, TrackingEntry};

/// Operations the console consumes from the remote inventory system
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Resolve a barcode. Returns the raw scan payload keyed by model type.
    async fn scan_barcode(&self, barcode: &str) -> Result<Value, ApiError>;

    async fn get_stock_item(&self, pk: i64) -> Result<StockItem, ApiError>;

    async fn get_location(&self, pk: i64) -> Result<StockLocation, ApiError>;

    async fn get_part(&self, pk: i64) -> Result<Part, ApiError>;

    async fn search_parts(&self, search: &str) -> Result<Vec<Part>, ApiError>;

    async fn search_locations(&self, search: &str) -> Result<Vec<StockLocation>, ApiError>;

    /// All stock items of a part
    async fn list_stock_items(&self, part: i64) -> Result<Vec<StockItem>, ApiError>;

    /// Stock history, newest first
    async fn list_tracking(&self, limit: u32, offset: u32) -> Result<Vec<TrackingEntry>, ApiError>;

    /// Apply one batched transfer/add/remove/count
    async fn adjust_stock(&self, adjustment: &StockAdjustment) -> Result<(), ApiError>;

    async fn set_default_location(&self, part: i64, location: i64) -> Result<(), ApiError>;
}

/// HTTP client for an InvenTree server
#[derive(Debug, Clone)]
pub struct InvenTreeClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl InvenTreeClient {
    pub fn new(host: &str, token: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("inventree-tui/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: host.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log::debug!("InvenTree returned {}: {}", status, body);
        Err(rejection_from_body(status.as_u16(), body))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let response = self.send(self.http.get(self.url(path)).query(query)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>, ApiError> {
        let value: Value = self.get_json(path, query).await?;
        decode_list(value).map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
    }
}

/// Turn a failed response body into the most specific error available.
/// InvenTree reports business-rule failures as `{"error": ...}` or as
/// field-keyed lists of messages.
fn rejection_from_body(status: u16, body: String) -> ApiError {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body) {
        if let Some(Value::String(error)) = map.get("error").or_else(|| map.get("detail")) {
            return ApiError::Rejected(error.clone());
        }
        if status == 400 {
            let messages: Vec<String> = map
                .iter()
                .map(|(field, value)| match value {
                    Value::Array(items) => {
                        let parts: Vec<String> = items
                            .iter()
                            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                            .collect();
                        format!("{}: {}", field, parts.join(", "))
                    }
                    other => format!("{}: {}", field, other),
                })
                .collect();
            if !messages.is_empty() {
                return ApiError::Rejected(messages.join("; "));
            }
        }
    }
    ApiError::Status { status, body }
}

/// List endpoints return a bare array, or a `{count, results}` page when
/// `limit` is given. Accept both.
fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, serde_json::Error> {
    match value {
        Value::Object(map) if map.contains_key("results") => {
            let page: Page<T> = serde_json::from_value(Value::Object(map))?;
            Ok(page.results)
        }
        other => serde_json::from_value(other),
    }
}

#[async_trait]
impl InventoryApi for InvenTreeClient {
    async fn scan_barcode(&self, barcode: &str) -> Result<Value, ApiError> {
        let request = self
            .http
            .post(self.url("barcode/"))
            .json(&serde_json::json!({ "barcode": barcode }));
        let response = self.send(request).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(format!("barcode: {}", e)))
    }

    async fn get_stock_item(&self, pk: i64) -> Result<StockItem, ApiError> {
        self.get_json(&format!("stock/{}/", pk), &[]).await
    }

    async fn get_location(&self, pk: i64) -> Result<StockLocation, ApiError> {
        self.get_json(&format!("stock/location/{}/", pk), &[]).await
    }

    async fn get_part(&self, pk: i64) -> Result<Part, ApiError> {
        self.get_json(&format!("part/{}/", pk), &[]).await
    }

    async fn search_parts(&self, search: &str) -> Result<Vec<Part>, ApiError> {
        self.get_list("part/", &[("search", search.to_string())]).await
    }

    async fn search_locations(&self, search: &str) -> Result<Vec<StockLocation>, ApiError> {
        self.get_list("stock/location/", &[("search", search.to_string())]).await
    }

    async fn list_stock_items(&self, part: i64) -> Result<Vec<StockItem>, ApiError> {
        self.get_list("stock/", &[("part", part.to_string())]).await
    }

    async fn list_tracking(&self, limit: u32, offset: u32) -> Result<Vec<TrackingEntry>, ApiError> {
        self.get_list(
            "stock/track/",
            &[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("ordering", "-date".to_string()),
            ],
        )
        .await
    }

    async fn adjust_stock(&self, adjustment: &StockAdjustment) -> Result<(), ApiError> {
        let path = format!("stock/{}/", adjustment.method().as_str());
        log::info!(
            "Submitting stock {} for {} item(s)",
            adjustment.method().as_str(),
            adjustment.items.len()
        );
        self.send(self.http.post(self.url(&path)).json(adjustment)).await?;
        Ok(())
    }

    async fn set_default_location(&self, part: i64, location: i64) -> Result<(), ApiError> {
        let request = self
            .http
            .patch(self.url(&format!("part/{}/", part)))
            .json(&serde_json::json!({ "default_location": location }));
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = InvenTreeClient::new("https://inventory.example.com/", "abc").unwrap();
        assert_eq!(client.url("/stock/4/"), "https://inventory.example.com/api/stock/4/");
    }

    #[test]
    fn test_decode_list_accepts_page_and_array() {
        let page = serde_json::json!({"count": 1, "next": null, "results": [{"pk": 1, "name": "Shelf"}]});
        let array = serde_json::json!([{"pk": 2, "name": "Bin"}]);

        let from_page: Vec<StockLocation> = decode_list(page).unwrap();
        let from_array: Vec<StockLocation> = decode_list(array).unwrap();

        assert_eq!(from_page[0].name, "Shelf");
        assert_eq!(from_array[0].pk, 2);
    }

    #[test]
    fn test_rejection_prefers_error_field() {
        let err = rejection_from_body(400, r#"{"error": "No match found for barcode data"}"#.to_string());
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "No match found for barcode data"));
    }

    #[test]
    fn test_rejection_flattens_field_errors() {
        let err = rejection_from_body(400, r#"{"quantity": ["Quantity must be greater than zero"]}"#.to_string());
        assert_eq!(err.to_string(), "quantity: Quantity must be greater than zero");
    }

    #[test]
    fn test_rejection_falls_back_to_status() {
        let err = rejection_from_body(502, "Bad Gateway".to_string());
        assert!(matches!(err, ApiError::Status { status: 502, .. }));
    }
}
