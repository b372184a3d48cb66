//! Recent stock history
//!
//! History is read newest first in pages of `page_size`. Paging stops at the
//! newest entry already on screen, at the edge of the lookback window, or at
//! the end of the data. Part names are loaded per row afterwards, bounded by
//! the concurrency limiter and retried.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use std::sync::Arc;

use super::rows::TrackingRow;
use crate::api::resilience::{ConcurrencyLimiter, RetryConfig, RetryPolicy};
use crate::api::{ApiError, InventoryApi};

#[derive(Clone)]
pub struct HistoryFetcher {
    api: Arc<dyn InventoryApi>,
    limiter: ConcurrencyLimiter,
    retry: RetryPolicy,
    page_size: u32,
    lookback: Duration,
}

impl HistoryFetcher {
    /// Part-name lookups share `limiter` with the other background loads
    pub fn new(api: Arc<dyn InventoryApi>, limiter: ConcurrencyLimiter, page_size: u32, lookback: Duration) -> Self {
        Self {
            api,
            limiter,
            retry: RetryPolicy::new(RetryConfig::default()),
            page_size: page_size.max(1),
            lookback,
        }
    }

    #[cfg(test)]
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = RetryPolicy::new(config);
        self
    }

    /// Entries newer than `most_recent` (a tracking pk) and inside the
    /// lookback window, newest first
    pub async fn fetch_recent(&self, most_recent: Option<i64>, now: NaiveDateTime) -> Result<Vec<TrackingRow>> {
        let oldest = now - self.lookback;
        let mut rows = Vec::new();
        let mut offset = 0u32;

        loop {
            let page = self
                .retry
                .execute("fetch stock history", || self.api.list_tracking(self.page_size, offset))
                .await
                .with_context(|| format!("Failed to fetch stock history at offset {}", offset))?;
            let page_len = page.len();

            let mut reached_known = false;
            for entry in page {
                if most_recent.is_some_and(|pk| entry.pk <= pk) {
                    reached_known = true;
                    break;
                }
                let pk = entry.pk;
                let Some(row) = TrackingRow::from_entry(entry) else {
                    log::warn!("Skipping tracking entry #{} with unreadable date", pk);
                    continue;
                };
                if row.timestamp() < oldest {
                    reached_known = true;
                    break;
                }
                rows.push(row);
            }

            if reached_known || page_len < self.page_size as usize {
                break;
            }
            offset += self.page_size;
        }

        log::debug!("Fetched {} new stock history entries", rows.len());
        Ok(rows)
    }

    /// Name of the part a stock item belongs to
    pub async fn load_part_name(&self, stock_pk: i64) -> Result<String> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .context("Part name lookup limiter closed")?;

        let name = self
            .retry
            .execute("load part name", || async {
                let item = self.api.get_stock_item(stock_pk).await?;
                let part = self.api.get_part(item.part).await?;
                Ok::<_, ApiError>(part.name)
            })
            .await
            .with_context(|| format!("Failed to load part name for Stock #{}", stock_pk))?;
        Ok(name)
    }
}
