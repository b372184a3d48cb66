//! Concurrency limiter
//!
//! Caps how many background lookups (part names for history rows, stock
//! listings) hit the inventory server at the same time.

use super::config::ConcurrencyConfig;
use log::debug;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Semaphore-based concurrency limiter
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    config: ConcurrencyConfig,
}

impl ConcurrencyLimiter {
    pub fn new(config: ConcurrencyConfig) -> Self {
        let permits = if config.enabled {
            config.max_concurrent_requests.max(1)
        } else {
            Semaphore::MAX_PERMITS
        };

        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            config,
        }
    }

    /// Limiter allowing `max` requests in flight
    #[cfg(test)]
    pub fn with_limit(max: usize) -> Self {
        Self::new(ConcurrencyConfig {
            max_concurrent_requests: max,
            enabled: true,
        })
    }

    /// Wait for a permit. The permit is released when dropped.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        if self.config.enabled && self.semaphore.available_permits() == 0 {
            debug!(
                "Concurrency limiter: waiting for permit ({} in use)",
                self.config.max_concurrent_requests
            );
        }
        self.semaphore.clone().acquire_owned().await
    }
}
