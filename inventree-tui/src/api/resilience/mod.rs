//! Retry and concurrency limiting for background API work

pub mod concurrency;
pub mod config;
pub mod retry;

pub use concurrency::ConcurrencyLimiter;
pub use config::{ConcurrencyConfig, RetryConfig};
pub use retry::RetryPolicy;
