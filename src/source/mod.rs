pub mod client;
pub mod models;

use std::future::Future;

pub use client::ReadingsClient;
pub use models::{decode_batch, RawReading};

use crate::error::AppResult;

/// Anything that can be polled for the current reading set.
///
/// Every error is treated as retryable by the poller.
pub trait ReadingSource: Send + Sync + 'static {
    fn fetch_readings(&self) -> impl Future<Output = AppResult<Vec<RawReading>>> + Send;
}
