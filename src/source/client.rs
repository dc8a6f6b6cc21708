use reqwest::Client;
use std::time::Duration;

use crate::config::{Config, SourceMode};
use crate::error::{AppError, AppResult};
use crate::source::models::{decode_batch, RawReading};
use crate::source::ReadingSource;

pub struct ReadingsClient {
    http_client: Client,
    base_url: String,
    mode: SourceMode,
}

impl ReadingsClient {
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.readings_api_url.clone(),
            mode: config.source_mode.clone(),
        })
    }

    /// Latest readings across all sensors.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Source` if the request fails or returns an error status.
    pub async fn get_readings(&self) -> AppResult<Vec<RawReading>> {
        self.get_json(&format!("{}/readings", self.base_url)).await
    }

    /// The current day's history stored under `collection`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Source` if the request fails or returns an error status.
    pub async fn get_history(&self, collection: &str) -> AppResult<Vec<RawReading>> {
        self.get_json(&format!("{}/history/{collection}", self.base_url))
            .await
    }

    async fn get_json(&self, url: &str) -> AppResult<Vec<RawReading>> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Source(format!("Request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Source("Rate limited (429)".to_string()));
        }

        if !response.status().is_success() {
            return Err(AppError::Source(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Source(format!("Failed to get response text: {e}")))?;

        decode_batch(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                url,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse readings response"
            );
            AppError::Source(format!("Failed to parse response: {e}"))
        })
    }
}

impl ReadingSource for ReadingsClient {
    async fn fetch_readings(&self) -> AppResult<Vec<RawReading>> {
        match &self.mode {
            SourceMode::Latest => self.get_readings().await,
            SourceMode::History(collection) => self.get_history(collection).await,
        }
    }
}
