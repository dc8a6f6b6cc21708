use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::telemetry::geometry::Viewport;
use crate::telemetry::metric::MetricSet;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

/// Which upstream endpoint a poll hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMode {
    /// `GET /readings`
    Latest,
    /// `GET /history/{collection}`
    History(String),
}

/// Polling knobs shared by the scheduler and the dashboard runtime.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Total attempts per tick, the first call included.
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            max_attempts: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Readings API
    pub readings_api_url: String,
    pub source_mode: SourceMode,
    pub request_timeout_seconds: u64,

    // Dashboard
    pub metric_set: MetricSet,
    pub poll: PollSettings,
    pub date_debounce_ms: u64,
    pub list_page_size: usize,
    pub viewport: Viewport,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Application metadata
    pub deployment: Deployment,
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Viewport::default();
        let poll_defaults = PollSettings::default();

        Ok(Self {
            // Readings API
            readings_api_url: env::var("READINGS_API_URL")
                .map_err(|_| ConfigError::Missing("READINGS_API_URL"))?
                .trim_end_matches('/')
                .to_string(),
            source_mode: match env::var("READINGS_COLLECTION") {
                Ok(collection) if !collection.trim().is_empty() => {
                    SourceMode::History(collection.trim().to_string())
                }
                _ => SourceMode::Latest,
            },
            request_timeout_seconds: parse_or("READINGS_REQUEST_TIMEOUT_SECONDS", 10),

            // Dashboard
            metric_set: MetricSet::from(
                env::var("METRIC_SET")
                    .unwrap_or_else(|_| "water".to_string())
                    .as_str(),
            ),
            poll: PollSettings {
                interval: Duration::from_millis(parse_or(
                    "POLL_INTERVAL_MS",
                    poll_defaults.interval.as_millis() as u64,
                )),
                max_attempts: parse_or("POLL_MAX_ATTEMPTS", poll_defaults.max_attempts).max(1),
                retry_delay: Duration::from_millis(parse_or(
                    "POLL_RETRY_DELAY_MS",
                    poll_defaults.retry_delay.as_millis() as u64,
                )),
            },
            date_debounce_ms: parse_or("DATE_DEBOUNCE_MS", 300),
            list_page_size: parse_or("LIST_PAGE_SIZE", 3),
            viewport: Viewport {
                origin_x: parse_or("CHART_ORIGIN_X", defaults.origin_x),
                baseline_y: parse_or("CHART_BASELINE_Y", defaults.baseline_y),
                width: parse_or("CHART_WIDTH", defaults.width),
                height: parse_or("CHART_HEIGHT", defaults.height),
                view_box_width: parse_or("CHART_VIEWBOX_WIDTH", defaults.view_box_width),
                view_box_height: parse_or("CHART_VIEWBOX_HEIGHT", defaults.view_box_height),
                tooltip_width: parse_or("TOOLTIP_WIDTH", defaults.tooltip_width),
                tooltip_height: parse_or("TOOLTIP_HEIGHT", defaults.tooltip_height),
                tooltip_margin: parse_or("TOOLTIP_MARGIN", defaults.tooltip_margin),
            },

            // API settings
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: parse_or("API_PORT", 3000),

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    #[must_use]
    pub fn date_debounce(&self) -> Duration {
        Duration::from_millis(self.date_debounce_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
