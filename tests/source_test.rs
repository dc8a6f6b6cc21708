//! Readings API client and wire model.
//!
//! Run with: cargo test --test source_test

use std::time::Duration;

use tokio_test::{assert_err, assert_ok};

use telemetry_dash::config::{Config, Deployment, PollSettings, SourceMode};
use telemetry_dash::error::AppError;
use telemetry_dash::source::{RawReading, ReadingSource, ReadingsClient};
use telemetry_dash::telemetry::geometry::Viewport;
use telemetry_dash::telemetry::MetricSet;

fn config(url: &str, mode: SourceMode) -> Config {
    Config {
        readings_api_url: url.to_string(),
        source_mode: mode,
        request_timeout_seconds: 2,
        metric_set: MetricSet::Water,
        poll: PollSettings::default(),
        date_debounce_ms: 300,
        list_page_size: 3,
        viewport: Viewport::default(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        deployment: Deployment::Local,
    }
}

#[test]
fn batch_payload_deserializes() {
    let body = r#"[
        {"sensorName": "Reservoir", "timestamp": "10/05/2024, 08:00:00", "level": 45, "ph": "7.1", "turbidity": null},
        {"timestamp": 1715328000, "level": "oops"},
        {}
    ]"#;
    let batch: Vec<RawReading> = assert_ok!(serde_json::from_str(body));

    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0].sensor_name.as_deref(), Some("Reservoir"));
    assert_eq!(batch[0].number("level"), Some(45.0));
    assert_eq!(batch[0].number("ph"), Some(7.1));
    assert_eq!(batch[0].number("turbidity"), None);
    assert_eq!(batch[1].timestamp.as_deref(), Some("1715328000"));
    assert_eq!(batch[1].number("level"), None);
    assert!(batch[2].sensor_name.is_none());
}

#[test]
fn unreachable_api_is_a_source_error() {
    let client = assert_ok!(ReadingsClient::new(&config(
        "http://127.0.0.1:9",
        SourceMode::History("tank".to_string()),
    )));

    let result = tokio_test::block_on(async {
        tokio::time::timeout(Duration::from_secs(5), client.fetch_readings()).await
    });

    // Either refused outright or timed out; never a successful batch
    if let Ok(fetched) = result {
        let err = assert_err!(fetched);
        assert!(matches!(err, AppError::Source(_)));
    }
}
