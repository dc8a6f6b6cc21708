//! Ingestion and timestamp handling.
//!
//! Run with: cargo test --test reading_test

mod common;

use serde_json::json;
use telemetry_dash::source::{decode_batch, RawReading};
use telemetry_dash::telemetry::reading::{format_date, ingest_batch, Reading, Timestamp};
use telemetry_dash::telemetry::{MetricKind, MetricSet};

fn raw(value: serde_json::Value) -> RawReading {
    serde_json::from_value(value).unwrap()
}

#[test]
fn timestamp_parses_locale_format() {
    let ts = Timestamp::parse("10/05/2024, 09:30:15");
    assert!(ts.is_valid());
    assert_eq!(ts.date_prefix(), Some("10/05/2024"));
    assert_eq!(ts.time_label(), "09:30:15");
    assert_eq!(
        ts.parsed().unwrap(),
        common::date(10, 5, 2024).and_hms_opt(9, 30, 15).unwrap()
    );

    // No space after the comma
    let compact = Timestamp::parse("10/05/2024,08:00:00");
    assert_eq!(compact.date_prefix(), Some("10/05/2024"));
}

#[test]
fn malformed_timestamps_have_no_date_prefix() {
    for text in ["", "2024-05-10T08:00:00Z", "31/02/2024, 08:00:00", "10/05/2024", "garbage, 08:00:00"] {
        let ts = Timestamp::parse(text);
        assert!(!ts.is_valid(), "{text:?} should be malformed");
        assert_eq!(ts.date_prefix(), None);
    }
}

#[test]
fn format_date_matches_prefix_format() {
    assert_eq!(format_date(common::date(1, 2, 2024)), "01/02/2024");
}

#[test]
fn missing_metrics_get_defaults() {
    let reading = Reading::ingest(
        &raw(json!({ "sensorName": "A", "timestamp": "10/05/2024, 08:00:00" })),
        0,
        MetricSet::Water,
    );
    assert_eq!(reading.metric(MetricKind::Level), 0.0);
    assert_eq!(reading.metric(MetricKind::Ph), 7.0);
    assert_eq!(reading.metric(MetricKind::Turbidity), 0.0);
}

#[test]
fn non_numeric_metrics_get_defaults() {
    let reading = Reading::ingest(
        &raw(json!({ "level": "n/a", "ph": null, "turbidity": [1, 2], "timestamp": "x" })),
        0,
        MetricSet::Water,
    );
    assert_eq!(reading.metric(MetricKind::Level), 0.0);
    assert_eq!(reading.metric(MetricKind::Ph), 7.0);
    assert_eq!(reading.metric(MetricKind::Turbidity), 0.0);

    let nan = Reading::ingest(&raw(json!({ "ph": "NaN" })), 0, MetricSet::Water);
    assert_eq!(nan.metric(MetricKind::Ph), 7.0);
}

#[test]
fn numeric_strings_are_accepted() {
    let reading = Reading::ingest(
        &raw(json!({ "level": " 42.5 ", "ph": "6,8" })),
        0,
        MetricSet::Water,
    );
    assert_eq!(reading.metric(MetricKind::Level), 42.5);
    assert_eq!(reading.metric(MetricKind::Ph), 6.8);
}

#[test]
fn values_are_clamped_at_ingestion() {
    let low = Reading::ingest(&raw(json!({ "level": -5, "ph": -1 })), 0, MetricSet::Water);
    let high = Reading::ingest(&raw(json!({ "level": 150, "ph": 20 })), 0, MetricSet::Water);

    assert_eq!(low.metric(MetricKind::Level), 0.0);
    assert_eq!(low.metric(MetricKind::Ph), 0.0);
    assert_eq!(high.metric(MetricKind::Level), 100.0);
    assert_eq!(high.metric(MetricKind::Ph), 14.0);
}

#[test]
fn missing_sensor_name_gets_synthetic_label() {
    let batch = ingest_batch(
        &[
            raw(json!({ "sensorName": "Reservoir" })),
            raw(json!({ "sensorName": "   " })),
            raw(json!({})),
        ],
        MetricSet::Water,
    );
    let names: Vec<&str> = batch.iter().map(|r| r.sensor_name.as_str()).collect();
    assert_eq!(names, ["Reservoir", "Sensor 2", "Sensor 3"]);
}

#[test]
fn wire_aliases_and_unknown_fields() {
    let reading = Reading::ingest(
        &raw(json!({
            "sensor": "Probe",
            "timestamp": "11/05/2024, 10:00:00",
            "temperature": 21.4,
            "humidity": 55,
            "_id": "abc123",
        })),
        0,
        MetricSet::Climate,
    );
    assert_eq!(reading.sensor_name, "Probe");
    assert_eq!(reading.metric(MetricKind::Temperature), 21.4);
    assert_eq!(reading.metric(MetricKind::Humidity), 55.0);
    assert!(!reading.metrics.contains_key(&MetricKind::Level));
}

#[test]
fn reading_serializes_raw_timestamp() {
    let reading = Reading::ingest(
        &common::level_only("10/05/2024, 08:00:00", 45.0),
        0,
        MetricSet::Water,
    );
    let value = serde_json::to_value(&reading).unwrap();
    assert_eq!(value["timestamp"], "10/05/2024, 08:00:00");
    assert_eq!(value["metrics"]["level"], 45.0);
    assert_eq!(value["metrics"]["ph"], 7.0);
}

#[test]
fn sensor_label_keys_resolve_by_precedence() {
    let body = r#"[
        {"sensorName": "Tank A", "sensor": "HC-SR04", "timestamp": "10/05/2024, 08:00:00", "level": 40},
        {"sensorName": "Tank B", "timestamp": "10/05/2024, 09:00:00", "level": 50},
        {"sensorName": " ", "sensor": "Fallback", "level": 60}
    ]"#;
    let batch = decode_batch(body).unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0].sensor_name.as_deref(), Some("Tank A"));
    assert_eq!(batch[0].number("level"), Some(40.0));
    assert!(!batch[0].fields.contains_key("sensor"));
    assert_eq!(batch[1].sensor_name.as_deref(), Some("Tank B"));
    assert_eq!(batch[2].sensor_name.as_deref(), Some("Fallback"));
}

#[test]
fn non_object_elements_do_not_sink_the_batch() {
    let body = r#"[
        null,
        {"sensorName": "Tank B", "timestamp": "10/05/2024, 09:00:00", "level": 50},
        42,
        "junk"
    ]"#;
    let batch = decode_batch(body).unwrap();
    assert_eq!(batch.len(), 1);

    let readings = ingest_batch(&batch, MetricSet::Water);
    assert_eq!(readings[0].sensor_name, "Tank B");
    assert_eq!(readings[0].metric(MetricKind::Level), 50.0);
}

#[test]
fn non_array_body_is_an_error() {
    assert!(decode_batch(r#"{"level": 10}"#).is_err());
    assert!(decode_batch("not json").is_err());
}

#[test]
fn metric_set_names() {
    assert_eq!(MetricSet::from("climate"), MetricSet::Climate);
    assert_eq!(MetricSet::from(" DHT "), MetricSet::Climate);
    assert_eq!(MetricSet::from("water"), MetricSet::Water);
    assert_eq!(MetricSet::from("unknown"), MetricSet::Water);
    assert_eq!(MetricSet::Climate.kinds(), [MetricKind::Temperature, MetricKind::Humidity]);
}
