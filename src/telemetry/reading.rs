//! Reading data model and the ingestion boundary.
//!
//! Raw upstream payloads are validated exactly once here. Everything
//! downstream only sees sanitized, clamped values.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::source::models::RawReading;
use crate::telemetry::metric::{MetricKind, MetricSet};

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Locale-formatted capture time, `"DD/MM/YYYY, HH:MM:SS"`.
///
/// The raw text is kept because date filtering matches on its literal date
/// prefix; `parsed` is only used for ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    parsed: Option<NaiveDateTime>,
}

impl Timestamp {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let parsed = raw.split_once(',').and_then(|(date, time)| {
            let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()?;
            let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).ok()?;
            Some(date.and_time(time))
        });
        Self { raw, parsed }
    }

    #[must_use]
    pub fn missing() -> Self {
        Self {
            raw: String::new(),
            parsed: None,
        }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn parsed(&self) -> Option<NaiveDateTime> {
        self.parsed
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }

    /// Text before the comma, `None` when the timestamp is malformed.
    #[must_use]
    pub fn date_prefix(&self) -> Option<&str> {
        self.parsed?;
        self.raw.split_once(',').map(|(date, _)| date.trim())
    }

    /// Short label for chart axes and tooltips.
    #[must_use]
    pub fn time_label(&self) -> String {
        match (self.parsed, self.raw.split_once(',')) {
            (Some(_), Some((_, time))) => time.trim().to_string(),
            _ => self.raw.clone(),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// `DD/MM/YYYY` as used in timestamp date prefixes.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// One sanitized sensor sample.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Reading {
    pub sensor_name: String,
    #[schema(value_type = String, example = "10/05/2024, 08:00:00")]
    pub timestamp: Timestamp,
    #[schema(value_type = Object)]
    pub metrics: BTreeMap<MetricKind, f64>,
}

impl Reading {
    /// Validate one raw payload. `position` is the zero-based index within
    /// its poll batch and drives the synthetic `"Sensor N"` label.
    #[must_use]
    pub fn ingest(raw: &RawReading, position: usize, metric_set: MetricSet) -> Self {
        let sensor_name = raw
            .sensor_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("Sensor {}", position + 1), ToString::to_string);

        let timestamp = raw
            .timestamp
            .as_deref()
            .map_or_else(Timestamp::missing, Timestamp::parse);

        let metrics = metric_set
            .kinds()
            .iter()
            .map(|&kind| (kind, kind.descriptor().sanitize(raw.number(kind.key()))))
            .collect();

        Self {
            sensor_name,
            timestamp,
            metrics,
        }
    }

    /// Sanitized value; the metric's default if this deployment never reports it.
    #[must_use]
    pub fn metric(&self, kind: MetricKind) -> f64 {
        self.metrics
            .get(&kind)
            .copied()
            .unwrap_or(kind.descriptor().default_value)
    }
}

/// Ingest a whole poll batch.
pub fn ingest_batch(raw: &[RawReading], metric_set: MetricSet) -> Vec<Reading> {
    let readings: Vec<Reading> = raw
        .iter()
        .enumerate()
        .map(|(i, r)| Reading::ingest(r, i, metric_set))
        .collect();

    let malformed = readings.iter().filter(|r| !r.timestamp.is_valid()).count();
    if malformed > 0 {
        tracing::warn!(
            malformed,
            total = readings.len(),
            "Readings with missing or malformed timestamps"
        );
    }

    readings
}

/// Chart-ready projection of a reading.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DerivedPoint {
    #[schema(value_type = Object)]
    pub metrics: BTreeMap<MetricKind, f64>,
    pub sensor_label: String,
    pub time_label: String,
}

impl From<&Reading> for DerivedPoint {
    fn from(reading: &Reading) -> Self {
        Self {
            metrics: reading.metrics.clone(),
            sensor_label: reading.sensor_name.clone(),
            time_label: reading.timestamp.time_label(),
        }
    }
}

impl DerivedPoint {
    #[must_use]
    pub fn metric(&self, kind: MetricKind) -> f64 {
        self.metrics
            .get(&kind)
            .copied()
            .unwrap_or(kind.descriptor().default_value)
    }
}
