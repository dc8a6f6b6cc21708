//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;

use telemetry_dash::dashboard::Clock;
use telemetry_dash::error::{AppError, AppResult};
use telemetry_dash::source::{RawReading, ReadingSource};
use telemetry_dash::telemetry::reading::{ingest_batch, DerivedPoint, Reading};
use telemetry_dash::telemetry::MetricSet;

pub fn water(sensor: &str, timestamp: &str, level: f64, ph: f64, turbidity: f64) -> RawReading {
    serde_json::from_value(json!({
        "sensorName": sensor,
        "timestamp": timestamp,
        "level": level,
        "ph": ph,
        "turbidity": turbidity,
    }))
    .unwrap()
}

pub fn level_only(timestamp: &str, level: f64) -> RawReading {
    serde_json::from_value(json!({
        "sensorName": "Tank",
        "timestamp": timestamp,
        "level": level,
    }))
    .unwrap()
}

pub fn readings(raw: &[RawReading]) -> Vec<Reading> {
    ingest_batch(raw, MetricSet::Water)
}

pub fn points(raw: &[RawReading]) -> Vec<DerivedPoint> {
    readings(raw).iter().map(DerivedPoint::from).collect()
}

/// Two readings on 10/05/2024 and one on 11/05/2024.
pub fn scenario() -> Vec<RawReading> {
    vec![
        level_only("10/05/2024, 08:00:00", 45.0),
        level_only("10/05/2024, 09:00:00", 55.0),
        level_only("11/05/2024, 08:00:00", 30.0),
    ]
}

pub fn date(d: u32, m: u32, y: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct FixedClock {
    pub today: NaiveDate,
}

impl FixedClock {
    pub fn on(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 11, 12, 0, 0).unwrap()
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}

/// Fails the first `failures` calls, then returns `readings`.
pub struct FlakySource {
    pub calls: AtomicU32,
    pub failures: u32,
    pub readings: Vec<RawReading>,
    pub delay: Duration,
}

impl FlakySource {
    pub fn new(failures: u32, readings: Vec<RawReading>) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures,
            readings,
            delay: Duration::ZERO,
        }
    }

    pub fn always_failing() -> Self {
        Self::new(u32::MAX, Vec::new())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReadingSource for FlakySource {
    async fn fetch_readings(&self) -> AppResult<Vec<RawReading>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if call <= self.failures {
            Err(AppError::Source(format!("connection refused (call {call})")))
        } else {
            Ok(self.readings.clone())
        }
    }
}
