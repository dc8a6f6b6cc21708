//! Date filtering and newest-first ordering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::telemetry::reading::{format_date, Reading};

/// User-controlled list/chart filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FilterState {
    pub selected_date: Option<NaiveDate>,
    pub show_all: bool,
}

/// Sort newest first by parsed timestamp. Malformed timestamps sort last.
///
/// The sort is stable, so equal timestamps keep their source order.
pub fn sort_newest_first(readings: &mut [Reading]) {
    readings.sort_by(|a, b| b.timestamp.parsed().cmp(&a.timestamp.parsed()));
}

/// Narrow `readings` to `selected_date` (if any) and order the result.
///
/// A date with no matching readings yields an empty set, never the full one.
#[must_use]
pub fn filter_readings(readings: &[Reading], selected_date: Option<NaiveDate>) -> Vec<Reading> {
    let mut filtered: Vec<Reading> = match selected_date {
        None => readings.to_vec(),
        Some(date) => {
            let wanted = format_date(date);
            readings
                .iter()
                .filter(|r| r.timestamp.date_prefix() == Some(wanted.as_str()))
                .cloned()
                .collect()
        }
    };

    sort_newest_first(&mut filtered);
    filtered
}
