//! Mean/min/max per metric over the chart's working set.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::telemetry::metric::MetricKind;
use crate::telemetry::reading::DerivedPoint;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct Statistics {
    /// Rounded to the metric's precision.
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Statistics {
    /// Statistics of one metric. Empty input yields all zeros.
    #[must_use]
    pub fn compute(kind: MetricKind, points: &[DerivedPoint]) -> Self {
        if points.is_empty() {
            return Self::default();
        }

        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in points.iter().map(|p| p.metric(kind)) {
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        Self {
            mean: kind.descriptor().round(sum / points.len() as f64),
            min,
            max,
        }
    }
}

/// Statistics for every metric in `kinds`.
#[must_use]
pub fn aggregate(points: &[DerivedPoint], kinds: &[MetricKind]) -> BTreeMap<MetricKind, Statistics> {
    kinds
        .iter()
        .map(|&kind| (kind, Statistics::compute(kind, points)))
        .collect()
}
