//! Dashboard state and the end-to-end recompute pipeline.
//!
//! [`Dashboard`] owns the reading set, the filter and the poll status. Every
//! event rebuilds the whole [`Snapshot`] (filter, list, chart, statistics,
//! tooltip) so the pieces can never disagree.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::dashboard::clock::Clock;
use crate::source::RawReading;
use crate::sync::scheduler::PollEvent;
use crate::telemetry::filter::{filter_readings, FilterState};
use crate::telemetry::geometry::{resolve_tooltip, PointerEvent, Series, Tooltip, Viewport};
use crate::telemetry::metric::{MetricKind, MetricSet};
use crate::telemetry::paginate::{self, DEFAULT_PAGE_SIZE};
use crate::telemetry::reading::{ingest_batch, DerivedPoint, Reading};
use crate::telemetry::stats::{aggregate, Statistics};

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub metric_set: MetricSet,
    pub viewport: Viewport,
    pub page_size: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            metric_set: MetricSet::Water,
            viewport: Viewport::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Inputs that change dashboard state.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    PollStarted,
    PollSucceeded(Vec<RawReading>),
    PollFailed { error: String, attempts: u32 },
    SelectDate(NaiveDate),
    ClearFilter,
    ToggleShowAll,
    PointClick(PointerEvent),
    DismissTooltip,
}

impl From<PollEvent> for DashboardEvent {
    fn from(event: PollEvent) -> Self {
        match event {
            PollEvent::Started => Self::PollStarted,
            PollEvent::Succeeded { readings, .. } => Self::PollSucceeded(readings),
            PollEvent::Failed { error, attempts } => Self::PollFailed { error, attempts },
        }
    }
}

/// Last poll failure, shown until the next successful poll.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PollError {
    pub message: String,
    pub attempts: u32,
    pub at: DateTime<Utc>,
}

/// Read-only view of the dashboard at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Snapshot {
    pub metric_set: MetricSet,
    pub filter: FilterState,
    /// Dates after this cannot be selected.
    pub max_selectable_date: NaiveDate,
    pub total_readings: usize,
    /// Newest first.
    pub filtered: Vec<Reading>,
    pub visible: Vec<Reading>,
    pub has_more: bool,
    /// Oldest first, left to right on the chart.
    pub points: Vec<DerivedPoint>,
    pub series: Vec<Series>,
    #[schema(value_type = Object)]
    pub statistics: BTreeMap<MetricKind, Statistics>,
    pub tooltip: Option<Tooltip>,
    pub loading: bool,
    pub error: Option<PollError>,
    pub last_updated: Option<DateTime<Utc>>,
}

pub struct Dashboard {
    settings: DashboardSettings,
    clock: Arc<dyn Clock>,
    readings: Vec<Reading>,
    filter: FilterState,
    pointer: Option<PointerEvent>,
    loading: bool,
    error: Option<PollError>,
    last_updated: Option<DateTime<Utc>>,
    snapshot: Arc<Snapshot>,
}

impl Dashboard {
    pub fn new(settings: DashboardSettings, clock: Arc<dyn Clock>) -> Self {
        let mut dashboard = Self {
            settings,
            clock,
            readings: Vec::new(),
            filter: FilterState::default(),
            pointer: None,
            loading: false,
            error: None,
            last_updated: None,
            snapshot: Arc::new(Snapshot::empty(MetricSet::Water, NaiveDate::MIN)),
        };
        dashboard.snapshot = Arc::new(dashboard.derive());
        dashboard
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    #[must_use]
    pub fn filter(&self) -> FilterState {
        self.filter
    }

    /// Apply one event and recompute the full snapshot.
    pub fn apply(&mut self, event: DashboardEvent) -> Arc<Snapshot> {
        match event {
            DashboardEvent::PollStarted => {
                self.loading = true;
            }
            DashboardEvent::PollSucceeded(raw) => {
                self.readings = ingest_batch(&raw, self.settings.metric_set);
                self.loading = false;
                self.error = None;
                self.last_updated = Some(self.clock.now());
                self.pointer = None;
                tracing::debug!(count = self.readings.len(), "Reading set replaced");
            }
            DashboardEvent::PollFailed { error, attempts } => {
                self.loading = false;
                self.error = Some(PollError {
                    message: error,
                    attempts,
                    at: self.clock.now(),
                });
                tracing::warn!(
                    retained = self.readings.len(),
                    "Showing stale readings after failed poll"
                );
            }
            DashboardEvent::SelectDate(date) => {
                let today = self.clock.today();
                if date > today {
                    tracing::warn!(%date, %today, "Ignoring selection of a future date");
                } else {
                    self.filter.selected_date = Some(date);
                    self.pointer = None;
                }
            }
            DashboardEvent::ClearFilter => {
                self.filter.selected_date = None;
                self.pointer = None;
            }
            DashboardEvent::ToggleShowAll => {
                self.filter.show_all = !self.filter.show_all;
            }
            DashboardEvent::PointClick(pointer) => {
                if self.settings.metric_set.kinds().contains(&pointer.metric) {
                    self.pointer = Some(pointer);
                } else {
                    tracing::warn!(
                        metric = ?pointer.metric,
                        metric_set = ?self.settings.metric_set,
                        "Ignoring click on a metric that is not charted"
                    );
                }
            }
            DashboardEvent::DismissTooltip => {
                self.pointer = None;
            }
        }

        self.snapshot = Arc::new(self.derive());
        self.snapshot()
    }

    /// filtered -> visible -> derived points -> series/statistics -> tooltip
    fn derive(&self) -> Snapshot {
        let settings = &self.settings;
        let kinds = settings.metric_set.kinds();

        let filtered = filter_readings(&self.readings, self.filter.selected_date);
        let visible =
            paginate::visible(&filtered, self.filter.show_all, settings.page_size).to_vec();
        let has_more = paginate::has_more(filtered.len(), self.filter.show_all, settings.page_size);

        let points: Vec<DerivedPoint> = filtered.iter().rev().map(DerivedPoint::from).collect();
        let series = kinds
            .iter()
            .map(|&kind| Series::build(&points, kind, &settings.viewport))
            .collect();
        let statistics = aggregate(&points, kinds);
        let tooltip = self
            .pointer
            .as_ref()
            .filter(|pointer| kinds.contains(&pointer.metric))
            .and_then(|pointer| resolve_tooltip(&points, pointer, &settings.viewport));

        Snapshot {
            metric_set: settings.metric_set,
            filter: self.filter,
            max_selectable_date: self.clock.today(),
            total_readings: self.readings.len(),
            filtered,
            visible,
            has_more,
            points,
            series,
            statistics,
            tooltip,
            loading: self.loading,
            error: self.error.clone(),
            last_updated: self.last_updated,
        }
    }
}

impl Snapshot {
    /// Placeholder before the first recompute.
    #[must_use]
    pub fn empty(metric_set: MetricSet, max_selectable_date: NaiveDate) -> Self {
        Self {
            metric_set,
            filter: FilterState::default(),
            max_selectable_date,
            total_readings: 0,
            filtered: Vec::new(),
            visible: Vec::new(),
            has_more: false,
            points: Vec::new(),
            series: Vec::new(),
            statistics: BTreeMap::new(),
            tooltip: None,
            loading: false,
            error: None,
            last_updated: None,
        }
    }

    #[must_use]
    pub fn series(&self, kind: MetricKind) -> Option<&Series> {
        self.series.iter().find(|s| s.metric == kind)
    }
}
