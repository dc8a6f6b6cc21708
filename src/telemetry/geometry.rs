//! Chart geometry.
//!
//! Maps metric values onto a fixed logical viewport (the SVG viewBox) and
//! maps a pointer event on a rendered point back into page coordinates for
//! the tooltip.
//!
//! Forward mapping for point `i` of `n`:
//!
//! ```text
//! x = origin_x + i * width / max(n - 1, 1)
//! y = baseline_y - (clamp(v, lo, hi) - lo) / (hi - lo) * height
//! ```
//!
//! A lone point sits at the horizontal centre of the plot.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::telemetry::metric::{MetricKind, Status};
use crate::telemetry::reading::DerivedPoint;

/// Logical coordinate space the chart geometry targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Viewport {
    /// Left edge of the plot area.
    pub origin_x: f64,
    /// Y of the zero line; values grow upwards from here.
    pub baseline_y: f64,
    /// Usable plot width.
    pub width: f64,
    /// Usable plot height.
    pub height: f64,
    pub view_box_width: f64,
    pub view_box_height: f64,
    pub tooltip_width: f64,
    pub tooltip_height: f64,
    /// Minimum gap between tooltip and page edge.
    pub tooltip_margin: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin_x: 40.0,
            baseline_y: 180.0,
            width: 340.0,
            height: 160.0,
            view_box_width: 400.0,
            view_box_height: 200.0,
            tooltip_width: 160.0,
            tooltip_height: 64.0,
            tooltip_margin: 10.0,
        }
    }
}

impl Viewport {
    /// X of point `index` out of `count` evenly spaced points.
    #[must_use]
    pub fn x_at(&self, index: usize, count: usize) -> f64 {
        if count <= 1 {
            return self.origin_x + self.width / 2.0;
        }
        self.origin_x + index as f64 * (self.width / (count - 1) as f64)
    }

    /// Y of `value` against the `(lo, hi)` domain, clamped into it first.
    #[must_use]
    pub fn y_for(&self, value: f64, (lo, hi): (f64, f64)) -> f64 {
        let span = hi - lo;
        if span <= 0.0 {
            return self.baseline_y;
        }
        let clamped = if value.is_finite() { value.clamp(lo, hi) } else { lo };
        self.baseline_y - ((clamped - lo) / span) * self.height
    }

    /// Rendered-size / viewBox-size ratio on each axis.
    fn scale(&self, bounds: &BoundingBox) -> (f64, f64) {
        let ratio = |rendered: f64, intrinsic: f64| {
            if intrinsic > 0.0 {
                rendered / intrinsic
            } else {
                1.0
            }
        };
        (
            ratio(bounds.width, self.view_box_width),
            ratio(bounds.height, self.view_box_height),
        )
    }
}

/// Plot domain of `kind` for the points currently charted.
#[must_use]
pub fn domain_for(kind: MetricKind, points: &[DerivedPoint]) -> (f64, f64) {
    let observed = points
        .iter()
        .map(|p| p.metric(kind))
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));
    kind.descriptor().plot_domain.resolve(observed)
}

/// `(x, y)` of every point for one metric, in input order.
#[must_use]
pub fn project(points: &[DerivedPoint], kind: MetricKind, viewport: &Viewport) -> Vec<(f64, f64)> {
    let domain = domain_for(kind, points);
    let count = points.len();
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (viewport.x_at(i, count), viewport.y_for(p.metric(kind), domain)))
        .collect()
}

fn join_coords(coords: impl IntoIterator<Item = (f64, f64)>) -> String {
    coords
        .into_iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// SVG `points` attribute for a line chart.
#[must_use]
pub fn polyline(points: &[DerivedPoint], kind: MetricKind, viewport: &Viewport) -> String {
    join_coords(project(points, kind, viewport))
}

/// Polyline closed down to the baseline, for a filled area chart.
#[must_use]
pub fn area(points: &[DerivedPoint], kind: MetricKind, viewport: &Viewport) -> String {
    close_to_baseline(&project(points, kind, viewport), viewport.baseline_y)
}

fn close_to_baseline(coords: &[(f64, f64)], base: f64) -> String {
    let (Some(&(first_x, _)), Some(&(last_x, _))) = (coords.first(), coords.last()) else {
        return String::new();
    };
    join_coords(
        std::iter::once((first_x, base))
            .chain(coords.iter().copied())
            .chain(std::iter::once((last_x, base))),
    )
}

/// A marker on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
    pub status: Status,
    #[schema(value_type = String)]
    pub color: &'static str,
}

/// Everything the view needs to draw one metric.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Series {
    pub metric: MetricKind,
    #[schema(value_type = String)]
    pub label: &'static str,
    #[schema(value_type = String)]
    pub unit: &'static str,
    pub domain_min: f64,
    pub domain_max: f64,
    pub polyline: String,
    pub area: String,
    pub points: Vec<PlotPoint>,
}

impl Series {
    #[must_use]
    pub fn build(points: &[DerivedPoint], kind: MetricKind, viewport: &Viewport) -> Self {
        let descriptor = kind.descriptor();
        let (domain_min, domain_max) = domain_for(kind, points);
        let coords = project(points, kind, viewport);

        let plot_points = coords
            .iter()
            .zip(points)
            .map(|(&(x, y), p)| {
                let value = p.metric(kind);
                let status = descriptor.status(value);
                PlotPoint {
                    x,
                    y,
                    value,
                    status,
                    color: status.color(),
                }
            })
            .collect();

        Self {
            metric: kind,
            label: descriptor.label,
            unit: descriptor.unit,
            domain_min,
            domain_max,
            polyline: join_coords(coords.iter().copied()),
            area: close_to_baseline(&coords, viewport.baseline_y),
            points: plot_points,
        }
    }
}

/// Rendered bounding box of the chart element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Click or tap on a chart point, with the page context needed to place
/// the tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PointerEvent {
    pub index: usize,
    pub metric: MetricKind,
    pub bounds: BoundingBox,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
    /// Inner width of the browser window.
    pub viewport_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Tooltip {
    pub index: usize,
    pub metric: MetricKind,
    /// Page position of the tooltip box.
    pub left: f64,
    pub top: f64,
    /// Page position of the data point itself.
    pub anchor_x: f64,
    pub anchor_y: f64,
    /// Set when the box was flipped below the point.
    pub below: bool,
    pub value: f64,
    pub formatted: String,
    #[schema(value_type = String)]
    pub unit: &'static str,
    pub status: Status,
    #[schema(value_type = String)]
    pub status_label: &'static str,
    #[schema(value_type = String)]
    pub color: &'static str,
    pub sensor_label: String,
    pub time_label: String,
}

/// Resolve a pointer event to a tooltip. `None` if the index is stale.
#[must_use]
pub fn resolve_tooltip(
    points: &[DerivedPoint],
    event: &PointerEvent,
    viewport: &Viewport,
) -> Option<Tooltip> {
    let point = points.get(event.index)?;
    let descriptor = event.metric.descriptor();
    let value = point.metric(event.metric);

    // Intrinsic viewBox coordinates
    let x = viewport.x_at(event.index, points.len());
    let y = viewport.y_for(value, domain_for(event.metric, points));

    // viewBox -> page pixels
    let (sx, sy) = viewport.scale(&event.bounds);
    let anchor_x = event.bounds.left + x * sx + event.scroll_x;
    let anchor_y = event.bounds.top + y * sy + event.scroll_y;

    let margin = viewport.tooltip_margin;
    let min_left = event.scroll_x + margin;
    let max_left = event.scroll_x + event.viewport_width - margin - viewport.tooltip_width;
    let mut left = anchor_x - viewport.tooltip_width / 2.0;
    if left > max_left {
        left = max_left;
    }
    if left < min_left {
        left = min_left;
    }

    let mut top = anchor_y - viewport.tooltip_height - margin;
    let below = top < event.scroll_y + margin;
    if below {
        top = anchor_y + margin;
    }

    let status = descriptor.status(value);
    Some(Tooltip {
        index: event.index,
        metric: event.metric,
        left,
        top,
        anchor_x,
        anchor_y,
        below,
        value,
        formatted: descriptor.format(value),
        unit: descriptor.unit,
        status,
        status_label: status.label(),
        color: status.color(),
        sensor_label: point.sensor_label.clone(),
        time_label: point.time_label.clone(),
    })
}
