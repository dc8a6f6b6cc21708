//! Per-metric behaviour table.
//!
//! Every metric-dependent decision (valid range, plot domain, unit, rounding,
//! status bands) is a lookup into [`MetricDescriptor`]; callers never branch on
//! the metric kind themselves.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of a measured quantity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Level,
    Ph,
    Turbidity,
    Temperature,
    Humidity,
}

impl MetricKind {
    #[must_use]
    pub fn descriptor(self) -> &'static MetricDescriptor {
        match self {
            Self::Level => &LEVEL,
            Self::Ph => &PH,
            Self::Turbidity => &TURBIDITY,
            Self::Temperature => &TEMPERATURE,
            Self::Humidity => &HUMIDITY,
        }
    }

    /// Field name used by the upstream payload.
    #[must_use]
    pub fn key(self) -> &'static str {
        self.descriptor().key
    }
}

/// The fixed metric list a deployment reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricSet {
    /// Water level, pH and turbidity probes.
    Water,
    /// Temperature and humidity probes.
    Climate,
}

/// Unknown names fall back to `Water`.
impl From<&str> for MetricSet {
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "climate" | "dht" | "temperature" => Self::Climate,
            _ => Self::Water,
        }
    }
}

impl MetricSet {
    #[must_use]
    pub fn kinds(self) -> &'static [MetricKind] {
        match self {
            Self::Water => &[MetricKind::Level, MetricKind::Ph, MetricKind::Turbidity],
            Self::Climate => &[MetricKind::Temperature, MetricKind::Humidity],
        }
    }
}

/// Upper bound of the plotted domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotDomain {
    Fixed { min: f64, max: f64 },
    /// `max(floor, ceil(observed / step) * step)`, lower bound 0.
    Dynamic { floor: f64, step: f64 },
}

impl PlotDomain {
    /// Resolve to concrete `(min, max)` for the values currently on screen.
    #[must_use]
    pub fn resolve(&self, observed_max: Option<f64>) -> (f64, f64) {
        match *self {
            Self::Fixed { min, max } => (min, max),
            Self::Dynamic { floor, step } => {
                let observed = observed_max.filter(|v| v.is_finite()).unwrap_or(0.0);
                (0.0, floor.max((observed / step).ceil() * step))
            }
        }
    }
}

/// Qualitative band a value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Critical,
    Low,
    Moderate,
    Good,
    Excellent,
    Normal,
    Attention,
    OutOfRange,
}

impl Status {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
            Self::Normal => "Normal",
            Self::Attention => "Attention",
            Self::OutOfRange => "Out of range",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Critical | Self::OutOfRange => "#e74c3c",
            Self::Low => "#e67e22",
            Self::Moderate | Self::Attention => "#f1c40f",
            Self::Good | Self::Normal => "#2ecc71",
            Self::Excellent => "#27ae60",
        }
    }
}

/// Ordered threshold tests; first match wins.
#[derive(Debug, Clone, Copy)]
pub enum Banding {
    /// Higher is better: first `value < threshold` wins, else `top`.
    Ascending {
        bands: &'static [(f64, Status)],
        top: Status,
    },
    /// Higher is worse: first `value <= threshold` wins, else `top`.
    Descending {
        bands: &'static [(f64, Status)],
        top: Status,
    },
    /// Symmetric around a neutral centre.
    Centered {
        hard_min: f64,
        soft_min: f64,
        soft_max: f64,
        hard_max: f64,
    },
}

impl Banding {
    #[must_use]
    pub fn evaluate(&self, value: f64) -> Status {
        match *self {
            Self::Ascending { bands, top } => bands
                .iter()
                .find(|(threshold, _)| value < *threshold)
                .map_or(top, |(_, status)| *status),
            Self::Descending { bands, top } => bands
                .iter()
                .find(|(threshold, _)| value <= *threshold)
                .map_or(top, |(_, status)| *status),
            Self::Centered {
                hard_min,
                soft_min,
                soft_max,
                hard_max,
            } => {
                if value < hard_min || value > hard_max {
                    Status::OutOfRange
                } else if value < soft_min || value > soft_max {
                    Status::Attention
                } else {
                    Status::Normal
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct MetricDescriptor {
    pub kind: MetricKind,
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    /// Decimal places for means and formatted values.
    pub precision: usize,
    /// Substituted for missing or non-numeric input.
    pub default_value: f64,
    /// Ingestion clamp.
    pub valid_range: (f64, f64),
    pub plot_domain: PlotDomain,
    pub banding: Banding,
}

impl MetricDescriptor {
    #[must_use]
    pub fn sanitize(&self, raw: Option<f64>) -> f64 {
        let (lo, hi) = self.valid_range;
        match raw {
            Some(v) if v.is_finite() => v.clamp(lo, hi),
            _ => self.default_value,
        }
    }

    #[must_use]
    pub fn status(&self, value: f64) -> Status {
        self.banding.evaluate(value)
    }

    #[must_use]
    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.precision as i32);
        (value * factor).round() / factor
    }

    /// Value with unit suffix, e.g. `"45.0%"` or `"7.25 pH"`.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        format!("{:.*}{}", self.precision, value, self.unit)
    }
}

static LEVEL: MetricDescriptor = MetricDescriptor {
    kind: MetricKind::Level,
    key: "level",
    label: "Water level",
    unit: "%",
    precision: 1,
    default_value: 0.0,
    valid_range: (0.0, 100.0),
    plot_domain: PlotDomain::Fixed { min: 0.0, max: 100.0 },
    banding: Banding::Ascending {
        bands: &[
            (20.0, Status::Critical),
            (40.0, Status::Low),
            (60.0, Status::Moderate),
            (80.0, Status::Good),
        ],
        top: Status::Excellent,
    },
};

static PH: MetricDescriptor = MetricDescriptor {
    kind: MetricKind::Ph,
    key: "ph",
    label: "pH",
    unit: " pH",
    precision: 2,
    default_value: 7.0,
    valid_range: (0.0, 14.0),
    plot_domain: PlotDomain::Fixed { min: 0.0, max: 14.0 },
    banding: Banding::Centered {
        hard_min: 6.0,
        soft_min: 6.5,
        soft_max: 8.0,
        hard_max: 8.5,
    },
};

static TURBIDITY: MetricDescriptor = MetricDescriptor {
    kind: MetricKind::Turbidity,
    key: "turbidity",
    label: "Turbidity",
    unit: " NTU",
    precision: 1,
    default_value: 0.0,
    valid_range: (0.0, 1000.0),
    plot_domain: PlotDomain::Dynamic {
        floor: 100.0,
        step: 50.0,
    },
    banding: Banding::Descending {
        bands: &[
            (5.0, Status::Excellent),
            (10.0, Status::Good),
            (25.0, Status::Moderate),
            (50.0, Status::Low),
        ],
        top: Status::Critical,
    },
};

static TEMPERATURE: MetricDescriptor = MetricDescriptor {
    kind: MetricKind::Temperature,
    key: "temperature",
    label: "Temperature",
    unit: "°C",
    precision: 1,
    default_value: 0.0,
    valid_range: (-40.0, 85.0),
    plot_domain: PlotDomain::Fixed {
        min: -10.0,
        max: 50.0,
    },
    banding: Banding::Centered {
        hard_min: 5.0,
        soft_min: 15.0,
        soft_max: 28.0,
        hard_max: 35.0,
    },
};

static HUMIDITY: MetricDescriptor = MetricDescriptor {
    kind: MetricKind::Humidity,
    key: "humidity",
    label: "Humidity",
    unit: "%",
    precision: 1,
    default_value: 0.0,
    valid_range: (0.0, 100.0),
    plot_domain: PlotDomain::Fixed { min: 0.0, max: 100.0 },
    banding: Banding::Centered {
        hard_min: 20.0,
        soft_min: 30.0,
        soft_max: 70.0,
        hard_max: 80.0,
    },
};
