//! Pure telemetry core: ingestion, filtering, statistics and chart geometry.

pub mod filter;
pub mod geometry;
pub mod metric;
pub mod paginate;
pub mod reading;
pub mod stats;

pub use metric::{MetricKind, MetricSet, Status};
pub use reading::{DerivedPoint, Reading, Timestamp};
