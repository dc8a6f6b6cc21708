//! Telemetry Dash - live sensor telemetry dashboard backend
//!
//! Polls a readings API, filters and aggregates the readings and computes
//! chart geometry for a view layer. The library exposes every component for
//! testing and reuse.

pub mod common;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod routes;
pub mod source;
pub mod sync;
pub mod telemetry;
