//! track-chart: time-based chart engine for track visualization.
//!
//! Renders synchronized time series (points, lines, filled areas) that share
//! one time axis onto a pluggable drawing surface, plans snapped axis grids,
//! and tracks the pointer against the displayed points.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartEngine, ChartEngineConfig};
pub use error::{ChartError, ChartResult};
