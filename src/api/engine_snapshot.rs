use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::interaction::{CrosshairState, TooltipState};
use crate::render::{DrawingSurface, ViewTransform};

use super::{ChartEngine, RegisteredSeries};

/// Serializable deterministic state snapshot used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub viewport: Viewport,
    pub pass_count: u64,
    pub series: Vec<RegisteredSeries>,
    /// Union of the snapped time borders, unix seconds.
    pub global_time_border: Option<(f64, f64)>,
    pub time_unit: Option<f64>,
    pub transform: ViewTransform,
    pub displayed_points: usize,
    pub crosshair: CrosshairState,
    pub tooltip: Option<TooltipState>,
    pub drawing: bool,
    pub dirty: bool,
    pub pending_resizes: usize,
}

impl<S: DrawingSurface, P> ChartEngine<S, P> {
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            viewport: self.viewport,
            pass_count: self.pass_count,
            series: self.series.clone(),
            global_time_border: self
                .global_border
                .min_border_time()
                .zip(self.global_border.max_border_time()),
            time_unit: self.global_border.time_unit(),
            transform: self.committed.transform,
            displayed_points: self.committed.points.len(),
            crosshair: self.crosshair_state(),
            tooltip: self.tooltip_state(),
            drawing: self.scheduler.is_drawing(),
            dirty: self.scheduler.is_dirty(),
            pending_resizes: self.scheduler.pending_resizes(),
        }
    }

    /// Serializes snapshot as pretty JSON for fixture-based regression checks.
    pub fn snapshot_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }
}
