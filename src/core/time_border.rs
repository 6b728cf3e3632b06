use serde::{Deserialize, Serialize};

use crate::core::SnappedBorder;

/// Shared horizontal scale of one chart instance.
///
/// Holds the union of every snapped time range registered since the last
/// reset. The grid unit is taken from the first registration of the pass and
/// kept while later registrations widen the range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalTimeBorder {
    range: Option<TimeRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct TimeRange {
    min_border_time: f64,
    max_border_time: f64,
    time_unit: f64,
    min_data_time: f64,
    max_data_time: f64,
}

impl GlobalTimeBorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.range = None;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    /// Widens the union with one series' border.
    pub fn register(&mut self, border: &SnappedBorder) {
        self.range = Some(match self.range {
            None => TimeRange {
                min_border_time: border.min_border_time,
                max_border_time: border.max_border_time,
                time_unit: border.time_unit,
                min_data_time: border.raw.min_time,
                max_data_time: border.raw.max_time,
            },
            Some(range) => TimeRange {
                min_border_time: range.min_border_time.min(border.min_border_time),
                max_border_time: range.max_border_time.max(border.max_border_time),
                time_unit: range.time_unit,
                min_data_time: range.min_data_time.min(border.raw.min_time),
                max_data_time: range.max_data_time.max(border.raw.max_time),
            },
        });
    }

    #[must_use]
    pub fn min_border_time(&self) -> Option<f64> {
        self.range.map(|range| range.min_border_time)
    }

    #[must_use]
    pub fn max_border_time(&self) -> Option<f64> {
        self.range.map(|range| range.max_border_time)
    }

    #[must_use]
    pub fn border_time_span(&self) -> Option<f64> {
        self.range
            .map(|range| range.max_border_time - range.min_border_time)
    }

    /// Grid unit of the first series registered in the pass.
    #[must_use]
    pub fn time_unit(&self) -> Option<f64> {
        self.range.map(|range| range.time_unit)
    }

    /// Earliest and latest raw data time over all registered series.
    #[must_use]
    pub fn data_range(&self) -> Option<(f64, f64)> {
        self.range
            .map(|range| (range.min_data_time, range.max_data_time))
    }
}
