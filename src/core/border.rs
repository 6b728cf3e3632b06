#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::grid_table::{TimeGridTable, ValueGridTable};
use crate::core::series::{Sample, SeriesSpec, sample_items};
use crate::error::{ChartError, ChartResult};

/// Time unit used when a table yields no usable spacing (one second).
const MIN_TIME_UNIT_SECONDS: f64 = 1.0;
/// Quotients this close to an integer count as lying on a grid line.
const GRID_SNAP_TOLERANCE: f64 = 1e-9;

/// Raw extent of one series over its finite samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub min_time: f64,
    pub max_time: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub time_span: f64,
    pub value_span: f64,
}

impl Border {
    /// Extent over finite samples, `None` when there is none.
    #[must_use]
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        #[cfg(feature = "parallel-projection")]
        let extent = samples
            .par_iter()
            .copied()
            .filter(|sample| sample.is_finite())
            .map(Extent::of)
            .reduce(Extent::empty, Extent::merge);

        #[cfg(not(feature = "parallel-projection"))]
        let extent = samples
            .iter()
            .copied()
            .filter(|sample| sample.is_finite())
            .map(Extent::of)
            .fold(Extent::empty(), Extent::merge);

        extent.into_border()
    }
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    min_time: f64,
    max_time: f64,
    min_value: f64,
    max_value: f64,
}

impl Extent {
    fn empty() -> Self {
        Self {
            min_time: f64::INFINITY,
            max_time: f64::NEG_INFINITY,
            min_value: f64::INFINITY,
            max_value: f64::NEG_INFINITY,
        }
    }

    fn of(sample: Sample) -> Self {
        Self {
            min_time: sample.time,
            max_time: sample.time,
            min_value: sample.value,
            max_value: sample.value,
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            min_time: self.min_time.min(other.min_time),
            max_time: self.max_time.max(other.max_time),
            min_value: self.min_value.min(other.min_value),
            max_value: self.max_value.max(other.max_value),
        }
    }

    fn into_border(self) -> Option<Border> {
        if self.min_time > self.max_time {
            return None;
        }
        Some(Border {
            min_time: self.min_time,
            max_time: self.max_time,
            min_value: self.min_value,
            max_value: self.max_value,
            time_span: self.max_time - self.min_time,
            value_span: self.max_value - self.min_value,
        })
    }
}

/// Border rounded outward to grid units on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnappedBorder {
    pub min_border_time: f64,
    pub max_border_time: f64,
    pub min_border_value: f64,
    pub max_border_value: f64,
    pub border_time_span: f64,
    pub border_value_span: f64,
    /// Time grid unit in seconds.
    pub time_unit: f64,
    pub value_unit: f64,
    pub raw: Border,
}

impl SnappedBorder {
    /// Snaps a raw border with the given tables.
    ///
    /// Time is floored/ceiled to the unit; value gets an extra unit of margin
    /// on each side so extreme samples never sit on the plot edge.
    #[must_use]
    pub fn snap(raw: Border, time_table: &TimeGridTable, value_table: &ValueGridTable) -> Self {
        let mut time_unit = time_table.unit_for_span(raw.time_span);
        if !time_unit.is_finite() || time_unit <= 0.0 {
            time_unit = MIN_TIME_UNIT_SECONDS;
        }
        let min_border_time = snap_floor(raw.min_time, time_unit);
        let mut max_border_time = snap_ceil(raw.max_time, time_unit);
        if max_border_time <= min_border_time {
            max_border_time = min_border_time + time_unit;
        }

        let value_unit = value_table.unit_for_span(raw.value_span);
        let min_border_value = snap_floor(raw.min_value, value_unit) - value_unit;
        let max_border_value = snap_ceil(raw.max_value, value_unit) + value_unit;

        Self {
            min_border_time,
            max_border_time,
            min_border_value,
            max_border_value,
            border_time_span: max_border_time - min_border_time,
            border_value_span: max_border_value - min_border_value,
            time_unit,
            value_unit,
            raw,
        }
    }

    /// Number of whole time units covered by the border.
    #[must_use]
    pub fn time_unit_count(&self) -> usize {
        (self.border_time_span / self.time_unit).round() as usize
    }

    #[must_use]
    pub fn value_unit_count(&self) -> usize {
        (self.border_value_span / self.value_unit).round() as usize
    }
}

fn grid_quotient(value: f64, unit: f64) -> f64 {
    let quotient = value / unit;
    let nearest = quotient.round();
    let tolerance = GRID_SNAP_TOLERANCE.max(nearest.abs() * 4.0 * f64::EPSILON);
    if (quotient - nearest).abs() <= tolerance {
        nearest
    } else {
        quotient
    }
}

fn snap_floor(value: f64, unit: f64) -> f64 {
    grid_quotient(value, unit).floor() * unit
}

fn snap_ceil(value: f64, unit: f64) -> f64 {
    grid_quotient(value, unit).ceil() * unit
}

/// Plans the snapped border of one series.
///
/// Items whose time or value is not finite are ignored; a series without any
/// finite item is rejected with [`ChartError::EmptySeries`].
pub fn plan_border<T: Sync>(
    items: &[T],
    spec: &SeriesSpec<T>,
    time_table: &TimeGridTable,
    value_table: &ValueGridTable,
) -> ChartResult<SnappedBorder> {
    let samples = sample_items(items, spec);
    plan_border_from_samples(&samples, &spec.label, time_table, value_table)
}

pub(crate) fn plan_border_from_samples(
    samples: &[Sample],
    label: &str,
    time_table: &TimeGridTable,
    value_table: &ValueGridTable,
) -> ChartResult<SnappedBorder> {
    let raw = Border::from_samples(samples).ok_or_else(|| ChartError::EmptySeries {
        label: label.to_owned(),
    })?;
    let snapped = SnappedBorder::snap(raw, time_table, value_table);
    trace!(
        series = label,
        samples = samples.len(),
        time_unit = snapped.time_unit,
        value_unit = snapped.value_unit,
        "planned series border"
    );
    Ok(snapped)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{Border, SnappedBorder};
    use crate::core::grid_table::{TimeGridTable, ValueGridTable};
    use crate::core::series::Sample;

    #[test]
    fn non_finite_samples_are_skipped() {
        let samples = [
            Sample::new(10.0, 1.0),
            Sample::new(f64::NAN, 100.0),
            Sample::new(20.0, f64::INFINITY),
            Sample::new(30.0, 3.0),
        ];
        let border = Border::from_samples(&samples).expect("border");
        assert_eq!(border.min_time, 10.0);
        assert_eq!(border.max_time, 30.0);
        assert_eq!(border.max_value, 3.0);
        assert!(Border::from_samples(&[Sample::new(f64::NAN, 1.0)]).is_none());
    }

    #[test]
    fn value_axis_gets_one_unit_margin_per_side() {
        let raw = Border::from_samples(&[Sample::new(0.0, 12.3), Sample::new(50.0, 17.8)])
            .expect("border");
        let snapped = SnappedBorder::snap(raw, &TimeGridTable::default(), &ValueGridTable::default());
        assert_relative_eq!(snapped.value_unit, 1.0);
        assert_relative_eq!(snapped.min_border_value, 11.0);
        assert_relative_eq!(snapped.max_border_value, 19.0);
        assert_relative_eq!(snapped.border_value_span, 8.0);
    }

    #[test]
    fn single_timestamp_on_unit_boundary_still_spans_one_unit() {
        let raw = Border::from_samples(&[Sample::new(100.0, 4.0)]).expect("border");
        let snapped = SnappedBorder::snap(raw, &TimeGridTable::default(), &ValueGridTable::default());
        assert_eq!(snapped.time_unit, 5.0);
        assert_eq!(snapped.min_border_time, 100.0);
        assert_eq!(snapped.max_border_time, 105.0);
        assert_eq!(snapped.time_unit_count(), 1);
    }
}
