use std::collections::BTreeMap;
use std::ops::Bound;

use chrono::TimeDelta;
use ordered_float::OrderedFloat;

use crate::core::primitives::time_delta_to_seconds;
use crate::error::{ChartError, ChartResult};

/// Divisor applied to a span that exceeds every table threshold.
const FALLBACK_DIVISOR: f64 = 10.0;

/// Threshold → grid unit table for the time axis.
///
/// A span picks the smallest threshold strictly greater than itself; spans
/// beyond the last threshold fall back to `span / 10`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGridTable {
    entries: BTreeMap<TimeDelta, TimeDelta>,
}

impl Default for TimeGridTable {
    fn default() -> Self {
        Self::from_entries([
            (TimeDelta::minutes(1), TimeDelta::seconds(5)),
            (TimeDelta::minutes(5), TimeDelta::seconds(10)),
            (TimeDelta::minutes(10), TimeDelta::minutes(1)),
            (TimeDelta::minutes(30), TimeDelta::minutes(5)),
            (TimeDelta::hours(1), TimeDelta::minutes(10)),
            (TimeDelta::hours(3), TimeDelta::minutes(30)),
            (TimeDelta::hours(6), TimeDelta::hours(1)),
            (TimeDelta::hours(12), TimeDelta::hours(2)),
            (TimeDelta::days(1), TimeDelta::hours(4)),
            (TimeDelta::days(3), TimeDelta::hours(12)),
            (TimeDelta::days(7), TimeDelta::days(1)),
        ])
        .expect("default time grid table is valid")
    }
}

impl TimeGridTable {
    pub fn from_entries(
        entries: impl IntoIterator<Item = (TimeDelta, TimeDelta)>,
    ) -> ChartResult<Self> {
        let mut map = BTreeMap::new();
        for (threshold, unit) in entries {
            if threshold <= TimeDelta::zero() || unit <= TimeDelta::zero() {
                return Err(ChartError::InvalidData(
                    "time grid thresholds and units must be > 0".to_owned(),
                ));
            }
            map.insert(threshold, unit);
        }
        Ok(Self { entries: map })
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Grid unit in seconds for a raw time span in seconds.
    #[must_use]
    pub fn unit_for_span(&self, span_seconds: f64) -> f64 {
        self.entries
            .iter()
            .find(|(threshold, _)| time_delta_to_seconds(**threshold) > span_seconds)
            .map_or(span_seconds / FALLBACK_DIVISOR, |(_, unit)| {
                time_delta_to_seconds(*unit)
            })
    }
}

/// Threshold → grid unit table for value axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueGridTable {
    entries: BTreeMap<OrderedFloat<f64>, OrderedFloat<f64>>,
}

impl Default for ValueGridTable {
    fn default() -> Self {
        Self::from_entries([
            (1.0, 0.1),
            (5.0, 0.5),
            (10.0, 1.0),
            (50.0, 5.0),
            (100.0, 10.0),
            (500.0, 50.0),
            (1_000.0, 100.0),
            (5_000.0, 500.0),
            (10_000.0, 1_000.0),
        ])
        .expect("default value grid table is valid")
    }
}

impl ValueGridTable {
    pub fn from_entries(entries: impl IntoIterator<Item = (f64, f64)>) -> ChartResult<Self> {
        let mut map = BTreeMap::new();
        for (threshold, unit) in entries {
            if !threshold.is_finite() || !unit.is_finite() || threshold <= 0.0 || unit <= 0.0 {
                return Err(ChartError::InvalidData(
                    "value grid thresholds and units must be finite and > 0".to_owned(),
                ));
            }
            map.insert(OrderedFloat(threshold), OrderedFloat(unit));
        }
        Ok(Self { entries: map })
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Spacing used when a series has no value extent: smallest key / 10.
    #[must_use]
    pub fn zero_span_unit(&self) -> f64 {
        let smallest = self
            .entries
            .keys()
            .next()
            .map_or(1.0, |key| key.into_inner());
        smallest / FALLBACK_DIVISOR
    }

    /// Grid unit for a raw value span; never zero.
    #[must_use]
    pub fn unit_for_span(&self, span: f64) -> f64 {
        if span <= 0.0 || !span.is_finite() {
            return self.zero_span_unit();
        }

        self.entries
            .range((Bound::Excluded(OrderedFloat(span)), Bound::Unbounded))
            .next()
            .map_or(span / FALLBACK_DIVISOR, |(_, unit)| unit.into_inner())
    }
}
