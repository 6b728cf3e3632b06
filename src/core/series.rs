use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::primitives::{datetime_to_unix_seconds, time_delta_to_seconds};
use crate::render::SeriesStyle;

pub type TimeAccessor<T> = fn(&T) -> DateTime<Utc>;
pub type ValueAccessor<T> = fn(&T) -> f64;
pub type LinkPredicate<T> = fn(&T, &T) -> bool;

/// Per-series configuration resolved once when the series is registered.
///
/// The same host records can be registered several times (points, line,
/// polygon) with different accessors.
pub struct SeriesSpec<T> {
    pub label: String,
    pub time_of: TimeAccessor<T>,
    pub value_of: ValueAccessor<T>,
    /// Extra predicate a consecutive pair must satisfy to be joined by a segment.
    pub link: Option<LinkPredicate<T>>,
    /// Pairs further apart than this are never joined.
    pub max_link_gap: Option<TimeDelta>,
    /// Overrides the engine's default style for this series.
    pub style: Option<SeriesStyle>,
}

impl<T> SeriesSpec<T> {
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        time_of: TimeAccessor<T>,
        value_of: ValueAccessor<T>,
    ) -> Self {
        Self {
            label: label.into(),
            time_of,
            value_of,
            link: None,
            max_link_gap: None,
            style: None,
        }
    }

    #[must_use]
    pub fn with_link(mut self, link: LinkPredicate<T>) -> Self {
        self.link = Some(link);
        self
    }

    #[must_use]
    pub fn with_max_link_gap(mut self, gap: TimeDelta) -> Self {
        self.max_link_gap = Some(gap);
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: SeriesStyle) -> Self {
        self.style = Some(style);
        self
    }

    #[must_use]
    pub fn sample(&self, item: &T) -> Sample {
        Sample {
            time: datetime_to_unix_seconds((self.time_of)(item)),
            value: (self.value_of)(item),
        }
    }

    /// Whether a segment may join `prev` to `curr`.
    #[must_use]
    pub fn links(&self, prev: &T, curr: &T, prev_sample: Sample, curr_sample: Sample) -> bool {
        if let Some(gap) = self.max_link_gap {
            if (curr_sample.time - prev_sample.time).abs() > time_delta_to_seconds(gap) {
                return false;
            }
        }
        self.link.is_none_or(|link| link(prev, curr))
    }
}

impl<T> Clone for SeriesSpec<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            time_of: self.time_of,
            value_of: self.value_of,
            link: self.link,
            max_link_gap: self.max_link_gap,
            style: self.style,
        }
    }
}

impl<T> fmt::Debug for SeriesSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesSpec")
            .field("label", &self.label)
            .field("has_link", &self.link.is_some())
            .field("max_link_gap", &self.max_link_gap)
            .field("style", &self.style)
            .finish()
    }
}

/// One evaluated `(time, value)` pair; time in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
}

impl Sample {
    #[must_use]
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.time.is_finite() && self.value.is_finite()
    }
}

/// Evaluates the series accessors for every item, preserving input order.
#[must_use]
pub fn sample_items<T: Sync>(items: &[T], spec: &SeriesSpec<T>) -> Vec<Sample> {
    #[cfg(feature = "parallel-projection")]
    {
        items.par_iter().map(|item| spec.sample(item)).collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        items.iter().map(|item| spec.sample(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeDelta, Utc};

    use super::{SeriesSpec, sample_items};

    struct Fix {
        seconds: i64,
        speed: f64,
    }

    fn time_of(fix: &Fix) -> DateTime<Utc> {
        DateTime::from_timestamp(fix.seconds, 0).expect("valid timestamp")
    }

    fn speed_of(fix: &Fix) -> f64 {
        fix.speed
    }

    fn never(_: &Fix, _: &Fix) -> bool {
        false
    }

    #[test]
    fn sampling_keeps_item_order() {
        let items: Vec<Fix> = (0..100)
            .map(|i| Fix {
                seconds: i * 2,
                speed: i as f64,
            })
            .collect();
        let spec = SeriesSpec::new("speed", time_of, speed_of);
        let samples = sample_items(&items, &spec);
        assert_eq!(samples.len(), 100);
        assert!(
            samples
                .windows(2)
                .all(|pair| pair[0].time < pair[1].time && pair[0].value < pair[1].value)
        );
    }

    #[test]
    fn max_gap_and_predicate_both_gate_links() {
        let a = Fix {
            seconds: 0,
            speed: 1.0,
        };
        let b = Fix {
            seconds: 300,
            speed: 2.0,
        };
        let gap_only =
            SeriesSpec::new("speed", time_of, speed_of).with_max_link_gap(TimeDelta::seconds(200));
        assert!(!gap_only.links(&a, &b, gap_only.sample(&a), gap_only.sample(&b)));

        let wide = SeriesSpec::new("speed", time_of, speed_of)
            .with_max_link_gap(TimeDelta::seconds(400))
            .with_link(never);
        assert!(!wide.links(&a, &b, wide.sample(&a), wide.sample(&b)));

        let open = SeriesSpec::new("speed", time_of, speed_of);
        assert!(open.links(&a, &b, open.sample(&a), open.sample(&b)));
    }
}
