use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{ChartError, ChartResult};

/// Converts a timestamp into fractional unix seconds, the engine's time axis unit.
#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

pub fn unix_seconds_to_datetime(seconds: f64) -> ChartResult<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(ChartError::InvalidData(
            "time seconds must be finite".to_owned(),
        ));
    }
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64).ok_or_else(|| {
        ChartError::InvalidData(format!("{seconds} s is outside the representable time range"))
    })
}

#[must_use]
pub fn time_delta_to_seconds(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}
