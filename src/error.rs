use thiserror::Error;

use crate::core::SeriesId;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// No finite item was available to plan a border from.
    #[error("series `{label}` has no finite items to plan a border from")]
    EmptySeries { label: String },

    #[error("series {0} is not registered in the current pass")]
    UnknownSeries(SeriesId),

    #[error("a draw pass is already in progress")]
    PassInProgress,

    #[error("drawing backend failure: {0}")]
    Backend(String),
}
