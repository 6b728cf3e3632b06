pub mod border;
pub mod grid_table;
pub mod primitives;
pub mod scale;
pub mod series;
pub mod time_border;
pub mod types;

pub use border::{Border, SnappedBorder, plan_border};
pub use grid_table::{TimeGridTable, ValueGridTable};
pub use primitives::{datetime_to_unix_seconds, time_delta_to_seconds, unix_seconds_to_datetime};
pub use scale::CoordinateMapper;
pub use series::{LinkPredicate, Sample, SeriesSpec, TimeAccessor, ValueAccessor, sample_items};
pub use time_border::GlobalTimeBorder;
pub use types::{SeriesId, Viewport};
