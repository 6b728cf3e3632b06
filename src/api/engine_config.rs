use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::{TimeGridTable, ValueGridTable};
use crate::error::ChartResult;
use crate::interaction::InteractionConfig;
use crate::render::ChartStyle;

use super::SchedulerConfig;

/// Formatter for time-axis labels.
#[derive(Clone, Default)]
pub enum TimeLabelFormat {
    /// Clock time, with seconds for sub-minute grids and the date for multi-day grids.
    #[default]
    Default,
    /// `chrono` strftime pattern.
    Pattern(String),
    /// Receives the tick time and the grid unit in seconds.
    Custom(Arc<dyn Fn(DateTime<Utc>, f64) -> String + Send + Sync>),
}

impl TimeLabelFormat {
    #[must_use]
    pub fn format(&self, time: DateTime<Utc>, unit_seconds: f64) -> String {
        match self {
            Self::Default => {
                let pattern = if unit_seconds < 60.0 {
                    "%H:%M:%S"
                } else if unit_seconds < 86_400.0 {
                    "%H:%M"
                } else {
                    "%d.%m %H:%M"
                };
                time.format(pattern).to_string()
            }
            Self::Pattern(pattern) => time.format(pattern).to_string(),
            Self::Custom(formatter) => formatter(time, unit_seconds),
        }
    }
}

impl fmt::Debug for TimeLabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Formatter for value-axis labels.
#[derive(Clone, Default)]
pub enum ValueLabelFormat {
    /// As many decimals as the grid unit needs.
    #[default]
    Default,
    Custom(Arc<dyn Fn(f64, f64) -> String + Send + Sync>),
}

impl ValueLabelFormat {
    #[must_use]
    pub fn format(&self, value: f64, unit: f64) -> String {
        match self {
            Self::Default => {
                let decimals = if unit >= 1.0 || unit <= 0.0 {
                    0
                } else {
                    (-unit.log10() - 1e-9).ceil().clamp(0.0, 9.0) as usize
                };
                // Avoid printing "-0" for tiny negative rounding noise.
                let value = if value.abs() < unit * 1e-6 { 0.0 } else { value };
                format!("{value:.decimals$}")
            }
            Self::Custom(formatter) => formatter(value, unit),
        }
    }
}

impl fmt::Debug for ValueLabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Public engine bootstrap configuration.
#[derive(Debug, Clone, Default)]
pub struct ChartEngineConfig {
    pub time_grid: TimeGridTable,
    pub value_grid: ValueGridTable,
    pub time_labels: TimeLabelFormat,
    pub value_labels: ValueLabelFormat,
    pub interaction: InteractionConfig,
    pub scheduler: SchedulerConfig,
    pub style: ChartStyle,
}

impl ChartEngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_time_grid(mut self, table: TimeGridTable) -> Self {
        self.time_grid = table;
        self
    }

    #[must_use]
    pub fn with_value_grid(mut self, table: ValueGridTable) -> Self {
        self.value_grid = table;
        self
    }

    #[must_use]
    pub fn with_time_labels(mut self, format: TimeLabelFormat) -> Self {
        self.time_labels = format;
        self
    }

    #[must_use]
    pub fn with_value_labels(mut self, format: ValueLabelFormat) -> Self {
        self.value_labels = format;
        self
    }

    #[must_use]
    pub fn with_interaction(mut self, interaction: InteractionConfig) -> Self {
        self.interaction = interaction;
        self
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.style.validate()?;
        self.scheduler.validate()
    }
}
