use crate::core::time_border::GlobalTimeBorder;
use crate::core::types::Viewport;
use crate::core::{Sample, SnappedBorder};
use crate::error::{ChartError, ChartResult};
#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

/// Maps `(time, value)` samples to plot pixels.
///
/// The horizontal scale is shared by every series through the global time
/// border; the vertical scale belongs to each series' own snapped border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    viewport: Viewport,
    min_border_time: f64,
    border_time_span: f64,
}

impl CoordinateMapper {
    pub fn new(viewport: Viewport, global: &GlobalTimeBorder) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let (Some(min_border_time), Some(border_time_span)) =
            (global.min_border_time(), global.border_time_span())
        else {
            return Err(ChartError::InvalidData(
                "no series registered for the time axis".to_owned(),
            ));
        };
        if !border_time_span.is_finite() || border_time_span <= 0.0 {
            return Err(ChartError::InvalidData(
                "global time border span must be finite and > 0".to_owned(),
            ));
        }

        Ok(Self {
            viewport,
            min_border_time,
            border_time_span,
        })
    }

    #[must_use]
    pub fn viewport(self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn to_pixel_x(self, time: f64) -> f64 {
        self.viewport.width * (time - self.min_border_time) / self.border_time_span
    }

    #[must_use]
    pub fn pixel_x_to_time(self, pixel_x: f64) -> f64 {
        self.min_border_time + pixel_x / self.viewport.width * self.border_time_span
    }

    /// Unflipped distance from the bottom edge.
    #[must_use]
    pub fn to_pixel_y(self, value: f64, border: &SnappedBorder) -> f64 {
        self.viewport.height * (value - border.min_border_value) / border.border_value_span
    }

    /// Screen y with values growing upward.
    #[must_use]
    pub fn to_screen_y(self, value: f64, border: &SnappedBorder) -> f64 {
        self.viewport.height - self.to_pixel_y(value, border)
    }

    /// Screen y of a literal zero value, used to anchor area fills.
    #[must_use]
    pub fn zero_baseline_y(self, border: &SnappedBorder) -> f64 {
        self.viewport.height
            - (-border.min_border_value) / border.border_value_span * self.viewport.height
    }

    /// Screen position of one sample, `None` for numeric faults.
    #[must_use]
    pub fn project(self, sample: Sample, border: &SnappedBorder) -> Option<(f64, f64)> {
        if !sample.is_finite() {
            return None;
        }
        let x = self.to_pixel_x(sample.time);
        let y = self.to_screen_y(sample.value, border);
        (x.is_finite() && y.is_finite()).then_some((x, y))
    }

    /// Projects a whole series, keeping input order.
    #[must_use]
    pub fn project_all(self, samples: &[Sample], border: &SnappedBorder) -> Vec<Option<(f64, f64)>> {
        // Large tracks are projected on the rayon pool; the collected vector
        // is handed back before any frame mutation happens.
        #[cfg(feature = "parallel-projection")]
        {
            samples
                .par_iter()
                .map(|sample| self.project(*sample, border))
                .collect()
        }

        #[cfg(not(feature = "parallel-projection"))]
        {
            samples
                .iter()
                .map(|sample| self.project(*sample, border))
                .collect()
        }
    }
}
