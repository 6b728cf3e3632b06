use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{SeriesId, unix_seconds_to_datetime};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CanvasLayerKind, DrawingSurface, LinePrimitive, Primitive, TextHAlign, TextPrimitive,
    ViewTransform,
};

use super::ChartEngine;

/// Upper bound of vertical grid lines per pass; denser grids are strided.
const MAX_TIME_GRID_LINES: usize = 2_000;
const LABEL_MARGIN_PX: f64 = 2.0;

/// What one `draw_grid` call staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridSummary {
    pub vertical_lines: usize,
    pub horizontal_lines: usize,
    pub time_labels: usize,
    pub value_labels: usize,
}

impl<S: DrawingSurface, P> ChartEngine<S, P> {
    /// Stages time grid lines over the shared time border and value grid
    /// lines over the border of `value_series`, with thinned labels.
    pub fn draw_grid(&mut self, value_series: SeriesId) -> ChartResult<GridSummary> {
        match self.build_grid(value_series) {
            Ok((primitives, summary)) => {
                self.staged.primitives.extend(primitives);
                debug!(
                    series = %value_series,
                    vertical = summary.vertical_lines,
                    horizontal = summary.horizontal_lines,
                    time_labels = summary.time_labels,
                    value_labels = summary.value_labels,
                    "grid staged"
                );
                Ok(summary)
            }
            Err(err) => {
                warn!(series = %value_series, error = %err, "grid draw skipped");
                Err(err)
            }
        }
    }

    /// Fits the data-covering span of every registered series to the
    /// viewport width and counter-scales the time labels.
    ///
    /// Depends only on registered borders, so repeated calls are a no-op.
    pub fn stretch_to_fit(&mut self) -> ChartResult<ViewTransform> {
        let transform = self.fit_transform()?;
        self.staged.transform = transform;
        let label_scale = 1.0 / transform.scale_x;
        for label in self.staged.labels_mut() {
            label.scale_x = label_scale;
        }
        debug!(
            translate_x = transform.translate_x,
            scale_x = transform.scale_x,
            "stretched to fit"
        );
        Ok(transform)
    }

    fn fit_transform(&self) -> ChartResult<ViewTransform> {
        let (Some((data_min, data_max)), Some(border_span)) = (
            self.global_border.data_range(),
            self.global_border.border_time_span(),
        ) else {
            return Ok(ViewTransform::identity());
        };
        let data_span = data_max - data_min;
        if !data_span.is_finite() || data_span <= 0.0 {
            return Ok(ViewTransform::identity());
        }

        let mapper = self.mapper()?;
        Ok(ViewTransform {
            translate_x: -mapper.to_pixel_x(data_min),
            scale_x: border_span / data_span,
        })
    }

    fn build_grid(
        &self,
        value_series: SeriesId,
    ) -> ChartResult<(Vec<(CanvasLayerKind, Primitive)>, GridSummary)> {
        let border = self.series_border(value_series)?;
        let mapper = self.mapper()?;
        let (Some(min_time), Some(max_time), Some(unit)) = (
            self.global_border.min_border_time(),
            self.global_border.max_border_time(),
            self.global_border.time_unit(),
        ) else {
            return Err(ChartError::InvalidData(
                "no series registered for the time axis".to_owned(),
            ));
        };

        let grid = self.config.style.grid;
        let font = grid.label_font_size_px;
        let width = self.viewport.width;
        let height = self.viewport.height;
        let mut primitives = Vec::new();
        let mut summary = GridSummary::default();

        let first_index = (min_time / unit).ceil();
        let tick_count = ((max_time - first_index * unit) / unit - 1e-9).ceil().max(0.0) as usize;
        let stride = tick_count.div_ceil(MAX_TIME_GRID_LINES).max(1);
        let mut last_label_end = f64::NEG_INFINITY;
        for step in (0..tick_count).step_by(stride) {
            let tick = (first_index + step as f64) * unit;
            let x = mapper.to_pixel_x(tick);
            primitives.push((
                CanvasLayerKind::Grid,
                Primitive::Line(LinePrimitive::new(
                    x,
                    0.0,
                    x,
                    height,
                    grid.line_width,
                    grid.line_color,
                )),
            ));
            summary.vertical_lines += 1;

            let text = self
                .config
                .time_labels
                .format(unix_seconds_to_datetime(tick)?, unit);
            if text.is_empty() {
                continue;
            }
            let label_width = self.surface.measure_text(&text, font);
            let left = x - label_width / 2.0;
            if left < last_label_end + grid.label_min_spacing_px {
                continue;
            }
            last_label_end = x + label_width / 2.0;
            primitives.push((
                CanvasLayerKind::Axis,
                Primitive::Text(TextPrimitive::new(
                    text,
                    x,
                    height - font - LABEL_MARGIN_PX,
                    font,
                    grid.label_color,
                    TextHAlign::Center,
                )),
            ));
            summary.time_labels += 1;
        }

        let mut last_label_y = f64::INFINITY;
        for step in 0..border.value_unit_count() {
            let value = border.min_border_value + step as f64 * border.value_unit;
            let y = mapper.to_screen_y(value, &border);
            primitives.push((
                CanvasLayerKind::Grid,
                Primitive::Line(LinePrimitive::new(
                    0.0,
                    y,
                    width,
                    y,
                    grid.line_width,
                    grid.line_color,
                )),
            ));
            summary.horizontal_lines += 1;

            let text = self.config.value_labels.format(value, border.value_unit);
            if text.is_empty() || last_label_y - y < font + grid.label_min_spacing_px {
                continue;
            }
            last_label_y = y;
            primitives.push((
                CanvasLayerKind::ValueAxis,
                Primitive::Text(TextPrimitive::new(
                    text,
                    LABEL_MARGIN_PX,
                    (y - font - LABEL_MARGIN_PX).max(0.0),
                    font,
                    grid.label_color,
                    TextHAlign::Left,
                )),
            ));
            summary.value_labels += 1;
        }

        Ok((primitives, summary))
    }
}
