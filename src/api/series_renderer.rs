use tracing::{debug, warn};

use crate::core::{
    CoordinateMapper, Sample, SeriesId, SeriesSpec, SnappedBorder, plan_border as plan_snapped_border,
    sample_items,
};
use crate::error::{ChartError, ChartResult};
use crate::interaction::DisplayedPoint;
use crate::render::{
    CanvasLayerKind, DrawingSurface, PathPrimitive, PointsPrimitive, PolygonPrimitive, Primitive,
    RenderFrame, SeriesStyle,
};

use super::{ChartEngine, RegisteredSeries};

/// Primitive built by one draw call plus the number of drawn elements.
type StagedSeries = (Option<Primitive>, usize);

impl<S: DrawingSurface, P> ChartEngine<S, P> {
    /// Starts a new pass: forgets registered series, the shared time border
    /// and everything staged so far. The surface keeps showing the last
    /// committed frame.
    pub fn initialize(&mut self) -> ChartResult<()> {
        let viewport = self.surface.size();
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = viewport;
        self.series.clear();
        self.global_border.reset();
        self.staged = RenderFrame::new(viewport);
        self.staged_points.clear();
        debug!(
            width = viewport.width,
            height = viewport.height,
            "chart pass initialized"
        );
        Ok(())
    }

    /// Plans the snapped border of a series and widens the shared time border.
    pub fn plan_border<T: Sync>(&mut self, items: &[T], spec: &SeriesSpec<T>) -> ChartResult<SeriesId> {
        let border = plan_snapped_border(
            items,
            spec,
            &self.config.time_grid,
            &self.config.value_grid,
        )?;
        let id = SeriesId::new(self.series.len());
        self.global_border.register(&border);
        self.series.push(RegisteredSeries {
            id,
            label: spec.label.clone(),
            border,
        });
        debug!(
            series = %id,
            label = %spec.label,
            items = items.len(),
            min_border_time = border.min_border_time,
            max_border_time = border.max_border_time,
            "series registered"
        );
        Ok(id)
    }

    pub fn series_border(&self, series: SeriesId) -> ChartResult<SnappedBorder> {
        self.series
            .get(series.raw())
            .map(|registered| registered.border)
            .ok_or(ChartError::UnknownSeries(series))
    }

    #[must_use]
    pub fn registered_series(&self) -> &[RegisteredSeries] {
        &self.series
    }

    /// Mapper over the series registered so far in this pass.
    pub fn mapper(&self) -> ChartResult<CoordinateMapper> {
        CoordinateMapper::new(self.viewport, &self.global_border)
    }

    /// Joins consecutive items into one batched path; returns the segment count.
    ///
    /// A segment is drawn only when both ends are finite and the series' link
    /// rule accepts the pair.
    pub fn draw_lines<L: Sync>(
        &mut self,
        items: &[L],
        series: SeriesId,
        spec: &SeriesSpec<L>,
    ) -> ChartResult<usize> {
        let built = self.build_lines(items, series, spec);
        self.stage_series("lines", series, built)
    }

    /// Fills the area between the series and the zero baseline.
    ///
    /// Returns the number of data vertices of the outline.
    pub fn draw_polygon<G: Sync>(
        &mut self,
        items: &[G],
        series: SeriesId,
        spec: &SeriesSpec<G>,
    ) -> ChartResult<usize> {
        let built = self.build_polygon(items, series, spec);
        self.stage_series("polygon", series, built)
    }

    fn resolve_style(&self, style: Option<SeriesStyle>) -> ChartResult<SeriesStyle> {
        let style = style.unwrap_or(self.config.style.series);
        style.validate()?;
        Ok(style)
    }

    fn build_lines<L: Sync>(
        &self,
        items: &[L],
        series: SeriesId,
        spec: &SeriesSpec<L>,
    ) -> ChartResult<StagedSeries> {
        let border = self.series_border(series)?;
        let mapper = self.mapper()?;
        let style = self.resolve_style(spec.style)?;

        let samples = sample_items(items, spec);
        let projected = mapper.project_all(&samples, &border);
        let mut segments = Vec::with_capacity(items.len().saturating_sub(1));
        for index in 1..items.len() {
            let (Some(start), Some(end)) = (projected[index - 1], projected[index]) else {
                continue;
            };
            if spec.links(
                &items[index - 1],
                &items[index],
                samples[index - 1],
                samples[index],
            ) {
                segments.push([start, end]);
            }
        }

        let count = segments.len();
        let primitive = (!segments.is_empty()).then(|| {
            Primitive::Path(PathPrimitive {
                segments,
                stroke_width: style.line_width,
                color: style.line_color,
            })
        });
        Ok((primitive, count))
    }

    fn build_polygon<G: Sync>(
        &self,
        items: &[G],
        series: SeriesId,
        spec: &SeriesSpec<G>,
    ) -> ChartResult<StagedSeries> {
        let border = self.series_border(series)?;
        let mapper = self.mapper()?;
        let style = self.resolve_style(spec.style)?;

        let mut samples: Vec<Sample> = sample_items(items, spec)
            .into_iter()
            .filter(|sample| sample.is_finite())
            .collect();
        samples.sort_by(|left, right| left.time.total_cmp(&right.time));
        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            return Err(ChartError::EmptySeries {
                label: spec.label.clone(),
            });
        };

        let baseline = mapper.zero_baseline_y(&border);
        let start = (mapper.to_pixel_x(first.time), baseline);
        let end = (mapper.to_pixel_x(last.time), baseline);

        let mut vertices = Vec::with_capacity(samples.len() + 3);
        vertices.push(start);
        vertices.extend(
            samples
                .iter()
                .filter_map(|sample| mapper.project(*sample, &border)),
        );
        let count = vertices.len() - 1;
        vertices.push(end);
        vertices.push(start);

        let primitive = Primitive::Polygon(PolygonPrimitive {
            vertices,
            fill: style.fill_color,
            stroke: style.fill_outline,
        });
        primitive.validate()?;
        Ok((Some(primitive), count))
    }

    fn stage_series(
        &mut self,
        role: &'static str,
        series: SeriesId,
        built: ChartResult<StagedSeries>,
    ) -> ChartResult<usize> {
        match built {
            Ok((primitive, count)) => {
                if let Some(primitive) = primitive {
                    self.staged.push(CanvasLayerKind::Series, primitive);
                }
                debug!(series = %series, role, count, "series staged");
                Ok(count)
            }
            Err(err) => {
                warn!(series = %series, role, error = %err, "series draw skipped");
                Err(err)
            }
        }
    }
}

impl<S: DrawingSurface, P: Clone + Sync> ChartEngine<S, P> {
    /// Indexes every finite item of a point series for pointer lookup and,
    /// when `draw` is set, stages all markers as one hit-testable primitive.
    ///
    /// Returns the number of indexed points.
    pub fn draw_points(
        &mut self,
        items: &[P],
        series: SeriesId,
        spec: &SeriesSpec<P>,
        draw: bool,
    ) -> ChartResult<usize> {
        match self.build_points(items, series, spec, draw) {
            Ok((primitive, points)) => {
                let count = points.len();
                if let Some(primitive) = primitive {
                    self.staged.push(CanvasLayerKind::Series, primitive);
                }
                self.staged_points.push_series(series, points);
                debug!(series = %series, role = "points", count, draw, "series staged");
                Ok(count)
            }
            Err(err) => {
                warn!(series = %series, role = "points", error = %err, "series draw skipped");
                Err(err)
            }
        }
    }

    fn build_points(
        &self,
        items: &[P],
        series: SeriesId,
        spec: &SeriesSpec<P>,
        draw: bool,
    ) -> ChartResult<(Option<Primitive>, Vec<DisplayedPoint<P>>)> {
        let border = self.series_border(series)?;
        let mapper = self.mapper()?;
        let style = self.resolve_style(spec.style)?;

        let samples = sample_items(items, spec);
        let projected = mapper.project_all(&samples, &border);
        let mut points = Vec::with_capacity(items.len());
        for ((item, sample), position) in items.iter().zip(&samples).zip(projected) {
            let Some((pixel_x, pixel_y)) = position else {
                continue;
            };
            points.push(DisplayedPoint {
                pixel_x,
                pixel_y,
                time: sample.time,
                value: sample.value,
                series,
                item: item.clone(),
            });
        }

        let primitive = (draw && !points.is_empty()).then(|| {
            Primitive::Points(PointsPrimitive {
                centers: points
                    .iter()
                    .map(|point| (point.pixel_x, point.pixel_y))
                    .collect(),
                radius: style.point_radius,
                fill: style.point_color,
            })
        });
        Ok((primitive, points))
    }
}
