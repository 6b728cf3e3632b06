use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use crate::core::{CoordinateMapper, datetime_to_unix_seconds, unix_seconds_to_datetime};
use crate::interaction::{
    CrosshairAnchor, CrosshairState, DisplayedPoint, DisplayedPointIndex, InteractionConfig,
    PointHovered, PointerEvent, TooltipState,
};
use crate::render::{
    CanvasLayerKind, DrawingSurface, LinePrimitive, Primitive, RectPrimitive, TextHAlign,
    TextPrimitive,
};

use super::{ChartEngine, LineRequest};

impl<S: DrawingSurface, P> ChartEngine<S, P> {
    #[must_use]
    pub fn interaction_config(&self) -> InteractionConfig {
        self.config.interaction
    }

    pub fn set_interaction_config(&mut self, config: InteractionConfig) {
        self.interaction.gate_mut().set_delay(config.pointer_debounce);
        self.interaction
            .set_max_pending_hover_events(config.max_pending_hover_events);
        if !config.mouse_line_enabled
            && matches!(
                self.interaction.crosshair_anchor(),
                Some(CrosshairAnchor::ScreenX(_))
            )
        {
            self.interaction.clear_crosshair();
        }
        if !config.tooltip_enabled {
            self.interaction.clear_tooltip();
        }
        self.config.interaction = config;
        self.sync_overlays();
    }

    pub fn set_tooltip_formatter(&mut self, formatter: impl Fn(&P) -> String + Send + Sync + 'static) {
        self.tooltip_formatter = Some(Arc::new(formatter));
    }

    pub fn clear_tooltip_formatter(&mut self) {
        self.tooltip_formatter = None;
    }

    /// Clears crosshair and tooltip; hover history is kept.
    pub fn pointer_leave(&mut self) {
        self.interaction.on_pointer_leave();
        self.sync_overlays();
        trace!("pointer left chart");
    }

    /// Places the crosshair at `time` on the shared time axis.
    ///
    /// While a pass is drawing the request is held back and applied once the
    /// pass finishes; returns whether it was applied immediately.
    pub fn set_line_at_time(&mut self, time: DateTime<Utc>) -> bool {
        if self.scheduler.is_drawing() {
            self.scheduler.defer_line(LineRequest::At(time));
            return false;
        }
        self.interaction
            .set_crosshair(CrosshairAnchor::Time(datetime_to_unix_seconds(time)));
        self.sync_overlays();
        debug!(time = %time, "crosshair set from time");
        true
    }

    /// Removes the crosshair; the tooltip stays.
    pub fn clear_line(&mut self) -> bool {
        if self.scheduler.is_drawing() {
            self.scheduler.defer_line(LineRequest::Clear);
            return false;
        }
        self.interaction.clear_crosshair();
        self.sync_overlays();
        true
    }

    #[must_use]
    pub fn crosshair_state(&self) -> CrosshairState {
        let anchor = self.interaction.crosshair_anchor();
        let x = self.resolve_crosshair_x();
        CrosshairState {
            visible: x.is_some(),
            anchor,
            x,
        }
    }

    #[must_use]
    pub fn tooltip_state(&self) -> Option<TooltipState> {
        self.interaction.tooltip().cloned()
    }

    /// Drains "point hovered" notifications queued since the last call.
    pub fn take_hover_events(&mut self) -> Vec<PointHovered<P>> {
        self.interaction.drain_hover_events()
    }

    #[must_use]
    pub fn pending_hover_events(&self) -> usize {
        self.interaction.pending_hover_events()
    }

    #[must_use]
    pub fn last_hovered(&self) -> Option<&PointHovered<P>> {
        self.interaction.last_hovered()
    }

    /// Points published by the last committed pass.
    #[must_use]
    pub fn displayed_points(&self) -> &DisplayedPointIndex<P> {
        &self.committed.points
    }

    pub(super) fn apply_line_request(&mut self, request: LineRequest) {
        match request {
            LineRequest::At(time) => {
                self.set_line_at_time(time);
            }
            LineRequest::Clear => {
                self.clear_line();
            }
        }
    }

    fn resolve_crosshair_x(&self) -> Option<f64> {
        let width = self.committed.viewport.width;
        let x = match self.interaction.crosshair_anchor()? {
            CrosshairAnchor::ScreenX(x) => x,
            CrosshairAnchor::Time(time) => {
                let mapper =
                    CoordinateMapper::new(self.committed.viewport, &self.committed.global_border)
                        .ok()?;
                self.committed.transform.apply_x(mapper.to_pixel_x(time))
            }
        };
        (x.is_finite() && (0.0..=width).contains(&x)).then_some(x)
    }

    fn tooltip_text(&self, point: &DisplayedPoint<P>) -> String {
        if let Some(formatter) = &self.tooltip_formatter {
            return formatter(&point.item);
        }
        match unix_seconds_to_datetime(point.time) {
            Ok(time) => format!(
                "{} {:.2}",
                self.config.time_labels.format(time, 1.0),
                point.value
            ),
            Err(_) => format!("{:.2}", point.value),
        }
    }

    /// Replaces crosshair and tooltip primitives on the surface.
    pub(super) fn sync_overlays(&mut self) {
        for id in self.interaction.take_overlay_primitives() {
            self.surface.remove(id);
        }

        let style = self.config.style;
        let width = self.committed.viewport.width;
        let height = self.committed.viewport.height;

        if let Some(x) = self.resolve_crosshair_x() {
            let line = Primitive::Line(LinePrimitive::new(
                x,
                0.0,
                x,
                height,
                style.crosshair.width,
                style.crosshair.color,
            ));
            match self.surface.add(CanvasLayerKind::Crosshair, line) {
                Ok(id) => self.interaction.set_crosshair_primitive(id),
                Err(err) => warn!(error = %err, "crosshair overlay rejected"),
            }
        }

        let Some(tooltip) = self.interaction.tooltip().cloned() else {
            return;
        };
        if tooltip.text.is_empty() {
            return;
        }
        let tooltip_style = style.tooltip;
        let padding = tooltip_style.padding_px;
        let offset = tooltip_style.offset_px;
        let box_width =
            self.surface.measure_text(&tooltip.text, tooltip_style.font_size_px) + 2.0 * padding;
        let box_height = tooltip_style.font_size_px + 2.0 * padding;

        let mut x = tooltip.x + offset;
        if x + box_width > width {
            x = tooltip.x - offset - box_width;
        }
        let mut y = tooltip.y + offset;
        if y + box_height > height {
            y = tooltip.y - offset - box_height;
        }
        let x = x.max(0.0);
        let y = y.max(0.0);

        let background = Primitive::Rect(RectPrimitive {
            x,
            y,
            width: box_width,
            height: box_height,
            fill: tooltip_style.background,
            border: Some(tooltip_style.border),
        });
        let label = Primitive::Text(TextPrimitive::new(
            tooltip.text,
            x + padding,
            y + padding,
            tooltip_style.font_size_px,
            tooltip_style.text_color,
            TextHAlign::Left,
        ));
        for primitive in [background, label] {
            match self.surface.add(CanvasLayerKind::Tooltip, primitive) {
                Ok(id) => self.interaction.push_tooltip_primitive(id),
                Err(err) => warn!(error = %err, "tooltip overlay rejected"),
            }
        }
    }
}

impl<S: DrawingSurface, P: Clone> ChartEngine<S, P> {
    /// Tracks the pointer against the committed points.
    ///
    /// Ignored while a pass is drawing or while the debounce gate is closed.
    /// Returns whether a point was hovered.
    pub fn pointer_move(&mut self, event: PointerEvent, now: Instant) -> bool {
        if self.scheduler.is_drawing() {
            trace!("pointer move ignored during draw pass");
            return false;
        }
        if !self.interaction.gate_mut().try_pass(now) {
            return false;
        }

        let transform = self.committed.transform;
        let Some(point) = self
            .committed
            .points
            .nearest_to_screen_x(event.x, transform)
            .and_then(|index| self.committed.points.get(index))
        else {
            return false;
        };

        let screen_x = transform.apply_x(point.pixel_x);
        let hovered = PointHovered {
            item: point.item.clone(),
            series: point.series,
            pixel_x: screen_x,
            pixel_y: point.pixel_y,
            event,
        };
        let text = self.tooltip_text(point);

        let interaction = self.config.interaction;
        if interaction.mouse_line_enabled {
            self.interaction
                .set_crosshair(CrosshairAnchor::ScreenX(screen_x));
        }
        if interaction.tooltip_enabled {
            self.interaction.set_tooltip(TooltipState {
                x: event.x,
                y: event.y,
                text,
            });
        }
        trace!(series = %hovered.series, x = screen_x, "point hovered");
        self.interaction.record_hover(hovered);
        self.sync_overlays();
        true
    }
}
