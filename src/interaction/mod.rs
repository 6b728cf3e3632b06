use std::collections::VecDeque;
use std::ops::Range;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::SeriesId;
use crate::render::{PrimitiveId, ViewTransform};

/// Interaction tuning exposed through the engine config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Quiet time after a handled pointer move before the next one is handled.
    pub pointer_debounce: Duration,
    pub mouse_line_enabled: bool,
    pub tooltip_enabled: bool,
    /// Hover notifications kept until the host drains them; the oldest is
    /// dropped when full. Zero disables the queue.
    pub max_pending_hover_events: usize,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            pointer_debounce: Duration::from_millis(100),
            mouse_line_enabled: true,
            tooltip_enabled: true,
            max_pending_hover_events: 64,
        }
    }
}

/// Pointer position in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One rendered point-series item and where it was drawn (plot space).
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedPoint<P> {
    pub pixel_x: f64,
    pub pixel_y: f64,
    /// Source sample, time in unix seconds.
    pub time: f64,
    pub value: f64,
    pub series: SeriesId,
    pub item: P,
}

/// Point lookup table with a reverse index from series to its points.
#[derive(Debug, Clone)]
pub struct DisplayedPointIndex<P> {
    points: Vec<DisplayedPoint<P>>,
    by_series: IndexMap<SeriesId, Range<usize>>,
}

impl<P> Default for DisplayedPointIndex<P> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            by_series: IndexMap::new(),
        }
    }
}

impl<P> DisplayedPointIndex<P> {
    pub fn clear(&mut self) {
        self.points.clear();
        self.by_series.clear();
    }

    /// Indexes the points of one series, replacing any points indexed
    /// earlier for the same series.
    pub fn push_series(
        &mut self,
        series: SeriesId,
        points: impl IntoIterator<Item = DisplayedPoint<P>>,
    ) {
        if let Some(old) = self.by_series.shift_remove(&series) {
            let removed = old.len();
            self.points.drain(old.clone());
            for range in self.by_series.values_mut() {
                if range.start >= old.end {
                    *range = range.start - removed..range.end - removed;
                }
            }
        }
        let start = self.points.len();
        self.points.extend(points);
        self.by_series.insert(series, start..self.points.len());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[DisplayedPoint<P>] {
        &self.points
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DisplayedPoint<P>> {
        self.points.get(index)
    }

    #[must_use]
    pub fn series_points(&self, series: SeriesId) -> &[DisplayedPoint<P>] {
        match self.by_series.get(&series) {
            Some(range) => &self.points[range.clone()],
            None => &[],
        }
    }

    /// Index of the point whose screen X is closest to `screen_x`.
    ///
    /// Linear scan; on equal distance the first-seen point wins.
    #[must_use]
    pub fn nearest_to_screen_x(&self, screen_x: f64, transform: ViewTransform) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, point) in self.points.iter().enumerate() {
            let distance = (transform.apply_x(point.pixel_x) - screen_x).abs();
            match best {
                Some((_, current)) if current <= distance => {}
                _ => best = Some((index, distance)),
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Notification raised when the pointer lands on a displayed point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointHovered<P> {
    pub item: P,
    pub series: SeriesId,
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub event: PointerEvent,
}

/// Lets one event through, then stays closed for `delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebounceGate {
    delay: Duration,
    reopens_at: Option<Instant>,
}

impl DebounceGate {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            reopens_at: None,
        }
    }

    #[must_use]
    pub fn is_open(&self, now: Instant) -> bool {
        self.reopens_at.is_none_or(|at| now >= at)
    }

    /// Returns `true` and closes the gate when it was open at `now`.
    pub fn try_pass(&mut self, now: Instant) -> bool {
        if !self.is_open(now) {
            return false;
        }
        self.reopens_at = Some(now + self.delay);
        true
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }
}

/// Where the crosshair is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CrosshairAnchor {
    /// Screen X chosen by pointer tracking.
    ScreenX(f64),
    /// Time set from outside (map selection); re-projected on every redraw.
    Time(f64),
}

/// Public crosshair state exposed to host applications.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CrosshairState {
    pub visible: bool,
    pub anchor: Option<CrosshairAnchor>,
    /// Resolved screen X of the line when visible.
    pub x: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipState {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Pointer tracking state owned by the engine's interaction controller.
#[derive(Debug)]
pub struct InteractionState<P> {
    gate: DebounceGate,
    crosshair: Option<CrosshairAnchor>,
    tooltip: Option<TooltipState>,
    last_hovered: Option<PointHovered<P>>,
    pending_hover_events: VecDeque<PointHovered<P>>,
    max_pending_hover_events: usize,
    crosshair_primitive: Option<PrimitiveId>,
    tooltip_primitives: SmallVec<[PrimitiveId; 2]>,
}

impl<P> InteractionState<P> {
    #[must_use]
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            gate: DebounceGate::new(config.pointer_debounce),
            crosshair: None,
            tooltip: None,
            last_hovered: None,
            pending_hover_events: VecDeque::new(),
            max_pending_hover_events: config.max_pending_hover_events,
            crosshair_primitive: None,
            tooltip_primitives: SmallVec::new(),
        }
    }

    pub fn gate_mut(&mut self) -> &mut DebounceGate {
        &mut self.gate
    }

    /// Applies a new queue bound, dropping the oldest notifications over it.
    pub fn set_max_pending_hover_events(&mut self, max: usize) {
        self.max_pending_hover_events = max;
        let excess = self.pending_hover_events.len().saturating_sub(max);
        self.pending_hover_events.drain(..excess);
    }

    #[must_use]
    pub fn pending_hover_events(&self) -> usize {
        self.pending_hover_events.len()
    }

    #[must_use]
    pub fn crosshair_anchor(&self) -> Option<CrosshairAnchor> {
        self.crosshair
    }

    pub fn set_crosshair(&mut self, anchor: CrosshairAnchor) {
        self.crosshair = Some(anchor);
    }

    pub fn clear_crosshair(&mut self) {
        self.crosshair = None;
    }

    #[must_use]
    pub fn tooltip(&self) -> Option<&TooltipState> {
        self.tooltip.as_ref()
    }

    pub fn set_tooltip(&mut self, tooltip: TooltipState) {
        self.tooltip = Some(tooltip);
    }

    pub fn clear_tooltip(&mut self) {
        self.tooltip = None;
    }

    pub fn on_pointer_leave(&mut self) {
        self.crosshair = None;
        self.tooltip = None;
    }

    #[must_use]
    pub fn last_hovered(&self) -> Option<&PointHovered<P>> {
        self.last_hovered.as_ref()
    }

    pub fn drain_hover_events(&mut self) -> Vec<PointHovered<P>> {
        self.pending_hover_events.drain(..).collect()
    }

    /// Swaps out the overlay handles currently on the surface.
    pub fn take_overlay_primitives(&mut self) -> SmallVec<[PrimitiveId; 3]> {
        let mut ids: SmallVec<[PrimitiveId; 3]> = SmallVec::new();
        ids.extend(self.crosshair_primitive.take());
        ids.extend(self.tooltip_primitives.drain(..));
        ids
    }

    pub fn set_crosshair_primitive(&mut self, id: PrimitiveId) {
        self.crosshair_primitive = Some(id);
    }

    pub fn push_tooltip_primitive(&mut self, id: PrimitiveId) {
        self.tooltip_primitives.push(id);
    }

    /// Forgets overlay handles after the surface was wiped.
    pub fn forget_overlay_primitives(&mut self) {
        self.crosshair_primitive = None;
        self.tooltip_primitives.clear();
    }
}

impl<P: Clone> InteractionState<P> {
    pub fn record_hover(&mut self, hovered: PointHovered<P>) {
        if self.max_pending_hover_events == 0 {
            self.last_hovered = Some(hovered);
            return;
        }
        if self.pending_hover_events.len() >= self.max_pending_hover_events {
            self.pending_hover_events.pop_front();
        }
        self.last_hovered = Some(hovered.clone());
        self.pending_hover_events.push_back(hovered);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{DebounceGate, DisplayedPoint, DisplayedPointIndex};
    use crate::core::SeriesId;
    use crate::render::ViewTransform;

    fn index_at(xs: &[f64]) -> DisplayedPointIndex<usize> {
        let mut index = DisplayedPointIndex::default();
        index.push_series(
            SeriesId::new(0),
            xs.iter().enumerate().map(|(i, x)| DisplayedPoint {
                pixel_x: *x,
                pixel_y: 0.0,
                time: *x,
                value: 0.0,
                series: SeriesId::new(0),
                item: i,
            }),
        );
        index
    }

    #[test]
    fn nearest_lookup_prefers_closest_and_first_on_ties() {
        let index = index_at(&[10.0, 50.0, 90.0]);
        let identity = ViewTransform::identity();
        assert_eq!(index.nearest_to_screen_x(40.0, identity), Some(1));
        assert_eq!(index.nearest_to_screen_x(60.0, identity), Some(1));
        assert_eq!(index.nearest_to_screen_x(30.0, identity), Some(0));
        assert_eq!(index.nearest_to_screen_x(-5.0, identity), Some(0));
        assert_eq!(DisplayedPointIndex::<usize>::default().nearest_to_screen_x(1.0, identity), None);
    }

    #[test]
    fn nearest_lookup_uses_screen_coordinates() {
        let index = index_at(&[10.0, 50.0, 90.0]);
        let stretched = ViewTransform {
            translate_x: -10.0,
            scale_x: 2.0,
        };
        // Screen positions become 0, 80, 160.
        assert_eq!(index.nearest_to_screen_x(70.0, stretched), Some(1));
        assert_eq!(index.nearest_to_screen_x(130.0, stretched), Some(2));
    }

    #[test]
    fn reverse_index_returns_series_slice() {
        let mut index = index_at(&[1.0, 2.0]);
        index.push_series(
            SeriesId::new(3),
            [DisplayedPoint {
                pixel_x: 7.0,
                pixel_y: 1.0,
                time: 7.0,
                value: 1.0,
                series: SeriesId::new(3),
                item: 99,
            }],
        );
        assert_eq!(index.series_points(SeriesId::new(0)).len(), 2);
        assert_eq!(index.series_points(SeriesId::new(3))[0].item, 99);
        assert!(index.series_points(SeriesId::new(9)).is_empty());
    }

    #[test]
    fn reindexing_a_series_replaces_its_points() {
        let mut index = index_at(&[1.0, 2.0]);
        let point = |x: f64, item: usize| DisplayedPoint {
            pixel_x: x,
            pixel_y: 0.0,
            time: x,
            value: 0.0,
            series: SeriesId::new(3),
            item,
        };
        index.push_series(SeriesId::new(3), [point(7.0, 70), point(8.0, 80)]);
        index.push_series(
            SeriesId::new(0),
            [DisplayedPoint {
                pixel_x: 5.0,
                pixel_y: 0.0,
                time: 5.0,
                value: 0.0,
                series: SeriesId::new(0),
                item: 50,
            }],
        );

        assert_eq!(index.len(), 3);
        let later: Vec<usize> = index
            .series_points(SeriesId::new(3))
            .iter()
            .map(|point| point.item)
            .collect();
        assert_eq!(later, vec![70, 80]);
        assert_eq!(index.series_points(SeriesId::new(0))[0].item, 50);
        assert_eq!(
            index.nearest_to_screen_x(1.0, ViewTransform::identity()),
            Some(2)
        );
    }

    #[test]
    fn gate_closes_for_the_configured_delay() {
        let start = Instant::now();
        let mut gate = DebounceGate::new(Duration::from_millis(100));
        assert!(gate.try_pass(start));
        assert!(!gate.try_pass(start + Duration::from_millis(40)));
        assert!(!gate.try_pass(start + Duration::from_millis(99)));
        assert!(gate.try_pass(start + Duration::from_millis(100)));
    }
}
