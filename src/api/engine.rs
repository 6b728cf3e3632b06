use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{GlobalTimeBorder, SeriesId, SnappedBorder, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{DisplayedPointIndex, InteractionState};
use crate::render::{DrawingSurface, RenderFrame, ViewTransform};

use super::{ChartEngineConfig, RedrawScheduler};

/// Caller-supplied tooltip text for a hovered item.
pub type TooltipFormatter<P> = Arc<dyn Fn(&P) -> String + Send + Sync>;

/// One series registered in the current pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredSeries {
    pub id: SeriesId,
    pub label: String,
    pub border: SnappedBorder,
}

/// State that was published by the last successful commit.
///
/// Pointer lookups and overlay placement read only from here, never from the
/// pass being staged.
#[derive(Debug)]
pub(super) struct CommittedView<P> {
    pub(super) points: DisplayedPointIndex<P>,
    pub(super) global_border: GlobalTimeBorder,
    pub(super) viewport: Viewport,
    pub(super) transform: ViewTransform,
    /// Last frame the surface accepted, replayed when a commit is rejected.
    pub(super) frame: RenderFrame,
}

/// Main orchestration facade consumed by host applications.
///
/// `ChartEngine` owns the drawing surface, the per-pass series registry and
/// shared time border, the staged frame, pointer interaction state and the
/// redraw scheduler. `P` is the host record type of point series; hovering a
/// displayed point hands a clone of it back to the host.
pub struct ChartEngine<S: DrawingSurface, P> {
    pub(super) surface: S,
    pub(super) config: ChartEngineConfig,
    pub(super) viewport: Viewport,
    pub(super) series: Vec<RegisteredSeries>,
    pub(super) global_border: GlobalTimeBorder,
    pub(super) staged: RenderFrame,
    pub(super) staged_points: DisplayedPointIndex<P>,
    pub(super) committed: CommittedView<P>,
    pub(super) interaction: InteractionState<P>,
    pub(super) tooltip_formatter: Option<TooltipFormatter<P>>,
    pub(super) scheduler: RedrawScheduler,
    pub(super) pass_count: u64,
}

impl<S: DrawingSurface, P> ChartEngine<S, P> {
    pub fn new(surface: S, config: ChartEngineConfig) -> ChartResult<Self> {
        config.validate()?;
        let viewport = surface.size();
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let interaction = InteractionState::new(config.interaction);
        let scheduler = RedrawScheduler::new(config.scheduler);
        Ok(Self {
            surface,
            viewport,
            series: Vec::new(),
            global_border: GlobalTimeBorder::new(),
            staged: RenderFrame::new(viewport),
            staged_points: DisplayedPointIndex::default(),
            committed: CommittedView {
                points: DisplayedPointIndex::default(),
                global_border: GlobalTimeBorder::new(),
                viewport,
                transform: ViewTransform::identity(),
                frame: RenderFrame::new(viewport),
            },
            interaction,
            tooltip_formatter: None,
            scheduler,
            pass_count: 0,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ChartEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct surface access for host-side resizing and painting.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Number of passes committed so far.
    #[must_use]
    pub fn pass_count(&self) -> u64 {
        self.pass_count
    }

    /// Content staged by the pass in progress.
    #[must_use]
    pub fn staged_frame(&self) -> &RenderFrame {
        &self.staged
    }

    #[must_use]
    pub fn global_time_border(&self) -> &GlobalTimeBorder {
        &self.global_border
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.scheduler.is_drawing()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.scheduler.is_dirty()
    }
}
