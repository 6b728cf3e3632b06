use std::time::Instant;

use tracing::{debug, warn};

use crate::error::{ChartError, ChartResult};
use crate::render::{DrawingSurface, RenderFrame};

use super::{ChartEngine, DrawDecision, PassReason, RedrawHandle};

impl<S: DrawingSurface, P> ChartEngine<S, P> {
    /// Replaces the surface content with the staged frame.
    ///
    /// The surface is cleared only after the frame validated, so a rejected
    /// frame leaves the previous one visible. When the surface refuses a
    /// primitive halfway, the previously committed frame is replayed and the
    /// error is returned.
    pub fn commit(&mut self) -> ChartResult<()> {
        self.staged.validate()?;
        let frame = std::mem::replace(&mut self.staged, RenderFrame::new(self.viewport));

        self.interaction.forget_overlay_primitives();
        if let Err(err) = replay_frame(&mut self.surface, &frame) {
            warn!(error = %err, "surface rejected frame; restoring previous frame");
            if let Err(restore_err) = replay_frame(&mut self.surface, &self.committed.frame) {
                warn!(error = %restore_err, "previous frame could not be restored");
            }
            self.sync_overlays();
            return Err(err);
        }

        self.committed.points = std::mem::take(&mut self.staged_points);
        self.committed.global_border = self.global_border;
        self.committed.viewport = frame.viewport;
        self.committed.transform = frame.transform;
        self.committed.frame = frame;
        self.sync_overlays();

        debug!(
            primitives = self.committed.frame.primitives.len(),
            points = self.committed.points.len(),
            scale_x = self.committed.transform.scale_x,
            "frame committed"
        );
        Ok(())
    }

    /// Runs one complete draw pass: `initialize`, the host `pass`,
    /// `stretch_to_fit` and `commit`.
    ///
    /// A failing pass is logged and leaves the previous frame in place; the
    /// scheduler is always released. Line requests held back during the pass
    /// are applied afterwards.
    pub fn run_pass<F>(&mut self, pass: F) -> ChartResult<()>
    where
        F: FnOnce(&mut Self) -> ChartResult<()>,
    {
        if self.scheduler.is_drawing() {
            return Err(ChartError::PassInProgress);
        }

        self.scheduler.start_pass();
        let result = self.execute_pass(pass);
        self.scheduler.finish_pass();

        match &result {
            Ok(()) => {
                self.pass_count += 1;
                debug!(pass = self.pass_count, "draw pass finished");
            }
            Err(err) => warn!(error = %err, "draw pass failed; previous frame kept"),
        }
        if let Some(request) = self.scheduler.take_pending_line() {
            self.apply_line_request(request);
        }
        result
    }

    /// Draws now when no pass is running, otherwise leaves the request for
    /// the next scheduler tick. Returns whether a pass ran.
    pub fn begin_draw<F>(&mut self, pass: F) -> ChartResult<bool>
    where
        F: FnOnce(&mut Self) -> ChartResult<()>,
    {
        match self.scheduler.request_draw() {
            DrawDecision::Immediate => {
                self.run_pass(pass)?;
                Ok(true)
            }
            DrawDecision::Deferred => {
                debug!("draw request deferred to next tick");
                Ok(false)
            }
        }
    }

    /// Single consumer of the redraw queue.
    ///
    /// Drains posted requests, advances resize debouncing and the tick clock,
    /// and runs at most one pass. Returns the reason of the pass that ran;
    /// a failed pass is logged and not propagated.
    pub fn pump<F>(&mut self, now: Instant, pass: F) -> Option<PassReason>
    where
        F: FnOnce(&mut Self) -> ChartResult<()>,
    {
        self.scheduler.drain_requests(now);
        if let Some(request) = self.scheduler.take_pending_line() {
            self.apply_line_request(request);
        }

        let reason = self.scheduler.poll(now)?;
        debug!(?reason, "scheduled draw pass");
        // Failures are already logged by `run_pass`.
        let _ = self.run_pass(pass);
        Some(reason)
    }

    /// Records a host resize; the redraw follows once resizing has been quiet
    /// for the configured debounce delay.
    pub fn resize(&mut self, now: Instant) {
        self.scheduler.on_resize(now);
    }

    #[must_use]
    pub fn pending_resizes(&self) -> usize {
        self.scheduler.pending_resizes()
    }

    /// Cloneable sender for posting redraw requests from other threads.
    #[must_use]
    pub fn redraw_handle(&self) -> RedrawHandle {
        self.scheduler.handle()
    }

    fn execute_pass<F>(&mut self, pass: F) -> ChartResult<()>
    where
        F: FnOnce(&mut Self) -> ChartResult<()>,
    {
        self.initialize()?;
        pass(self)?;
        self.stretch_to_fit()?;
        self.commit()
    }
}

fn replay_frame<S: DrawingSurface>(surface: &mut S, frame: &RenderFrame) -> ChartResult<()> {
    surface.clear();
    for (layer, primitive) in &frame.primitives {
        surface.add(*layer, primitive.clone())?;
    }
    surface.set_transform(frame.transform);
    Ok(())
}
