use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ChartError, ChartResult};

/// Timing of the redraw scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Period of the background check for deferred redraws.
    pub tick_period: Duration,
    /// Quiet time required after the last resize before redrawing.
    pub resize_debounce: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            resize_debounce: Duration::from_secs(1),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(self) -> ChartResult<()> {
        if self.tick_period.is_zero() {
            return Err(ChartError::InvalidData(
                "scheduler tick period must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Message accepted by the engine's redraw queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RedrawRequest {
    /// Data changed; redraw as soon as no pass is running.
    Invalidate,
    /// The host surface changed size.
    Resized,
    SetLineAtTime(DateTime<Utc>),
    ClearLine,
}

/// Crosshair change coalesced while a pass is running; the last one wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineRequest {
    At(DateTime<Utc>),
    Clear,
}

/// Why a draw pass was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassReason {
    Requested,
    Tick,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawDecision {
    Immediate,
    Deferred,
}

/// Cloneable, `Send` producer side of the redraw queue.
///
/// Posting never blocks; requests are consumed on the next
/// [`super::ChartEngine::pump`].
#[derive(Debug, Clone)]
pub struct RedrawHandle {
    sender: Sender<RedrawRequest>,
}

impl RedrawHandle {
    /// Returns `false` once the engine has been dropped.
    pub fn post(&self, request: RedrawRequest) -> bool {
        self.sender.send(request).is_ok()
    }

    pub fn invalidate(&self) -> bool {
        self.post(RedrawRequest::Invalidate)
    }

    pub fn resized(&self) -> bool {
        self.post(RedrawRequest::Resized)
    }

    pub fn set_line_at_time(&self, time: DateTime<Utc>) -> bool {
        self.post(RedrawRequest::SetLineAtTime(time))
    }

    pub fn clear_line(&self) -> bool {
        self.post(RedrawRequest::ClearLine)
    }
}

/// Single-consumer redraw state machine.
///
/// Guarantees at most one pass in flight: requests that arrive while drawing
/// only mark the scheduler dirty and are picked up by the next tick.
#[derive(Debug)]
pub struct RedrawScheduler {
    config: SchedulerConfig,
    sender: Sender<RedrawRequest>,
    receiver: Receiver<RedrawRequest>,
    dirty: bool,
    drawing: bool,
    requested: bool,
    next_tick: Option<Instant>,
    resize_deadlines: VecDeque<Instant>,
    resize_ready: bool,
    pending_line: Option<LineRequest>,
}

impl RedrawScheduler {
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            config,
            sender,
            receiver,
            dirty: false,
            drawing: false,
            requested: false,
            next_tick: None,
            resize_deadlines: VecDeque::new(),
            resize_ready: false,
            pending_line: None,
        }
    }

    #[must_use]
    pub fn handle(&self) -> RedrawHandle {
        RedrawHandle {
            sender: self.sender.clone(),
        }
    }

    #[must_use]
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Resize events still inside their debounce window.
    #[must_use]
    pub fn pending_resizes(&self) -> usize {
        self.resize_deadlines.len()
    }

    /// Explicit redraw request.
    pub fn request_draw(&mut self) -> DrawDecision {
        if self.drawing {
            self.dirty = true;
            DrawDecision::Deferred
        } else {
            DrawDecision::Immediate
        }
    }

    pub fn on_resize(&mut self, now: Instant) {
        self.resize_deadlines
            .push_back(now + self.config.resize_debounce);
        trace!(pending = self.resize_deadlines.len(), "resize debounced");
    }

    pub fn defer_line(&mut self, request: LineRequest) {
        self.pending_line = Some(request);
    }

    pub fn take_pending_line(&mut self) -> Option<LineRequest> {
        self.pending_line.take()
    }

    /// Moves queued messages into scheduler state.
    pub fn drain_requests(&mut self, now: Instant) {
        while let Ok(request) = self.receiver.try_recv() {
            match request {
                RedrawRequest::Invalidate => {
                    if self.request_draw() == DrawDecision::Immediate {
                        self.requested = true;
                    }
                }
                RedrawRequest::Resized => self.on_resize(now),
                RedrawRequest::SetLineAtTime(time) => self.defer_line(LineRequest::At(time)),
                RedrawRequest::ClearLine => self.defer_line(LineRequest::Clear),
            }
        }
    }

    /// Advances resize deadlines and the tick clock; returns the reason for a
    /// pass that is due now.
    pub fn poll(&mut self, now: Instant) -> Option<PassReason> {
        let had_resizes = !self.resize_deadlines.is_empty();
        while self
            .resize_deadlines
            .front()
            .is_some_and(|deadline| *deadline <= now)
        {
            self.resize_deadlines.pop_front();
        }
        if had_resizes && self.resize_deadlines.is_empty() {
            self.resize_ready = true;
        }

        let mut ticked = false;
        match self.next_tick {
            None => self.next_tick = Some(now + self.config.tick_period),
            Some(mut next) => {
                while now >= next {
                    next += self.config.tick_period;
                    ticked = true;
                }
                self.next_tick = Some(next);
            }
        }

        if self.drawing {
            return None;
        }
        if self.resize_ready {
            return Some(PassReason::Resize);
        }
        if self.requested {
            return Some(PassReason::Requested);
        }
        if ticked && self.dirty {
            return Some(PassReason::Tick);
        }
        None
    }

    /// Marks a pass as running; it covers every request seen so far.
    pub fn start_pass(&mut self) {
        self.drawing = true;
        self.dirty = false;
        self.requested = false;
        self.resize_ready = false;
    }

    pub fn finish_pass(&mut self) {
        self.drawing = false;
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{DrawDecision, PassReason, RedrawScheduler, SchedulerConfig};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn request_while_drawing_is_deferred_to_next_tick() {
        let start = Instant::now();
        let mut scheduler = RedrawScheduler::new(SchedulerConfig::default());
        assert_eq!(scheduler.poll(start), None);

        scheduler.start_pass();
        assert_eq!(scheduler.request_draw(), DrawDecision::Deferred);
        assert!(scheduler.is_dirty());
        assert_eq!(scheduler.poll(start + ms(1_100)), None);
        scheduler.finish_pass();

        assert_eq!(scheduler.poll(start + ms(1_500)), None);
        assert_eq!(scheduler.poll(start + ms(2_000)), Some(PassReason::Tick));
        scheduler.start_pass();
        scheduler.finish_pass();
        assert_eq!(scheduler.poll(start + ms(3_000)), None);
    }

    #[test]
    fn resize_burst_becomes_ready_once_after_quiet_period() {
        let start = Instant::now();
        let mut scheduler = RedrawScheduler::new(SchedulerConfig::default());
        for step in 0..5 {
            scheduler.on_resize(start + ms(step * 50));
        }
        assert_eq!(scheduler.pending_resizes(), 5);
        assert_eq!(scheduler.poll(start + ms(1_100)), None);
        assert_eq!(scheduler.pending_resizes(), 2);
        assert_eq!(scheduler.poll(start + ms(1_250)), Some(PassReason::Resize));
        scheduler.start_pass();
        scheduler.finish_pass();
        assert_eq!(scheduler.poll(start + ms(2_500)), None);
    }

    #[test]
    fn queued_invalidate_requests_coalesce_into_one_pass() {
        let start = Instant::now();
        let mut scheduler = RedrawScheduler::new(SchedulerConfig::default());
        let handle = scheduler.handle();
        assert!(handle.invalidate());
        assert!(handle.invalidate());
        assert!(handle.invalidate());

        scheduler.drain_requests(start);
        assert_eq!(scheduler.poll(start), Some(PassReason::Requested));
        scheduler.start_pass();
        scheduler.finish_pass();
        scheduler.drain_requests(start + ms(10));
        assert_eq!(scheduler.poll(start + ms(10)), None);
    }
}
