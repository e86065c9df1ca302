//! The frame loop: one tick per display refresh, cancellable between ticks.
//!
//! Scheduling is modelled as a single armed continuation token. `start` arms a
//! [`FrameRequest`]; the host hands it back through [`FrameLoop::resolve`] when
//! the display refreshes. The token is checked right before the tick callback
//! runs, so a request that was cancelled by `stop` (or superseded) can never
//! run a tick, even if the host had already fired it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use circular_buffer::CircularBuffer;
use tracing::{debug, trace};

use crate::constants::STATS_WINDOW;
use crate::error::GameResult;
use crate::events::FrameTiming;
use crate::formatter;

/// Token for one scheduled display-refresh callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

/// Rolling statistics over the most recent frame deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub samples: usize,
    /// Mean time between frames, in milliseconds.
    pub mean_delta: f64,
    pub std_dev: f64,
    pub average_fps: f64,
}

struct LoopState {
    running: bool,
    armed: Option<FrameRequest>,
    next_request: u64,
    time: Option<f64>,
    previous_time: Option<f64>,
    frames: u64,
    deltas: CircularBuffer<STATS_WINDOW, f64>,
}

impl LoopState {
    fn arm(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_request);
        self.next_request += 1;
        self.armed = Some(request);
        request
    }

    fn stats(&self) -> FrameStats {
        if self.deltas.is_empty() {
            return FrameStats::default();
        }

        let count = self.deltas.len() as f64;
        let mean = self.deltas.iter().sum::<f64>() / count;
        let variance = self
            .deltas
            .iter()
            .map(|value| {
                let diff = mean - value;
                diff * diff
            })
            .sum::<f64>()
            / count;

        FrameStats {
            samples: self.deltas.len(),
            mean_delta: mean,
            std_dev: variance.sqrt(),
            average_fps: if mean > 0.0 { 1000.0 / mean } else { 0.0 },
        }
    }
}

/// Shared handle to the frame loop. Clones control the same loop, which lets
/// handlers capture one and call [`FrameLoop::stop`] mid-tick.
#[derive(Clone)]
pub struct FrameLoop {
    state: Rc<RefCell<LoopState>>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FrameLoop")
            .field("running", &state.running)
            .field("armed", &state.armed)
            .field("frames", &state.frames)
            .finish()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(LoopState {
                running: false,
                armed: None,
                next_request: 0,
                time: None,
                previous_time: None,
                frames: 0,
                deltas: CircularBuffer::new(),
            })),
        }
    }

    /// Stopped -> Running, arming the first refresh. No-op while running.
    pub fn start(&self) {
        let mut state = self.state.borrow_mut();
        if state.running {
            return;
        }

        state.running = true;
        let request = state.arm();
        debug!(?request, "Frame loop started");
    }

    /// Cancels the armed refresh (if any) and stops. A tick already running
    /// finishes, but no further tick is scheduled.
    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(request) = state.armed.take() {
            trace!(?request, "Cancelled pending frame");
        }
        if state.running {
            debug!(frames = state.frames, "Frame loop stopped");
        }
        state.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    /// The refresh the loop is currently waiting for.
    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.state.borrow().armed
    }

    /// Number of ticks run so far.
    pub fn frames(&self) -> u64 {
        self.state.borrow().frames
    }

    /// Timestamps of the most recent tick; zeroes before the first one.
    pub fn timing(&self) -> FrameTiming {
        let state = self.state.borrow();
        FrameTiming::new(state.time.unwrap_or(0.0), state.previous_time.unwrap_or(0.0))
    }

    pub fn fps(&self) -> f64 {
        self.timing().fps()
    }

    pub fn stats(&self) -> FrameStats {
        self.state.borrow().stats()
    }

    /// Delivers a display refresh at `time` (milliseconds).
    ///
    /// If `request` is the armed one, shifts the timestamps, runs `on_tick`
    /// synchronously and, if the loop is still running afterwards, arms the
    /// next refresh. Returns whether a tick ran.
    ///
    /// # Errors
    ///
    /// Propagates the error of `on_tick`. The loop is stopped first: the
    /// continuation is never re-armed after a failed tick.
    pub fn resolve<F>(&self, request: FrameRequest, time: f64, on_tick: F) -> GameResult<bool>
    where
        F: FnOnce(FrameTiming) -> GameResult<()>,
    {
        let timing = {
            let mut state = self.state.borrow_mut();
            if !state.running || state.armed != Some(request) {
                trace!(?request, armed = ?state.armed, "Ignoring stale frame");
                return Ok(false);
            }
            state.armed = None;

            // The first tick has no distinct previous timestamp.
            let previous = state.time.unwrap_or(time);
            state.previous_time = Some(previous);
            state.time = Some(time);
            state.frames += 1;

            let timing = FrameTiming::new(time, previous);
            if state.frames > 1 {
                state.deltas.push_back(timing.delta());
            }
            timing
        };

        formatter::increment_frame();

        // No borrow is held here: the callback may stop or restart the loop.
        if let Err(error) = on_tick(timing) {
            let mut state = self.state.borrow_mut();
            state.running = false;
            state.armed = None;
            return Err(error);
        }

        let mut state = self.state.borrow_mut();
        if state.running && state.armed.is_none() {
            state.arm();
        }

        if state.frames % STATS_WINDOW as u64 == 0 {
            let stats = state.stats();
            debug!(
                frames = state.frames,
                fps = format_args!("{:.1}", stats.average_fps),
                mean = format_args!("{:.3}ms", stats.mean_delta),
                std_dev = format_args!("{:.3}ms", stats.std_dev),
                "Frame statistics"
            );
        }

        Ok(true)
    }
}
