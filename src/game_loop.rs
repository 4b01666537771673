//! Frame pump
//!
//! The host owns the clock. A [`FrameScheduler`] stands in for the display
//! callback (browser animation frame, winit redraw, a test harness); the loop
//! turns each callback timestamp into a clamped delta and runs update, then
//! render.

use crate::consts::MAX_FRAME_DT;
use crate::sanitize_dt;

/// Requests the next frame callback from the host
pub trait FrameScheduler {
    /// Ask for one callback; returns a handle usable with [`FrameScheduler::cancel`]
    fn schedule(&mut self) -> u64;
    fn cancel(&mut self, handle: u64);
}

/// Scheduler driven by hand (tests, headless runs)
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_handle: u64,
    pending: Option<u64>,
    /// Total callbacks requested
    pub requested: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a callback is waiting to be delivered
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the pending callback, if any
    pub fn take(&mut self) -> Option<u64> {
        self.pending.take()
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&mut self) -> u64 {
        self.next_handle += 1;
        self.requested += 1;
        self.pending = Some(self.next_handle);
        self.next_handle
    }

    fn cancel(&mut self, handle: u64) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

pub struct GameLoop<S, U, R>
where
    S: FrameScheduler,
    U: FnMut(f32),
    R: FnMut(f32),
{
    scheduler: S,
    update: U,
    render: R,
    last_time: Option<f64>,
    handle: Option<u64>,
    running: bool,
    stopped: bool,
}

impl<S, U, R> GameLoop<S, U, R>
where
    S: FrameScheduler,
    U: FnMut(f32),
    R: FnMut(f32),
{
    pub fn new(scheduler: S, update: U, render: R) -> Self {
        Self {
            scheduler,
            update,
            render,
            last_time: None,
            handle: None,
            running: false,
            stopped: false,
        }
    }

    /// Begin scheduling. A stopped loop stays stopped until [`GameLoop::reset`].
    pub fn start(&mut self, now_ms: f64) {
        if self.running || self.stopped {
            return;
        }
        self.running = true;
        self.last_time = Some(now_ms);
        self.handle = Some(self.scheduler.schedule());
    }

    /// Frame callback from the host
    pub fn on_frame(&mut self, now_ms: f64) {
        if !self.running {
            return;
        }
        self.handle = None;

        let dt = match self.last_time {
            Some(last) => sanitize_dt(((now_ms - last) / 1000.0) as f32),
            None => MAX_FRAME_DT,
        };
        self.last_time = Some(now_ms);

        (self.update)(dt);
        (self.render)(dt);

        self.handle = Some(self.scheduler.schedule());
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.scheduler.cancel(handle);
        }
        self.running = false;
        self.stopped = true;
    }

    /// Allow a stopped loop to start again
    pub fn reset(&mut self) {
        self.stop();
        self.stopped = false;
        self.last_time = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
