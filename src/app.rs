//! App: settings, the tick and the async run loop.
//!
//! [`App`] wraps a [`UiContext`] with the two queues that feed it between
//! frames: deferred callbacks (the timer boundary) and normalized input
//! events. [`App::tick`] runs queued work within a time budget and then
//! always drains the task queue completely, so every tick ends with the
//! surface up to date. [`App::run`] drives ticks from a tokio interval.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use crate::context::{FrameReport, UiContext};
use crate::event::{InputEvent, InputQueue};
use crate::render::{ImageQuality, Surface, SurfaceError};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Runtime configuration, consumed at the start of every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Frames per second for [`App::run`]. Zero means uncapped.
    pub frame_rate_cap: u32,
    /// Threads rendering dirty rects. One renders on the tick's thread.
    pub parallel_rendering_threads: usize,
    /// Tint repainted regions in what is sent to the surface.
    pub paint_flashing: bool,
    /// Sampling used when background images are scaled.
    pub image_quality: ImageQuality,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_rate_cap: 60,
            parallel_rendering_threads: 1,
            paint_flashing: false,
            image_quality: ImageQuality::Bilinear,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame_rate_cap(mut self, fps: u32) -> Self {
        self.frame_rate_cap = fps;
        self
    }

    pub fn with_parallel_rendering_threads(mut self, threads: usize) -> Self {
        self.parallel_rendering_threads = threads;
        self
    }

    pub fn with_paint_flashing(mut self, on: bool) -> Self {
        self.paint_flashing = on;
        self
    }

    pub fn with_image_quality(mut self, quality: ImageQuality) -> Self {
        self.image_quality = quality;
        self
    }

    /// Time between frames of the run loop.
    pub fn frame_period(&self) -> Duration {
        match self.frame_rate_cap {
            0 => Duration::from_millis(1),
            fps => Duration::from_secs(1) / fps,
        }
    }
}

// ---------------------------------------------------------------------------
// Messages and errors
// ---------------------------------------------------------------------------

/// A callback run against the context at the start of a tick.
pub type Deferred = Box<dyn FnOnce(&mut UiContext) + Send>;

/// What other tasks can send to a running [`App`].
pub enum AppMessage {
    Input(InputEvent),
    Defer(Deferred),
    Quit,
}

impl std::fmt::Debug for AppMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppMessage::Input(event) => f.debug_tuple("Input").field(event).finish(),
            AppMessage::Defer(_) => f.write_str("Defer(..)"),
            AppMessage::Quit => f.write_str("Quit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The update loop around one [`UiContext`].
pub struct App {
    ctx: UiContext,
    settings: Settings,
    deferred: VecDeque<Deferred>,
    inputs: InputQueue,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("settings", &self.settings)
            .field("deferred", &self.deferred.len())
            .field("inputs", &self.inputs.len())
            .finish()
    }
}

impl App {
    pub fn new(ctx: UiContext, settings: Settings) -> Self {
        Self { ctx, settings, deferred: VecDeque::new(), inputs: InputQueue::new() }
    }

    pub fn ctx(&self) -> &UiContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut UiContext {
        &mut self.ctx
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings; they take effect at the next tick.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Run `f` against the context at the start of the next tick.
    pub fn defer(&mut self, f: impl FnOnce(&mut UiContext) + Send + 'static) {
        self.deferred.push_back(Box::new(f));
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.inputs.push(event);
    }

    /// Deferred callbacks and input events still waiting.
    pub fn pending(&self) -> usize {
        self.deferred.len() + self.inputs.len()
    }

    /// Run one frame.
    ///
    /// Deferred callbacks, then input events, run until `budget` is used
    /// up; what is left waits for the next tick. The task queue is then
    /// drained completely regardless of the budget.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S, budget: Duration) -> Result<FrameReport, AppError> {
        let start = Instant::now();
        self.ctx.apply_settings(&self.settings);

        let mut over_budget = false;
        while let Some(job) = self.deferred.pop_front() {
            job(&mut self.ctx);
            if start.elapsed() >= budget {
                over_budget = true;
                break;
            }
        }
        if !over_budget {
            while let Some(event) = self.inputs.pop() {
                self.ctx.handle_input(event);
                if start.elapsed() >= budget {
                    over_budget = true;
                    break;
                }
            }
        }

        let mut report = self.ctx.drain(surface)?;
        report.over_budget = over_budget || start.elapsed() > budget;
        trace!(
            elapsed_us = start.elapsed().as_micros() as u64,
            pending = self.pending(),
            over_budget = report.over_budget,
            "tick"
        );
        Ok(report)
    }

    /// Tick at the configured frame rate while handling messages from `rx`,
    /// until a [`AppMessage::Quit`] arrives or every sender is dropped. A
    /// last tick flushes whatever was queued. Returns the app so callers
    /// can inspect or resume it.
    ///
    /// A failed tick is logged and the loop keeps going; the area that did
    /// not reach the surface is blitted again on the next frame.
    pub async fn run<S: Surface + ?Sized>(mut self, surface: &mut S, mut rx: mpsc::Receiver<AppMessage>) -> Self {
        let period = self.settings.frame_period();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(period_us = period.as_micros() as u64, "app loop started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(err) = self.tick(surface, period) {
                        warn!(%err, "frame failed, retrying next tick");
                    }
                }
                message = rx.recv() => match message {
                    Some(AppMessage::Input(event)) => self.push_input(event),
                    Some(AppMessage::Defer(job)) => self.deferred.push_back(job),
                    Some(AppMessage::Quit) | None => break,
                },
            }
        }
        if let Err(err) = self.tick(surface, Duration::MAX) {
            warn!(%err, "final frame failed");
        }
        debug!("app loop stopped");
        self
    }
}
