//! Demo playback controller.
//!
//! Binds one read-once recording to one fresh simulation driver and advances
//! both in lockstep: each `update()` call pulls one tick's commands from the
//! stream and steps the driver exactly once. Tick advancement is driven
//! purely by call count; the wall-clock timer only feeds the `fps()`
//! observability metric and never feeds back into simulation timing.

use std::time::{Duration, Instant};

use marquee_core::command::{MAX_PLAYERS, TickCommand};
use marquee_core::demo::Demo;
use marquee_core::driver::{InputEvent, SimulationDriver, UpdateResult};

// ---------------------------------------------------------------------------
// PlaybackUpdate
// ---------------------------------------------------------------------------

/// Result of one playback `update()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackUpdate {
    /// One tick was replayed; carries the driver's per-tick result
    /// (pass-through, not interpreted here).
    Continue(UpdateResult),
    /// The stream is exhausted. The driver was not stepped this call.
    Completed,
}

// ---------------------------------------------------------------------------
// DemoPlayback
// ---------------------------------------------------------------------------

/// Replays one recording against one owned simulation driver.
pub struct DemoPlayback<D: SimulationDriver> {
    demo: Demo,
    driver: D,
    commands: [TickCommand; MAX_PLAYERS],
    frames: u64,
    started_at: Option<Instant>,
    frozen_elapsed: Option<Duration>,
}

impl<D: SimulationDriver> DemoPlayback<D> {
    /// Bind a recording to a fresh driver. The driver's one-time
    /// `deferred_init` hook runs here, so a constructed controller always
    /// owns a fully armed driver.
    pub fn new(demo: Demo, mut driver: D) -> Self {
        driver.deferred_init();
        Self {
            demo,
            driver,
            commands: [TickCommand::default(); MAX_PLAYERS],
            frames: 0,
            started_at: None,
            frozen_elapsed: None,
        }
    }

    /// Replay one tick.
    ///
    /// The first call starts the wall-clock timer. When the stream is
    /// exhausted the timer freezes and `Completed` is returned without
    /// stepping the driver; every earlier call steps the driver exactly once
    /// and returns `Continue` with the driver's result.
    pub fn update(&mut self) -> PlaybackUpdate {
        let started = *self.started_at.get_or_insert_with(Instant::now);

        if !self.demo.read_next_tick(&mut self.commands) {
            if self.frozen_elapsed.is_none() {
                self.frozen_elapsed = Some(started.elapsed());
                log::debug!(
                    "demo playback completed: {} frames, {:.1} fps",
                    self.frames,
                    self.fps()
                );
            }
            return PlaybackUpdate::Completed;
        }

        self.frames += 1;
        PlaybackUpdate::Continue(self.driver.step(&self.commands))
    }

    /// Replayed frames per elapsed wall-clock second since the first
    /// `update()`; `0.0` before it. Frozen once the stream completes.
    /// Observability only.
    pub fn fps(&self) -> f64 {
        let Some(started) = self.started_at else {
            return 0.0;
        };
        let elapsed = self.frozen_elapsed.unwrap_or_else(|| started.elapsed());
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 { self.frames as f64 / secs } else { 0.0 }
    }

    /// Number of ticks replayed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Forward a raw input event to the driver unchanged. Returns whether
    /// the driver consumed it. The recorded command stream is unaffected.
    pub fn do_event(&mut self, event: &InputEvent) -> bool {
        self.driver.do_event(event)
    }

    /// The replayed recording's pinned configuration.
    pub fn demo(&self) -> &Demo {
        &self.demo
    }

    /// The owned driver, for hosts that render from simulation state.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

// ===========================================================================
// Tests
// ===========================================================================
