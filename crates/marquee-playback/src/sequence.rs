//! Attract-mode sequencer.
//!
//! A finite-state machine over a fixed cyclic schedule of presentation
//! stages (title card, demo playback, credit card). The host calls
//! `update()` once per frame at the fixed tick rate; the sequencer delegates
//! to the active stage and reports when the presentation layer should run a
//! screen wipe.
//!
//! Transition state lives entirely on the owned sequencer value: `next !=
//! current` (or a forced first entry) is the sole transition trigger, and it
//! is cleared the instant the transition is processed. Entering any stage
//! unconditionally drops the previous playback controller and simulation
//! driver; nothing survives a stage boundary.

use marquee_core::audio::{AudioBackend, MusicTrack};
use marquee_core::config::GameConfig;
use marquee_core::demo::{Demo, DemoLoadError};
use marquee_core::driver::{DriverFactory, InputEvent, UpdateResult};
use marquee_core::pack::LumpSource;

use crate::playback::{DemoPlayback, PlaybackUpdate};

// ---------------------------------------------------------------------------
// Timing constants
// ---------------------------------------------------------------------------

/// Fixed simulation tick rate, in ticks per second.
pub const TICK_RATE: u64 = 35;

/// Title card duration for episodic content, in ticks.
pub const TITLE_TICKS: u64 = 170;

/// Title card duration for commercial content, in ticks.
pub const TITLE_TICKS_COMMERCIAL: u64 = TICK_RATE * 11;

/// Credit card duration, in ticks.
pub const CREDIT_TICKS: u64 = 200;

// ---------------------------------------------------------------------------
// Stage schedule
// ---------------------------------------------------------------------------

/// One phase of the attract cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Timed title card.
    Title,
    /// Timed credit card.
    Credit,
    /// Playback of the named recording.
    Demo(&'static str),
}

/// The fixed cyclic schedule. After the last index the cycle wraps to 0.
pub const SCHEDULE: [Stage; 8] = [
    Stage::Title,
    Stage::Demo("DEMO1"),
    Stage::Credit,
    Stage::Demo("DEMO2"),
    Stage::Title,
    Stage::Demo("DEMO3"),
    Stage::Credit,
    Stage::Demo("DEMO4"),
];

/// Index whose entry is gated on the final recording being present. When the
/// gate fails, the tail of the schedule (indices 6 and 7) is skipped and the
/// cycle wraps early. Checked lazily, at the transition out of index 5.
const OPTIONAL_TAIL_INDEX: usize = 6;

// ---------------------------------------------------------------------------
// AttractSequence
// ---------------------------------------------------------------------------

/// The attract-mode state machine.
///
/// Owns at most one live [`DemoPlayback`] (and with it, one simulation
/// driver) at a time, for the active demo stage.
pub struct AttractSequence<F, A, P>
where
    F: DriverFactory,
    A: AudioBackend,
    P: LumpSource,
{
    factory: F,
    audio: A,
    pack: P,
    config: GameConfig,

    current: usize,
    next: usize,
    tick: u64,
    target: u64,
    playback: Option<DemoPlayback<F::Driver>>,
    reset_pending: bool,
    force_enter: bool,
}

impl<F, A, P> AttractSequence<F, A, P>
where
    F: DriverFactory,
    A: AudioBackend,
    P: LumpSource,
{
    /// Build a sequencer armed at stage 0. The first `update()` call enters
    /// the stage and reports `NeedWipe`.
    pub fn new(factory: F, audio: A, pack: P, config: GameConfig) -> Self {
        Self {
            factory,
            audio,
            pack,
            config,
            current: 0,
            next: 0,
            tick: 0,
            target: 0,
            playback: None,
            reset_pending: false,
            force_enter: true,
        }
    }

    /// Advance the attract loop by one tick.
    ///
    /// Returns `NeedWipe` when this call entered a stage (or the active
    /// demo's driver requested a wipe), `None` otherwise. The only error is
    /// a demo stage whose recording cannot be constructed; that is fatal to
    /// the caller -- skipping the stage would desynchronize the fixed cycle.
    pub fn update(&mut self) -> Result<UpdateResult, DemoLoadError> {
        if self.reset_pending {
            self.reset_pending = false;
            self.playback = None;
            self.next = 0;
            self.force_enter = true;
        }

        let mut need_wipe = false;
        if self.next != self.current || self.force_enter {
            self.force_enter = false;
            self.current = self.next;
            self.enter_stage()?;
            need_wipe = true;
        }

        let result = self.tick_stage();
        if need_wipe || result == UpdateResult::NeedWipe {
            Ok(UpdateResult::NeedWipe)
        } else {
            Ok(UpdateResult::None)
        }
    }

    /// Request a re-arm from stage 0. Takes effect on the next `update()`
    /// call, which is guaranteed to report `NeedWipe`; the flag is consumed
    /// exactly once.
    pub fn reset(&mut self) {
        self.reset_pending = true;
    }

    /// Forward a raw input event to the active demo's driver, if any.
    pub fn do_event(&mut self, event: &InputEvent) -> bool {
        match self.playback.as_mut() {
            Some(playback) => playback.do_event(event),
            None => false,
        }
    }

    /// Index of the active stage in [`SCHEDULE`].
    pub fn stage_index(&self) -> usize {
        self.current
    }

    /// The active stage.
    pub fn current_stage(&self) -> Stage {
        SCHEDULE[self.current]
    }

    /// The live playback controller, present during demo stages.
    pub fn active_playback(&self) -> Option<&DemoPlayback<F::Driver>> {
        self.playback.as_ref()
    }

    /// The audio collaborator.
    pub fn audio(&self) -> &A {
        &self.audio
    }

    // -- stage machinery ----------------------------------------------------

    fn enter_stage(&mut self) -> Result<(), DemoLoadError> {
        self.playback = None;
        self.tick = 0;
        match SCHEDULE[self.current] {
            Stage::Title => {
                self.target = if self.config.mode.is_commercial() {
                    TITLE_TICKS_COMMERCIAL
                } else {
                    TITLE_TICKS
                };
            }
            Stage::Credit => {
                self.target = CREDIT_TICKS;
            }
            Stage::Demo(name) => {
                let demo = Demo::load(name, &self.pack, &self.config)?;
                let driver = self.factory.create(demo.config());
                self.playback = Some(DemoPlayback::new(demo, driver));
            }
        }
        log::debug!(
            "attract stage {} entered: {:?}",
            self.current,
            SCHEDULE[self.current]
        );
        Ok(())
    }

    fn tick_stage(&mut self) -> UpdateResult {
        match SCHEDULE[self.current] {
            Stage::Title => {
                self.tick += 1;
                if self.tick == 1 {
                    let track = if self.config.mode.is_commercial() {
                        MusicTrack::TitleCommercial
                    } else {
                        MusicTrack::Title
                    };
                    self.audio.start_music(track, false);
                }
                if self.tick >= self.target {
                    self.advance();
                }
                UpdateResult::None
            }
            Stage::Credit => {
                self.tick += 1;
                if self.tick >= self.target {
                    self.advance();
                }
                UpdateResult::None
            }
            Stage::Demo(_) => {
                // A demo stage always carries a live controller; enter_stage
                // either built one or failed the whole update.
                let Some(playback) = self.playback.as_mut() else {
                    return UpdateResult::None;
                };
                match playback.update() {
                    PlaybackUpdate::Completed => {
                        self.advance();
                        UpdateResult::None
                    }
                    PlaybackUpdate::Continue(UpdateResult::NeedWipe) => UpdateResult::NeedWipe,
                    PlaybackUpdate::Continue(_) => UpdateResult::None,
                }
            }
        }
    }

    /// Route `next` to the following schedule index, wrapping cyclically and
    /// applying the optional-tail gate.
    fn advance(&mut self) {
        let mut next = self.current + 1;
        if next == SCHEDULE.len() {
            next = 0;
        }
        if next == OPTIONAL_TAIL_INDEX && !self.has_final_demo() {
            next = 0;
        }
        self.next = next;
    }

    fn has_final_demo(&self) -> bool {
        match SCHEDULE[SCHEDULE.len() - 1] {
            Stage::Demo(name) => self.pack.has_lump(name),
            _ => true,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
