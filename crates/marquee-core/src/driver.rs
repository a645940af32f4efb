//! Collaborator seams for the host simulation.
//!
//! The playback layer never looks inside the simulation: it drives an opaque
//! [`SimulationDriver`] one tick at a time and passes its per-tick result
//! straight through. Drivers are single-use -- the sequencer builds a fresh
//! one (via a [`DriverFactory`]) for every demo stage and drops it on stage
//! exit, so no simulation state ever survives a stage boundary.

use crate::command::TickCommand;
use crate::config::GameConfig;

// ---------------------------------------------------------------------------
// UpdateResult
// ---------------------------------------------------------------------------

/// The per-tick result of an update, shared by drivers, the playback
/// controller's pass-through, and the sequencer.
///
/// `NeedWipe` asks the presentation layer for a visual transition; it is
/// orthogonal to simulation correctness. The sequencer itself never returns
/// `Completed` -- that value only travels from a driver or playback
/// controller inward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    None,
    NeedWipe,
    Completed,
}

// ---------------------------------------------------------------------------
// Input events
// ---------------------------------------------------------------------------

/// Kind of a raw external input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    KeyDown,
    KeyUp,
}

/// A raw external input event, forwarded to the driver unchanged so the
/// simulation's UI stays responsive during scripted playback. Events never
/// alter the recorded command stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: EventKind,
    pub code: u8,
}

// ---------------------------------------------------------------------------
// SimulationDriver trait
// ---------------------------------------------------------------------------

/// One owned simulation instance, advanced exactly one fixed-timestep tick
/// per [`step`](Self::step) call.
///
/// `commands` holds one entry per player slot ([`crate::command::MAX_PLAYERS`]
/// entries); inactive slots carry the neutral command. Default
/// implementations make `deferred_init` and `do_event` no-ops so simple
/// drivers only implement `step`.
pub trait SimulationDriver {
    /// Advance the simulation by one tick using this tick's commands.
    fn step(&mut self, commands: &[TickCommand]) -> UpdateResult;

    /// One-time arming hook, called once before the first step.
    fn deferred_init(&mut self) {}

    /// Handle a raw input event. Returns whether the event was consumed.
    fn do_event(&mut self, event: &InputEvent) -> bool {
        let _ = event;
        false
    }
}

// ---------------------------------------------------------------------------
// DriverFactory trait
// ---------------------------------------------------------------------------

/// Builds a fresh simulation driver for a demo's pinned configuration.
///
/// Implemented for any `FnMut(&GameConfig) -> D` closure, which is the usual
/// way hosts plug in.
pub trait DriverFactory {
    type Driver: SimulationDriver;

    fn create(&mut self, config: &GameConfig) -> Self::Driver;
}

impl<D, F> DriverFactory for F
where
    D: SimulationDriver,
    F: FnMut(&GameConfig) -> D,
{
    type Driver = D;

    fn create(&mut self, config: &GameConfig) -> D {
        self(config)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MAX_PLAYERS;

    struct MinimalDriver {
        steps: usize,
    }

    impl SimulationDriver for MinimalDriver {
        fn step(&mut self, _commands: &[TickCommand]) -> UpdateResult {
            self.steps += 1;
            UpdateResult::None
        }
    }

    // -----------------------------------------------------------------------
    // Test 1: default_hooks_are_no_ops
    // -----------------------------------------------------------------------
    #[test]
    fn default_hooks_are_no_ops() {
        let mut driver = MinimalDriver { steps: 0 };
        driver.deferred_init();
        let consumed = driver.do_event(&InputEvent {
            kind: EventKind::KeyDown,
            code: 13,
        });
        assert!(!consumed);
        assert_eq!(driver.steps, 0);
    }

    // -----------------------------------------------------------------------
    // Test 2: closures_are_factories
    // -----------------------------------------------------------------------
    #[test]
    fn closures_are_factories() {
        let mut factory = |_config: &GameConfig| MinimalDriver { steps: 0 };
        let mut driver = factory.create(&GameConfig::default());
        let commands = [TickCommand::default(); MAX_PLAYERS];
        assert_eq!(driver.step(&commands), UpdateResult::None);
        assert_eq!(driver.steps, 1);
    }
}
