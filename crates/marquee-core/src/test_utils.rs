//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the helpers
//! are available to this crate's tests and, via the `test-utils` feature, to
//! downstream crates' tests and benches.

use std::collections::HashMap;

use crate::audio::{AudioBackend, MusicTrack};
use crate::command::{MAX_PLAYERS, TickCommand};
use crate::config::{GameConfig, Skill};
use crate::demo::{DEMO_VERSION, END_MARKER};
use crate::driver::{InputEvent, SimulationDriver, UpdateResult};
use crate::pack::{LUMP_NAME_LEN, LumpSource, PACK_MAGIC};

// ===========================================================================
// DemoBuilder -- authors recording byte streams
// ===========================================================================

/// Builds demo recording bytes for tests and benches.
///
/// Defaults match `GameConfig::default()`: single active player in slot 0,
/// normal skill, episode 1 map 1, with a proper end marker.
#[derive(Debug, Clone)]
pub struct DemoBuilder {
    skill: Skill,
    episode: u8,
    map: u8,
    deathmatch: u8,
    console_player: u8,
    players: [bool; MAX_PLAYERS],
    body: Vec<u8>,
    end_marker: bool,
}

impl Default for DemoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoBuilder {
    pub fn new() -> Self {
        Self {
            skill: Skill::Normal,
            episode: 1,
            map: 1,
            deathmatch: 0,
            console_player: 0,
            players: [true, false, false, false],
            body: Vec::new(),
            end_marker: true,
        }
    }

    pub fn skill(mut self, skill: Skill) -> Self {
        self.skill = skill;
        self
    }

    pub fn episode(mut self, episode: u8) -> Self {
        self.episode = episode;
        self
    }

    pub fn map(mut self, map: u8) -> Self {
        self.map = map;
        self
    }

    pub fn players(mut self, players: [bool; MAX_PLAYERS]) -> Self {
        self.players = players;
        self
    }

    /// Append one tick: one command per *active* slot, in slot order.
    pub fn tick(mut self, commands: &[TickCommand]) -> Self {
        for cmd in commands {
            self.body.extend_from_slice(&cmd.to_bytes());
        }
        self
    }

    /// Append `n` ticks of neutral commands for every active slot.
    pub fn neutral_ticks(mut self, n: usize) -> Self {
        let active = self.players.iter().filter(|p| **p).count();
        let neutral = TickCommand::default().to_bytes();
        for _ in 0..n * active {
            self.body.extend_from_slice(&neutral);
        }
        self
    }

    /// Omit the end marker, producing a stream that ends by running out of
    /// bytes.
    pub fn without_end_marker(mut self) -> Self {
        self.end_marker = false;
        self
    }

    /// Build the full recording: header, body, and (unless suppressed) the
    /// end marker.
    pub fn build(self) -> Vec<u8> {
        let end_marker = self.end_marker;
        let body = self.body.clone();
        let mut bytes = self.build_header_only();
        bytes.extend_from_slice(&body);
        if end_marker {
            bytes.push(END_MARKER);
        }
        bytes
    }

    /// Build just the 13-byte header, for tests that supply their own body.
    pub fn build_header_only(self) -> Vec<u8> {
        let mut bytes = vec![
            DEMO_VERSION,
            self.skill.to_byte(),
            self.episode,
            self.map,
            self.deathmatch,
            0, // respawn monsters
            0, // fast monsters
            0, // no monsters
            self.console_player,
        ];
        for active in self.players {
            bytes.push(if active { 1 } else { 0 });
        }
        bytes
    }
}

// ===========================================================================
// write_pack -- authors lump archive bytes
// ===========================================================================

/// Build lump archive bytes from `(name, payload)` pairs. Payloads are laid
/// out after the header in entry order, followed by the directory.
pub fn write_pack(entries: &[(&str, &[u8])]) -> Vec<u8> {
    const HEADER_LEN: usize = 12;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&PACK_MAGIC);
    bytes.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&[0; 4]); // directory offset, patched below

    let mut directory = Vec::new();
    let mut offset = HEADER_LEN;
    for (name, payload) in entries {
        directory.extend_from_slice(&(offset as u32).to_le_bytes());
        directory.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        let mut raw_name = [0u8; LUMP_NAME_LEN];
        let name_bytes = name.as_bytes();
        raw_name[..name_bytes.len()].copy_from_slice(name_bytes);
        directory.extend_from_slice(&raw_name);

        bytes.extend_from_slice(payload);
        offset += payload.len();
    }

    bytes[8..12].copy_from_slice(&(offset as u32).to_le_bytes());
    bytes.extend_from_slice(&directory);
    bytes
}

// ===========================================================================
// MemoryPack -- in-memory LumpSource
// ===========================================================================

/// An in-memory lump source for tests. Names compare case-insensitively,
/// like the real archive.
#[derive(Debug, Default, Clone)]
pub struct MemoryPack {
    lumps: HashMap<String, Vec<u8>>,
}

impl MemoryPack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, bytes: Vec<u8>) {
        self.lumps.insert(name.to_ascii_uppercase(), bytes);
    }

    pub fn remove(&mut self, name: &str) {
        self.lumps.remove(&name.to_ascii_uppercase());
    }
}

impl LumpSource for MemoryPack {
    fn has_lump(&self, name: &str) -> bool {
        self.lumps.contains_key(&name.to_ascii_uppercase())
    }

    fn read_lump(&self, name: &str) -> Option<Vec<u8>> {
        self.lumps.get(&name.to_ascii_uppercase()).cloned()
    }
}

// ===========================================================================
// CountingDriver -- records every interaction
// ===========================================================================

/// A driver that records every step, event, and init call.
///
/// Its step result is a pure function of the incoming commands (button bit 0
/// of slot 0 requests a wipe), so two replays of the same recording produce
/// identical result sequences -- which is exactly what determinism tests
/// assert.
#[derive(Debug, Clone)]
pub struct CountingDriver {
    pub config: GameConfig,
    pub steps: Vec<Vec<TickCommand>>,
    pub results: Vec<UpdateResult>,
    pub events: Vec<InputEvent>,
    pub init_calls: usize,
    pub consume_events: bool,
}

impl CountingDriver {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            config: config.clone(),
            steps: Vec::new(),
            results: Vec::new(),
            events: Vec::new(),
            init_calls: 0,
            consume_events: false,
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

impl SimulationDriver for CountingDriver {
    fn step(&mut self, commands: &[TickCommand]) -> UpdateResult {
        self.steps.push(commands.to_vec());
        let result = if commands.first().is_some_and(|c| c.buttons & 0x01 != 0) {
            UpdateResult::NeedWipe
        } else {
            UpdateResult::None
        };
        self.results.push(result);
        result
    }

    fn deferred_init(&mut self) {
        self.init_calls += 1;
    }

    fn do_event(&mut self, event: &InputEvent) -> bool {
        self.events.push(*event);
        self.consume_events
    }
}

// ===========================================================================
// RecordingAudio -- records music intents
// ===========================================================================

/// An audio backend that records every `start_music` call.
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    pub calls: Vec<(MusicTrack, bool)>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for RecordingAudio {
    fn start_music(&mut self, track: MusicTrack, looping: bool) {
        self.calls.push((track, looping));
    }
}
