//! Demo recording format and sequential stream reader.
//!
//! A recording is a 13-byte header followed by per-tick command records and
//! a reserved end-of-stream marker. The reader is pure-sequential and
//! read-once: there is no seeking, and once the stream has ended no further
//! reads are performed.
//!
//! # Wire Format
//!
//! ```text
//! offset  size  field
//! 0       1     format version (DEMO_VERSION)
//! 1       1     skill
//! 2       1     episode
//! 3       1     map
//! 4       1     deathmatch rule byte
//! 5       1     respawn monsters flag
//! 6       1     fast monsters flag
//! 7       1     no monsters flag
//! 8       1     console player slot
//! 9       4     player-in-game flags, one byte per slot
//! 13      4*n   per tick: one 4-byte command per active player, slot order
//! ...     1     END_MARKER
//! ```
//!
//! # Lenient Decode
//!
//! A truncated or malformed body (a record running past the end of the
//! buffer, or the buffer ending without the marker) terminates the stream
//! exactly like a clean end marker. No error reaches the caller; playback of
//! a corrupt recording simply completes early. The anomaly is logged and
//! remains observable through [`Demo::had_decode_anomaly`] so hosts and
//! tests can tell the two endings apart.

use std::io::ErrorKind;
use std::path::Path;

use crate::command::{COMMAND_LEN, MAX_PLAYERS, TickCommand};
use crate::config::{GameConfig, Skill};
use crate::pack::LumpSource;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Format version byte every readable recording must start with.
pub const DEMO_VERSION: u8 = 109;

/// Reserved end-of-stream marker. Never a valid first byte of a command
/// record.
pub const END_MARKER: u8 = 0x80;

/// Size of the recording header, in bytes.
pub const DEMO_HEADER_LEN: usize = 13;

/// Conventional file extension tried when resolving a demo name on disk.
pub const DEMO_FILE_EXT: &str = "lmp";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while resolving and parsing a recording.
///
/// These are construction-time failures only; once a [`Demo`] exists, reading
/// it cannot fail (see the lenient-decode note in the module docs).
#[derive(Debug, thiserror::Error)]
pub enum DemoLoadError {
    /// The name resolved neither on disk, with the conventional extension,
    /// nor as a lump in the resource pack.
    #[error("demo '{name}' not found on disk or in the resource pack")]
    NotFound { name: String },

    /// The byte source is smaller than the fixed header.
    #[error("demo '{name}' is truncated: {len} bytes, header needs {DEMO_HEADER_LEN}")]
    TooShort { name: String, len: usize },

    /// The recording was made by a different format version.
    #[error("demo '{name}' has format version {found}, this build reads {DEMO_VERSION}")]
    UnsupportedVersion { name: String, found: u8 },

    /// A header field holds an invalid value.
    #[error("demo '{name}' has a bad header: {detail}")]
    BadHeader { name: String, detail: String },

    /// A literal path existed but could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

/// A parsed recording: pinned configuration plus a sequential read cursor
/// over the command stream.
#[derive(Debug, Clone)]
pub struct Demo {
    config: GameConfig,
    active_players: usize,
    data: Vec<u8>,
    cursor: usize,
    finished: bool,
    anomaly: bool,
}

impl Demo {
    /// Resolve `name` to a byte source and parse it.
    ///
    /// Resolution order: (1) literal path on disk, (2) literal path with the
    /// `.lmp` extension appended, (3) named lump in `pack`. The first
    /// success wins; if none resolves, this fails with
    /// [`DemoLoadError::NotFound`].
    ///
    /// `base` supplies the ambient session configuration; the header fields
    /// of the recording override their counterparts in it.
    pub fn load<P: LumpSource>(
        name: &str,
        pack: &P,
        base: &GameConfig,
    ) -> Result<Self, DemoLoadError> {
        if let Some(bytes) = read_if_present(Path::new(name))? {
            return Self::parse(name, bytes, base);
        }
        let with_ext = format!("{name}.{DEMO_FILE_EXT}");
        if let Some(bytes) = read_if_present(Path::new(&with_ext))? {
            return Self::parse(name, bytes, base);
        }
        if let Some(bytes) = pack.read_lump(name) {
            return Self::parse(name, bytes, base);
        }
        Err(DemoLoadError::NotFound {
            name: name.to_string(),
        })
    }

    /// Parse a recording from raw bytes. `name` is used in error messages
    /// only.
    pub fn parse(name: &str, data: Vec<u8>, base: &GameConfig) -> Result<Self, DemoLoadError> {
        if data.len() < DEMO_HEADER_LEN {
            return Err(DemoLoadError::TooShort {
                name: name.to_string(),
                len: data.len(),
            });
        }
        if data[0] != DEMO_VERSION {
            return Err(DemoLoadError::UnsupportedVersion {
                name: name.to_string(),
                found: data[0],
            });
        }

        let mut config = base.clone();
        config.skill = Skill::from_byte(data[1]).ok_or_else(|| DemoLoadError::BadHeader {
            name: name.to_string(),
            detail: format!("skill byte {} out of range", data[1]),
        })?;
        config.episode = data[2];
        config.map = data[3];
        config.deathmatch = data[4];
        config.respawn_monsters = data[5] != 0;
        config.fast_monsters = data[6] != 0;
        config.no_monsters = data[7] != 0;
        config.console_player = data[8] as usize;
        if config.console_player >= MAX_PLAYERS {
            return Err(DemoLoadError::BadHeader {
                name: name.to_string(),
                detail: format!("console player slot {} out of range", data[8]),
            });
        }
        for slot in 0..MAX_PLAYERS {
            config.players_in_game[slot] = data[9 + slot] != 0;
        }

        let active_players = config.active_player_count();
        if active_players == 0 {
            return Err(DemoLoadError::BadHeader {
                name: name.to_string(),
                detail: "no active player slots".to_string(),
            });
        }

        Ok(Self {
            config,
            active_players,
            data,
            cursor: DEMO_HEADER_LEN,
            finished: false,
            anomaly: false,
        })
    }

    /// The configuration this recording is bound to. Fixed at construction.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read the next tick's commands into `out` and return `true`, or return
    /// `false` once the stream has ended.
    ///
    /// Active player slots are filled from the stream in slot order;
    /// inactive slots are reset to the neutral command. After the first
    /// `false`, no further bytes are ever read.
    pub fn read_next_tick(&mut self, out: &mut [TickCommand; MAX_PLAYERS]) -> bool {
        if self.finished {
            return false;
        }
        let Some(&first) = self.data.get(self.cursor) else {
            log::warn!("demo stream ended at byte {} without an end marker", self.cursor);
            self.anomaly = true;
            self.finished = true;
            return false;
        };
        if first == END_MARKER {
            self.finished = true;
            return false;
        }
        let need = self.active_players * COMMAND_LEN;
        if self.cursor + need > self.data.len() {
            log::warn!(
                "truncated tick record at byte {}: need {} bytes, have {}",
                self.cursor,
                need,
                self.data.len() - self.cursor
            );
            self.anomaly = true;
            self.finished = true;
            return false;
        }

        for (slot, cmd) in out.iter_mut().enumerate() {
            if self.config.players_in_game[slot] {
                let at = self.cursor;
                *cmd = TickCommand::from_bytes([
                    self.data[at],
                    self.data[at + 1],
                    self.data[at + 2],
                    self.data[at + 3],
                ]);
                self.cursor += COMMAND_LEN;
            } else {
                *cmd = TickCommand::default();
            }
        }
        true
    }

    /// Whether the stream has ended (cleanly or not).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the stream ended through truncation or corruption rather than
    /// a clean end marker. Only meaningful once [`Self::is_finished`] is
    /// true.
    pub fn had_decode_anomaly(&self) -> bool {
        self.anomaly
    }

    /// Count of complete tick records before the terminator, independent of
    /// the read cursor. A truncated trailing record is not counted.
    pub fn tick_count(&self) -> usize {
        let stride = self.active_players * COMMAND_LEN;
        let mut at = DEMO_HEADER_LEN;
        let mut ticks = 0;
        while at < self.data.len() && self.data[at] != END_MARKER && at + stride <= self.data.len()
        {
            ticks += 1;
            at += stride;
        }
        ticks
    }
}

/// Read a file, mapping "does not exist" to `None` so resolution can fall
/// through to the next candidate. Any other I/O failure is surfaced.
fn read_if_present(path: &Path) -> Result<Option<Vec<u8>>, std::io::Error> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameMode, Skill};
    use crate::test_utils::{DemoBuilder, MemoryPack};

    fn neutral_out() -> [TickCommand; MAX_PLAYERS] {
        [TickCommand::default(); MAX_PLAYERS]
    }

    // -----------------------------------------------------------------------
    // Test 1: header_fields_override_base_config
    // -----------------------------------------------------------------------
    #[test]
    fn header_fields_override_base_config() {
        let bytes = DemoBuilder::new()
            .skill(Skill::Hard)
            .episode(2)
            .map(7)
            .players([true, true, false, false])
            .neutral_ticks(1)
            .build();

        let mut base = GameConfig::default();
        base.mode = GameMode::Commercial;
        base.skill = Skill::Easy;

        let demo = Demo::parse("test", bytes, &base).unwrap();
        assert_eq!(demo.config().skill, Skill::Hard);
        assert_eq!(demo.config().episode, 2);
        assert_eq!(demo.config().map, 7);
        assert_eq!(demo.config().players_in_game, [true, true, false, false]);
        // Ambient fields pass through untouched.
        assert_eq!(demo.config().mode, GameMode::Commercial);
    }

    // -----------------------------------------------------------------------
    // Test 2: rejects_wrong_version
    // -----------------------------------------------------------------------
    #[test]
    fn rejects_wrong_version() {
        let mut bytes = DemoBuilder::new().neutral_ticks(1).build();
        bytes[0] = DEMO_VERSION - 1;
        let err = Demo::parse("test", bytes, &GameConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DemoLoadError::UnsupportedVersion { found, .. } if found == DEMO_VERSION - 1
        ));
    }

    // -----------------------------------------------------------------------
    // Test 3: rejects_short_header
    // -----------------------------------------------------------------------
    #[test]
    fn rejects_short_header() {
        let err = Demo::parse("test", vec![DEMO_VERSION, 2, 1], &GameConfig::default())
            .unwrap_err();
        assert!(matches!(err, DemoLoadError::TooShort { len: 3, .. }));
    }

    // -----------------------------------------------------------------------
    // Test 4: rejects_bad_skill_and_empty_player_set
    // -----------------------------------------------------------------------
    #[test]
    fn rejects_bad_skill_and_empty_player_set() {
        let mut bytes = DemoBuilder::new().neutral_ticks(1).build();
        bytes[1] = 9;
        let err = Demo::parse("test", bytes, &GameConfig::default()).unwrap_err();
        assert!(matches!(err, DemoLoadError::BadHeader { .. }));

        let bytes = DemoBuilder::new()
            .players([false, false, false, false])
            .build();
        let err = Demo::parse("test", bytes, &GameConfig::default()).unwrap_err();
        assert!(matches!(err, DemoLoadError::BadHeader { .. }));
    }

    // -----------------------------------------------------------------------
    // Test 5: reads_exactly_n_ticks_then_false
    // -----------------------------------------------------------------------
    #[test]
    fn reads_exactly_n_ticks_then_false() {
        let bytes = DemoBuilder::new().neutral_ticks(5).build();
        let mut demo = Demo::parse("test", bytes, &GameConfig::default()).unwrap();
        assert_eq!(demo.tick_count(), 5);

        let mut out = neutral_out();
        for _ in 0..5 {
            assert!(demo.read_next_tick(&mut out));
        }
        assert!(!demo.read_next_tick(&mut out));
        assert!(demo.is_finished());
        assert!(!demo.had_decode_anomaly());

        // Once ended, the reader stays ended.
        assert!(!demo.read_next_tick(&mut out));
    }

    // -----------------------------------------------------------------------
    // Test 6: commands_fill_active_slots_in_order
    // -----------------------------------------------------------------------
    #[test]
    fn commands_fill_active_slots_in_order() {
        let p0 = TickCommand {
            forward: 25,
            strafe: 0,
            turn: -3,
            buttons: 1,
        };
        let p2 = TickCommand {
            forward: -25,
            strafe: 4,
            turn: 0,
            buttons: 2,
        };
        let bytes = DemoBuilder::new()
            .players([true, false, true, false])
            .tick(&[p0, p2])
            .build();

        let mut demo = Demo::parse("test", bytes, &GameConfig::default()).unwrap();
        let mut out = neutral_out();
        // Seed the inactive slots with garbage to prove they are reset.
        out[1].buttons = 0xFF;
        out[3].forward = 99;

        assert!(demo.read_next_tick(&mut out));
        assert_eq!(out[0], p0);
        assert_eq!(out[2], p2);
        assert!(out[1].is_neutral());
        assert!(out[3].is_neutral());
    }

    // -----------------------------------------------------------------------
    // Test 7: truncated_record_ends_stream_with_anomaly
    // -----------------------------------------------------------------------
    #[test]
    fn truncated_record_ends_stream_with_anomaly() {
        let mut bytes = DemoBuilder::new().neutral_ticks(3).build();
        // Chop the marker plus half of the final record.
        bytes.truncate(bytes.len() - 3);

        let mut demo = Demo::parse("test", bytes, &GameConfig::default()).unwrap();
        let mut out = neutral_out();
        assert!(demo.read_next_tick(&mut out));
        assert!(demo.read_next_tick(&mut out));
        // Third record is incomplete: same termination as a clean marker.
        assert!(!demo.read_next_tick(&mut out));
        assert!(demo.is_finished());
        assert!(demo.had_decode_anomaly());
    }

    // -----------------------------------------------------------------------
    // Test 8: missing_marker_ends_stream_with_anomaly
    // -----------------------------------------------------------------------
    #[test]
    fn missing_marker_ends_stream_with_anomaly() {
        let bytes = DemoBuilder::new()
            .neutral_ticks(2)
            .without_end_marker()
            .build();
        let mut demo = Demo::parse("test", bytes, &GameConfig::default()).unwrap();
        let mut out = neutral_out();
        assert!(demo.read_next_tick(&mut out));
        assert!(demo.read_next_tick(&mut out));
        assert!(!demo.read_next_tick(&mut out));
        assert!(demo.had_decode_anomaly());
    }

    // -----------------------------------------------------------------------
    // Test 9: load_resolves_pack_lump_and_reports_not_found
    // -----------------------------------------------------------------------
    #[test]
    fn load_resolves_pack_lump_and_reports_not_found() {
        let mut pack = MemoryPack::new();
        pack.insert("DEMO1", DemoBuilder::new().neutral_ticks(2).build());

        let base = GameConfig::default();
        let demo = Demo::load("DEMO1", &pack, &base).unwrap();
        assert_eq!(demo.tick_count(), 2);

        let err = Demo::load("DEMO9", &pack, &base).unwrap_err();
        assert!(matches!(err, DemoLoadError::NotFound { .. }));
    }

    // -----------------------------------------------------------------------
    // Test 10: empty_body_is_a_clean_zero_tick_demo
    // -----------------------------------------------------------------------
    #[test]
    fn empty_body_is_a_clean_zero_tick_demo() {
        let bytes = DemoBuilder::new().build();
        let mut demo = Demo::parse("test", bytes, &GameConfig::default()).unwrap();
        assert_eq!(demo.tick_count(), 0);

        let mut out = neutral_out();
        assert!(!demo.read_next_tick(&mut out));
        assert!(!demo.had_decode_anomaly());
    }

    // =======================================================================
    // Property tests: the reader never panics and always terminates
    // =======================================================================

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Arbitrary input must never panic, whatever parse makes of it.
            #[test]
            fn parse_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
                let _ = Demo::parse("fuzz", data, &GameConfig::default());
            }

            // With a valid header and an arbitrary body, reading must
            // terminate within the number of whole records the body can hold.
            #[test]
            fn reader_terminates(body in proptest::collection::vec(any::<u8>(), 0..512)) {
                let mut bytes = DemoBuilder::new().build_header_only();
                let upper_bound = body.len() / COMMAND_LEN + 1;
                bytes.extend_from_slice(&body);

                let mut demo = Demo::parse("fuzz", bytes, &GameConfig::default()).unwrap();
                let mut out = [TickCommand::default(); MAX_PLAYERS];
                let mut reads = 0usize;
                while demo.read_next_tick(&mut out) {
                    reads += 1;
                    prop_assert!(reads <= upper_bound, "reader failed to terminate");
                }
                // The stream stays ended.
                prop_assert!(!demo.read_next_tick(&mut out));
            }
        }
    }
}
