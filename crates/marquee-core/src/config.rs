//! Simulation configuration attached to a demo recording.
//!
//! A recording only reproduces its historical trajectory when it is replayed
//! against a simulation configured exactly as it was at record time. The
//! [`GameConfig`] bundles those settings. Its fields are fixed when a demo is
//! constructed and propagated unchanged to every driver created for that
//! demo; nothing here is mutated mid-playback.

use crate::command::MAX_PLAYERS;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameMode
// ---------------------------------------------------------------------------

/// Which release of the game content the simulation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Demo release, episode one only.
    Shareware,
    /// Full episodic release.
    Registered,
    /// Commercial release with map-based progression.
    Commercial,
    /// Extended episodic re-release.
    Retail,
}

impl GameMode {
    /// Whether this is the commercial release. The attract loop uses longer
    /// title timing and a different title track for commercial content.
    pub fn is_commercial(self) -> bool {
        matches!(self, GameMode::Commercial)
    }
}

// ---------------------------------------------------------------------------
// MissionPack
// ---------------------------------------------------------------------------

/// Add-on mission pack for the commercial release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionPack {
    /// Base commercial content, and the only valid value for episodic modes.
    Base,
    /// First add-on pack.
    Expansion1,
    /// Second add-on pack.
    Expansion2,
}

// ---------------------------------------------------------------------------
// Skill
// ---------------------------------------------------------------------------

/// Difficulty level, recorded in the demo header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Skill {
    VeryEasy,
    Easy,
    Normal,
    Hard,
    Nightmare,
}

impl Skill {
    /// Decode a skill from its header byte. Returns `None` for out-of-range
    /// values so the demo loader can reject a malformed header.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Skill::VeryEasy),
            1 => Some(Skill::Easy),
            2 => Some(Skill::Normal),
            3 => Some(Skill::Hard),
            4 => Some(Skill::Nightmare),
            _ => None,
        }
    }

    /// Encode a skill as its header byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Skill::VeryEasy => 0,
            Skill::Easy => 1,
            Skill::Normal => 2,
            Skill::Hard => 3,
            Skill::Nightmare => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation settings
// ---------------------------------------------------------------------------

/// Renderer settings carried through a demo unchanged. The playback layer
/// never reads these; they exist so a driver replaying a demo is configured
/// like the session that recorded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConfig {
    pub high_resolution: bool,
    pub gamma_level: u8,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            high_resolution: true,
            gamma_level: 0,
        }
    }
}

/// Audio settings carried through a demo unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundConfig {
    pub sfx_volume: u8,
    pub music_volume: u8,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            sfx_volume: 8,
            music_volume: 8,
        }
    }
}

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// The full simulation configuration a demo is bound to.
///
/// The header fields (skill, episode, map, rule flags, player slots) are
/// overridden from the recording when a demo is parsed; the content and
/// presentation fields (`mode`, `mission`, `video`, `sound`) come from the
/// ambient session and pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub mode: GameMode,
    pub mission: MissionPack,
    pub skill: Skill,
    pub episode: u8,
    pub map: u8,
    /// Deathmatch rule byte: 0 = cooperative, 1 = deathmatch, 2 = altdeath.
    pub deathmatch: u8,
    pub respawn_monsters: bool,
    pub fast_monsters: bool,
    pub no_monsters: bool,
    /// Which player slot the local presentation follows.
    pub console_player: usize,
    /// Which player slots are active. Recordings only carry commands for
    /// active slots.
    pub players_in_game: [bool; MAX_PLAYERS],
    pub video: VideoConfig,
    pub sound: SoundConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Registered,
            mission: MissionPack::Base,
            skill: Skill::Normal,
            episode: 1,
            map: 1,
            deathmatch: 0,
            respawn_monsters: false,
            fast_monsters: false,
            no_monsters: false,
            console_player: 0,
            players_in_game: [true, false, false, false],
            video: VideoConfig::default(),
            sound: SoundConfig::default(),
        }
    }
}

impl GameConfig {
    /// Number of active player slots.
    pub fn active_player_count(&self) -> usize {
        self.players_in_game.iter().filter(|p| **p).count()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Test 1: only_commercial_mode_is_commercial
    // -----------------------------------------------------------------------
    #[test]
    fn only_commercial_mode_is_commercial() {
        assert!(GameMode::Commercial.is_commercial());
        assert!(!GameMode::Shareware.is_commercial());
        assert!(!GameMode::Registered.is_commercial());
        assert!(!GameMode::Retail.is_commercial());
    }

    // -----------------------------------------------------------------------
    // Test 2: skill_byte_round_trip
    // -----------------------------------------------------------------------
    #[test]
    fn skill_byte_round_trip() {
        for byte in 0..=4u8 {
            let skill = Skill::from_byte(byte).unwrap();
            assert_eq!(skill.to_byte(), byte);
        }
    }

    // -----------------------------------------------------------------------
    // Test 3: skill_rejects_out_of_range
    // -----------------------------------------------------------------------
    #[test]
    fn skill_rejects_out_of_range() {
        assert_eq!(Skill::from_byte(5), None);
        assert_eq!(Skill::from_byte(255), None);
    }

    // -----------------------------------------------------------------------
    // Test 4: default_config_is_single_player
    // -----------------------------------------------------------------------
    #[test]
    fn default_config_is_single_player() {
        let config = GameConfig::default();
        assert_eq!(config.active_player_count(), 1);
        assert_eq!(config.console_player, 0);
        assert!(config.players_in_game[0]);
    }

    // -----------------------------------------------------------------------
    // Test 5: active_player_count_counts_all_slots
    // -----------------------------------------------------------------------
    #[test]
    fn active_player_count_counts_all_slots() {
        let mut config = GameConfig::default();
        config.players_in_game = [true, true, false, true];
        assert_eq!(config.active_player_count(), 3);
    }
}
