//! Per-player, per-tick input records.
//!
//! A [`TickCommand`] is the recorded input of one player for one simulation
//! tick. The payload is opaque to the playback layer: the simulation decides
//! what the movement and button bits mean. Commands are allocated once per
//! player slot and overwritten every tick.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of player slots a recording can address.
pub const MAX_PLAYERS: usize = 4;

/// Wire size of one encoded command, in bytes.
pub const COMMAND_LEN: usize = 4;

// ---------------------------------------------------------------------------
// TickCommand
// ---------------------------------------------------------------------------

/// The recorded input of a single player for a single tick.
///
/// The default value is the neutral no-op command (no movement, no turning,
/// no buttons), used for inactive player slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickCommand {
    /// Forward/backward movement, signed.
    pub forward: i8,
    /// Sideways movement, signed.
    pub strafe: i8,
    /// Turning delta, signed.
    pub turn: i8,
    /// Action button bits. Meaning is owned by the simulation.
    pub buttons: u8,
}

impl TickCommand {
    /// Decode a command from its 4-byte wire encoding.
    pub fn from_bytes(bytes: [u8; COMMAND_LEN]) -> Self {
        Self {
            forward: bytes[0] as i8,
            strafe: bytes[1] as i8,
            turn: bytes[2] as i8,
            buttons: bytes[3],
        }
    }

    /// Encode a command into its 4-byte wire encoding.
    pub fn to_bytes(self) -> [u8; COMMAND_LEN] {
        [
            self.forward as u8,
            self.strafe as u8,
            self.turn as u8,
            self.buttons,
        ]
    }

    /// Whether this command is the neutral no-op command.
    pub fn is_neutral(self) -> bool {
        self == Self::default()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Test 1: default_is_neutral
    // -----------------------------------------------------------------------
    #[test]
    fn default_is_neutral() {
        let cmd = TickCommand::default();
        assert_eq!(cmd.forward, 0);
        assert_eq!(cmd.strafe, 0);
        assert_eq!(cmd.turn, 0);
        assert_eq!(cmd.buttons, 0);
        assert!(cmd.is_neutral());
    }

    // -----------------------------------------------------------------------
    // Test 2: wire_round_trip
    // -----------------------------------------------------------------------
    #[test]
    fn wire_round_trip() {
        let cmd = TickCommand {
            forward: 50,
            strafe: -24,
            turn: -1,
            buttons: 0b0000_0101,
        };
        let decoded = TickCommand::from_bytes(cmd.to_bytes());
        assert_eq!(decoded, cmd);
        assert!(!decoded.is_neutral());
    }

    // -----------------------------------------------------------------------
    // Test 3: signed_fields_decode_from_raw_bytes
    // -----------------------------------------------------------------------
    #[test]
    fn signed_fields_decode_from_raw_bytes() {
        // 0xFF is -1 for the signed movement fields but 255 for buttons.
        let cmd = TickCommand::from_bytes([0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(cmd.forward, -1);
        assert_eq!(cmd.strafe, -1);
        assert_eq!(cmd.turn, -1);
        assert_eq!(cmd.buttons, 255);
    }
}
