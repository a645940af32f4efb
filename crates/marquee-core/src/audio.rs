//! Audio collaborator seam.
//!
//! The attract loop issues exactly one music intent per title-stage entry.
//! The call is fire-and-forget: backend failures are not observable to the
//! sequencer and must not affect stage timing.

// ---------------------------------------------------------------------------
// MusicTrack
// ---------------------------------------------------------------------------

/// Tracks the attract loop can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    /// Title theme for the episodic releases.
    Title,
    /// Title theme for the commercial release.
    TitleCommercial,
}

// ---------------------------------------------------------------------------
// AudioBackend trait
// ---------------------------------------------------------------------------

/// Music playback backend.
pub trait AudioBackend {
    /// Start a track, optionally looping. Fire-and-forget.
    fn start_music(&mut self, track: MusicTrack, looping: bool);
}

/// Backend that discards every request, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioBackend for NullAudio {
    fn start_music(&mut self, _track: MusicTrack, _looping: bool) {}
}
