//! Marquee Playback -- demo playback controller and attract-mode sequencer.
//!
//! This crate turns the recordings, traits, and archive from `marquee-core`
//! into a running presentation: [`playback::DemoPlayback`] replays one
//! recording against one fresh simulation driver, and
//! [`sequence::AttractSequence`] cycles the unattended title / demo / credit
//! loop forever, rebuilding playback state at every stage boundary.
//!
//! # Usage
//!
//! ```rust,ignore
//! use marquee_core::config::GameConfig;
//! use marquee_core::driver::UpdateResult;
//! use marquee_core::pack::ResourcePack;
//! use marquee_playback::sequence::AttractSequence;
//!
//! let pack = ResourcePack::open("content.mpak".as_ref())?;
//! let factory = |config: &GameConfig| host.build_sim(config);
//! let mut attract = AttractSequence::new(factory, audio, pack, config);
//!
//! // Once per host frame, at the fixed tick rate:
//! if attract.update()? == UpdateResult::NeedWipe {
//!     screen.start_wipe();
//! }
//! ```

pub mod playback;
pub mod sequence;

pub use playback::{DemoPlayback, PlaybackUpdate};
pub use sequence::{AttractSequence, Stage, TICK_RATE};
