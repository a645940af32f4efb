//! Marquee Core -- data model and wire formats for deterministic demo playback.
//!
//! This crate provides the pieces a demo-playback front end is built from:
//! the per-tick input record, the recording wire format and its sequential
//! reader, the lump archive used to bundle recordings, and the collaborator
//! traits through which a host simulation and audio backend are driven.
//!
//! # Replay Model
//!
//! A [`demo::Demo`] is an ordered, finite, read-once sequence of
//! [`command::TickCommand`] sets, one set per simulation tick, terminated by
//! a reserved end-of-stream marker. Each set carries one command per active
//! player slot. Replaying the same byte-identical recording against two
//! freshly constructed drivers with identical configuration reproduces the
//! exact same sequence of step results; tick advancement is driven purely by
//! call count, never by wall time.
//!
//! # Key Types
//!
//! - [`command::TickCommand`] -- recorded per-player input for one tick.
//! - [`config::GameConfig`] -- simulation configuration pinned by a demo at
//!   construction and propagated unchanged to every driver replaying it.
//! - [`demo::Demo`] -- a parsed recording with a sequential cursor.
//! - [`pack::ResourcePack`] -- named-lump archive, the last resort in demo
//!   name resolution.
//! - [`driver::SimulationDriver`] -- the opaque fixed-timestep step seam.
//! - [`audio::AudioBackend`] -- fire-and-forget music trigger seam.

pub mod audio;
pub mod command;
pub mod config;
pub mod demo;
pub mod driver;
pub mod pack;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
