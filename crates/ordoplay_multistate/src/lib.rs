// SPDX-License-Identifier: MIT OR Apache-2.0
//! Multi-state frame animation sequencer for `OrdoPlay`.
//!
//! An animation is split into named sections (e.g. "pending", "loading",
//! "finished"). Each section has a steady-state clip and may declare
//! transition clips that play only when arriving from a specific section:
//! - Immediate section changes (`transition_now`)
//! - Queued section changes that wait for a one-shot clip to finish
//! - Transition clips, including one played out of the idle state
//! - Listener notifications around every clip
//!
//! ## Architecture
//!
//! The sequencer is built on:
//! - An immutable section registry, loaded from JSON/RON or built in code
//! - A clip factory seam that turns descriptors into live clips
//! - Completion signals reported by the host that drives the clips
//! - A non-owning listener and an optional host surface

pub mod builder;
pub mod clip;
pub mod config;
pub mod frame_player;
pub mod listener;
pub mod registry;
pub mod section;
pub mod sequencer;

pub use builder::{RegistryBuilder, SectionBuilder, TransitionBuilder};
pub use clip::{
    ClipDescriptor, ClipFactory, ClipId, FrameRef, Playable, DEFAULT_FRAME_DURATION_MS, DEFAULT_ONE_SHOT,
};
pub use config::{AnimationConfig, ConfigError, SectionConfig, TransitionConfig};
pub use frame_player::{FrameError, FramePlayer, FramePlayerFactory};
pub use listener::{ClipEvent, HostBinding, SequencerListener};
pub use registry::{RegistryError, SectionRegistry};
pub use section::{ResolvedClip, Section, NO_PREDECESSOR};
pub use sequencer::{Sequencer, SequencerError, SequencerState};
