// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip descriptors and the playable-clip seam.
//!
//! A [`ClipDescriptor`] is the static description of one frame sequence. The
//! sequencer never plays descriptors directly: it asks a [`ClipFactory`] to
//! turn one into a live [`Playable`] and then listens for its completion.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default per-frame duration in milliseconds (~30fps)
pub const DEFAULT_FRAME_DURATION_MS: u32 = 33;

/// Default one-shot flag for section clips
pub const DEFAULT_ONE_SHOT: bool = true;

/// Reference to a single frame image, resolved by the clip factory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRef(pub String);

impl FrameRef {
    /// Create a frame reference
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the frame name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FrameRef {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for FrameRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static description of a frame sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipDescriptor {
    /// Frames in playback order
    pub frames: Vec<FrameRef>,
    /// Duration of each frame in milliseconds
    pub frame_duration_ms: u32,
    /// Whether the clip stops on its last frame instead of looping
    pub one_shot: bool,
}

impl ClipDescriptor {
    /// Create a descriptor with the default frame duration and one-shot flag
    pub fn new<I, F>(frames: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FrameRef>,
    {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
            frame_duration_ms: DEFAULT_FRAME_DURATION_MS,
            one_shot: DEFAULT_ONE_SHOT,
        }
    }

    /// Set the per-frame duration
    pub fn with_frame_duration(mut self, frame_duration_ms: u32) -> Self {
        self.frame_duration_ms = frame_duration_ms;
        self
    }

    /// Set the one-shot flag
    pub fn with_one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
    }

    /// Copy of this descriptor that plays exactly once.
    pub fn forced_one_shot(&self) -> Self {
        Self {
            one_shot: true,
            ..self.clone()
        }
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Duration of a single pass in milliseconds. Informational only.
    pub fn total_duration(&self) -> u32 {
        let frames = u32::try_from(self.frames.len()).unwrap_or(u32::MAX);
        self.frame_duration_ms.saturating_mul(frames)
    }
}

/// Identity of one instantiated clip.
///
/// A fresh id is minted every time the sequencer creates a clip, so a
/// completion signal can be matched to the clip that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub Uuid);

impl ClipId {
    /// Create a new random clip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live, drivable frame animation.
///
/// Implementors advance on their own clock. When a pass over the frames
/// completes they report it to the owning sequencer through
/// [`Sequencer::on_clip_finished_for`](crate::Sequencer::on_clip_finished_for).
pub trait Playable {
    /// Begin (or restart) playback
    fn start(&mut self);

    /// Halt playback
    fn stop(&mut self);

    /// Whether the clip plays once and holds its last frame
    fn is_one_shot(&self) -> bool;

    /// Whether the clip has completed at least one pass
    fn is_finished(&self) -> bool;
}

/// Turns descriptors into live clips.
///
/// This is where frame resources are loaded. Failures are handed back to the
/// caller of the sequencer operation untouched.
pub trait ClipFactory {
    /// Clip type produced by this factory
    type Clip: Playable;

    /// Error raised when a clip cannot be built
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build a clip for `descriptor`, tagged with `id`
    fn create(&mut self, id: ClipId, descriptor: &ClipDescriptor) -> Result<Self::Clip, Self::Error>;
}
