// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reference frame player.
//!
//! [`FramePlayer`] is a headless [`Playable`] that walks its frames on a
//! clock supplied by the caller. It is what the preview runner and tests
//! use; a real host would wrap its own image player instead.

use crate::clip::{ClipDescriptor, ClipFactory, ClipId, FrameRef, Playable};
use crate::sequencer::Sequencer;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Frame loading errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Frame is not in the catalog
    #[error("Unknown frame: {0}")]
    UnknownFrame(FrameRef),

    /// Clip has no frames
    #[error("Clip has no frames")]
    EmptyClip,

    /// Frame duration is zero
    #[error("Frame duration must be positive")]
    ZeroFrameDuration,
}

/// Plays a frame list against an external clock
#[derive(Debug, Clone)]
pub struct FramePlayer {
    id: ClipId,
    frames: Vec<FrameRef>,
    frame_duration: Duration,
    one_shot: bool,
    running: bool,
    finished: bool,
    /// Time into the current pass
    position: Duration,
}

impl FramePlayer {
    /// Create a stopped player for `descriptor`
    pub fn new(id: ClipId, descriptor: &ClipDescriptor) -> Self {
        Self {
            id,
            frames: descriptor.frames.clone(),
            frame_duration: Duration::from_millis(u64::from(descriptor.frame_duration_ms)),
            one_shot: descriptor.one_shot,
            running: false,
            finished: false,
            position: Duration::ZERO,
        }
    }

    /// ID assigned by the sequencer
    pub fn id(&self) -> ClipId {
        self.id
    }

    /// Whether the player is advancing
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Length of one pass
    pub fn pass_duration(&self) -> Duration {
        self.frame_duration * u32::try_from(self.frames.len()).unwrap_or(u32::MAX)
    }

    /// Index of the frame on display
    pub fn frame_index(&self) -> usize {
        if self.frames.is_empty() || self.frame_duration.is_zero() {
            return 0;
        }
        let index = self.position.as_nanos() / self.frame_duration.as_nanos();
        usize::try_from(index)
            .unwrap_or(usize::MAX)
            .min(self.frames.len() - 1)
    }

    /// Frame on display
    pub fn current_frame(&self) -> Option<&FrameRef> {
        self.frames.get(self.frame_index())
    }

    /// Move the playhead forward by `elapsed`.
    ///
    /// Returns how many passes completed: at most one for a one-shot clip,
    /// which then holds its last frame, and one per loop otherwise.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let pass = self.pass_duration();
        if !self.running || pass.is_zero() {
            return 0;
        }

        self.position += elapsed;
        if self.position < pass {
            return 0;
        }

        self.finished = true;
        if self.one_shot {
            self.position = pass - self.frame_duration;
            self.running = false;
            return 1;
        }

        let loops = self.position.as_nanos() / pass.as_nanos();
        let remainder = self.position.as_nanos() % pass.as_nanos();
        self.position = Duration::from_nanos(u64::try_from(remainder).unwrap_or(u64::MAX));
        u32::try_from(loops).unwrap_or(u32::MAX)
    }
}

impl Playable for FramePlayer {
    fn start(&mut self) {
        self.position = Duration::ZERO;
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_one_shot(&self) -> bool {
        self.one_shot
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Builds [`FramePlayer`]s, optionally checking frames against a catalog
#[derive(Debug, Clone, Default)]
pub struct FramePlayerFactory {
    catalog: Option<HashSet<FrameRef>>,
}

impl FramePlayerFactory {
    /// Accept any frame reference
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept frames from `frames`
    pub fn with_catalog<I, F>(frames: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FrameRef>,
    {
        Self {
            catalog: Some(frames.into_iter().map(Into::into).collect()),
        }
    }
}

impl ClipFactory for FramePlayerFactory {
    type Clip = FramePlayer;
    type Error = FrameError;

    fn create(&mut self, id: ClipId, descriptor: &ClipDescriptor) -> Result<FramePlayer, FrameError> {
        if descriptor.frames.is_empty() {
            return Err(FrameError::EmptyClip);
        }
        if descriptor.frame_duration_ms == 0 {
            return Err(FrameError::ZeroFrameDuration);
        }
        if let Some(catalog) = &self.catalog {
            if let Some(missing) = descriptor.frames.iter().find(|f| !catalog.contains(*f)) {
                return Err(FrameError::UnknownFrame(missing.clone()));
            }
        }
        Ok(FramePlayer::new(id, descriptor))
    }
}

/// Advance the sequencer's active clip and deliver its completion signals.
///
/// Once a signal replaces the clip, the remaining signals from the old clip
/// are stale and dropped by the sequencer.
pub fn advance(sequencer: &mut Sequencer<FramePlayerFactory>, elapsed: Duration) -> crate::sequencer::Result<u32> {
    let Some(clip) = sequencer.current_clip_mut() else {
        return Ok(0);
    };
    let clip_id = clip.id();
    let completions = clip.advance(elapsed);

    for _ in 0..completions {
        sequencer.on_clip_finished_for(clip_id)?;
    }
    Ok(completions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SectionRegistry;
    use crate::section::Section;

    const FRAME: Duration = Duration::from_millis(33);

    fn player(frames: usize, one_shot: bool) -> FramePlayer {
        let descriptor = ClipDescriptor::new((0..frames).map(|i| format!("f{i}"))).with_one_shot(one_shot);
        let mut player = FramePlayer::new(ClipId::new(), &descriptor);
        player.start();
        player
    }

    #[test]
    fn test_frame_progression() {
        let mut clip = player(3, true);
        assert_eq!(clip.current_frame().unwrap().as_str(), "f0");

        assert_eq!(clip.advance(FRAME), 0);
        assert_eq!(clip.frame_index(), 1);
        assert_eq!(clip.advance(FRAME), 0);
        assert_eq!(clip.current_frame().unwrap().as_str(), "f2");
        assert!(!clip.is_finished());
    }

    #[test]
    fn test_one_shot_finishes_once() {
        let mut clip = player(3, true);
        assert_eq!(clip.advance(FRAME * 10), 1);
        assert!(clip.is_finished());
        assert!(!clip.is_running());
        assert_eq!(clip.frame_index(), 2);

        assert_eq!(clip.advance(FRAME * 10), 0);
        assert_eq!(clip.frame_index(), 2);
    }

    #[test]
    fn test_single_frame_clip_finishes() {
        let mut clip = player(1, true);
        assert_eq!(clip.advance(FRAME), 1);
        assert!(clip.is_finished());
    }

    #[test]
    fn test_looping_reports_every_pass() {
        let mut clip = player(2, false);
        assert_eq!(clip.advance(FRAME * 2), 1);
        assert!(clip.is_finished());
        assert!(clip.is_running());
        assert_eq!(clip.frame_index(), 0);

        assert_eq!(clip.advance(FRAME * 5), 2);
        assert_eq!(clip.frame_index(), 1);
    }

    #[test]
    fn test_stopped_player_does_not_advance() {
        let mut clip = player(2, false);
        clip.stop();
        assert_eq!(clip.advance(FRAME * 4), 0);
        assert_eq!(clip.frame_index(), 0);
    }

    #[test]
    fn test_factory_catalog() {
        let mut factory = FramePlayerFactory::with_catalog(["a", "b"]);
        assert!(factory.create(ClipId::new(), &ClipDescriptor::new(["a", "b"])).is_ok());
        assert_eq!(
            factory.create(ClipId::new(), &ClipDescriptor::new(["a", "c"])).unwrap_err(),
            FrameError::UnknownFrame(FrameRef::from("c"))
        );
        assert_eq!(
            factory.create(ClipId::new(), &ClipDescriptor::new(Vec::<String>::new())).unwrap_err(),
            FrameError::EmptyClip
        );
        assert_eq!(
            factory
                .create(ClipId::new(), &ClipDescriptor::new(["a"]).with_frame_duration(0))
                .unwrap_err(),
            FrameError::ZeroFrameDuration
        );
    }

    #[test]
    fn test_advance_drives_transition_handoff() {
        let registry = SectionRegistry::from_sections([
            Section::new("loading", ClipDescriptor::new(["l0", "l1"]).with_one_shot(false)),
            Section::new("finished", ClipDescriptor::new(["done"]))
                .with_transition("loading", ClipDescriptor::new(["t0", "t1", "t2"])),
        ])
        .unwrap();
        let mut seq = Sequencer::new(registry, FramePlayerFactory::new());

        seq.transition_now("loading").unwrap();
        seq.queue_transition("finished").unwrap();
        assert_eq!(advance(&mut seq, FRAME).unwrap(), 0);
        assert_eq!(seq.current_section_id(), Some("loading"));

        // Two loops complete in one step; the second signal is stale
        assert_eq!(advance(&mut seq, FRAME * 3).unwrap(), 2);
        assert_eq!(seq.current_section_id(), Some("finished"));
        assert_eq!(seq.transitioning_from_id(), Some("loading"));

        advance(&mut seq, FRAME * 3).unwrap();
        assert_eq!(seq.transitioning_from_id(), None);
        assert_eq!(seq.current_clip().unwrap().current_frame().unwrap().as_str(), "done");
    }

    #[test]
    fn test_advance_idle_sequencer() {
        let mut seq = Sequencer::new(SectionRegistry::new(), FramePlayerFactory::new());
        assert_eq!(advance(&mut seq, FRAME).unwrap(), 0);
    }
}
