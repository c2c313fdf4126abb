// SPDX-License-Identifier: MIT OR Apache-2.0
//! Observer and host seams around the sequencer.

use crate::clip::{ClipDescriptor, ClipId};
use std::rc::{Rc, Weak};

/// Snapshot of a clip handed to listeners
#[derive(Debug, Clone, Copy)]
pub struct ClipEvent<'a> {
    /// ID of the clip instance
    pub clip_id: ClipId,
    /// Section the clip belongs to
    pub section_id: &'a str,
    /// Predecessor key when the clip is a transition
    pub transitioning_from: Option<&'a str>,
    /// Descriptor the clip was built from
    pub descriptor: &'a ClipDescriptor,
    /// Whether the live clip is one-shot
    pub one_shot: bool,
}

impl ClipEvent<'_> {
    /// Whether the clip is a transition rather than the section's primary clip
    pub fn is_transition(&self) -> bool {
        self.transitioning_from.is_some()
    }
}

/// Receives sequencer notifications.
///
/// Callbacks get a borrowed snapshot rather than the sequencer itself, so a
/// listener that wants to request a section change records the request and
/// issues it after the callback returns.
pub trait SequencerListener {
    /// A new clip has been created and is about to start
    fn on_clip_starting(&self, event: &ClipEvent<'_>) {
        let _ = event;
    }

    /// The active clip completed a pass. Looping clips report every loop.
    fn on_clip_finished(&self, event: &ClipEvent<'_>) {
        let _ = event;
    }
}

/// Surface that displays the active clip (a widget background, a sprite...)
pub trait HostBinding<C> {
    /// Show `clip`, replacing whatever was shown before
    fn attach(&mut self, clip_id: ClipId, clip: &C);

    /// Stop showing any clip
    fn detach(&mut self);
}

/// Non-owning listener handle
#[derive(Default, Clone)]
pub(crate) struct ListenerSlot {
    listener: Option<Weak<dyn SequencerListener>>,
}

impl ListenerSlot {
    pub(crate) fn set(&mut self, listener: Option<Weak<dyn SequencerListener>>) {
        self.listener = listener;
    }

    /// Live listener, or `None` once its owner has dropped it
    pub(crate) fn get(&self) -> Option<Rc<dyn SequencerListener>> {
        self.listener.as_ref().and_then(Weak::upgrade)
    }
}

impl std::fmt::Debug for ListenerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSlot")
            .field("alive", &self.get().is_some())
            .finish()
    }
}
