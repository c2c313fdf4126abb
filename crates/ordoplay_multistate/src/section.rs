// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sections and the clip resolution rule.

use crate::clip::ClipDescriptor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Predecessor key meaning "nothing was playing before".
///
/// A transition registered under this key plays when a section is entered
/// from the idle state.
pub const NO_PREDECESSOR: &str = "";

/// A named animation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Unique, non-empty section ID
    pub id: String,
    /// Steady-state clip
    pub primary: ClipDescriptor,
    /// Transition clips keyed by predecessor section ID
    #[serde(default)]
    pub transitions_from: IndexMap<String, ClipDescriptor>,
}

/// Which clip to play when entering a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedClip<'a> {
    /// Play the section's primary clip
    Primary(&'a ClipDescriptor),
    /// Play a transition first
    Transition {
        /// Predecessor key the transition was found under
        from: &'a str,
        /// Transition clip (played as one-shot)
        clip: &'a ClipDescriptor,
    },
}

impl ResolvedClip<'_> {
    /// The descriptor to instantiate
    pub fn descriptor(&self) -> &ClipDescriptor {
        match self {
            Self::Primary(clip) | Self::Transition { clip, .. } => clip,
        }
    }

    /// Predecessor key if this is a transition
    pub fn transitioning_from(&self) -> Option<&str> {
        match self {
            Self::Primary(_) => None,
            Self::Transition { from, .. } => Some(*from),
        }
    }
}

impl Section {
    /// Create a section with no transitions
    pub fn new(id: impl Into<String>, primary: ClipDescriptor) -> Self {
        Self {
            id: id.into(),
            primary,
            transitions_from: IndexMap::new(),
        }
    }

    /// Add a transition played when arriving from `from_id`.
    ///
    /// Use [`NO_PREDECESSOR`] for the transition out of the idle state.
    /// Transitions are stored one-shot regardless of the descriptor's flag.
    pub fn with_transition(mut self, from_id: impl Into<String>, clip: ClipDescriptor) -> Self {
        self.add_transition(from_id, clip);
        self
    }

    /// Add or replace a transition
    pub fn add_transition(&mut self, from_id: impl Into<String>, clip: ClipDescriptor) {
        self.transitions_from.insert(from_id.into(), clip.forced_one_shot());
    }

    /// Transition clip registered for `from_id`, if any
    pub fn transition(&self, from_id: &str) -> Option<&ClipDescriptor> {
        self.transitions_from.get(from_id)
    }

    /// Pick the clip to play when entering this section.
    ///
    /// `predecessor` is the ID of the section being left, or `None` when the
    /// sequencer is idle (looked up as [`NO_PREDECESSOR`]).
    pub fn resolve<'a>(&'a self, predecessor: Option<&str>) -> ResolvedClip<'a> {
        let key = predecessor.unwrap_or(NO_PREDECESSOR);
        match self.transitions_from.get_key_value(key) {
            Some((from, clip)) => ResolvedClip::Transition { from, clip },
            None => ResolvedClip::Primary(&self.primary),
        }
    }

    /// Duration of the primary clip, plus the transition from `from_id` if
    /// one is registered.
    pub fn duration(&self, from_id: Option<&str>) -> u32 {
        let transition = from_id
            .and_then(|from| self.transition(from))
            .map_or(0, ClipDescriptor::total_duration);
        self.primary.total_duration().saturating_add(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished() -> Section {
        Section::new("finished", ClipDescriptor::new(["finished_000"]))
            .with_transition("loading", ClipDescriptor::new((0..8).map(|i| format!("end_{i}"))))
    }

    #[test]
    fn test_resolve_known_predecessor() {
        let section = finished();
        let resolved = section.resolve(Some("loading"));
        assert_eq!(resolved.transitioning_from(), Some("loading"));
        assert_eq!(resolved.descriptor().frame_count(), 8);
    }

    #[test]
    fn test_resolve_unknown_predecessor_uses_primary() {
        let section = finished();
        let resolved = section.resolve(Some("pending"));
        assert_eq!(resolved, ResolvedClip::Primary(&section.primary));
        assert_eq!(resolved.transitioning_from(), None);
    }

    #[test]
    fn test_resolve_from_idle() {
        let section = finished();
        assert!(matches!(section.resolve(None), ResolvedClip::Primary(_)));

        let intro = section.with_transition(NO_PREDECESSOR, ClipDescriptor::new(["intro_0", "intro_1"]));
        let resolved = intro.resolve(None);
        assert_eq!(resolved.transitioning_from(), Some(NO_PREDECESSOR));
        assert_eq!(resolved.descriptor().frame_count(), 2);
    }

    #[test]
    fn test_transitions_are_one_shot() {
        let section = Section::new("a", ClipDescriptor::new(["a"]))
            .with_transition("b", ClipDescriptor::new(["t0", "t1"]).with_one_shot(false));
        assert!(section.transition("b").unwrap().one_shot);
    }

    #[test]
    fn test_duration() {
        let section = finished();
        assert_eq!(section.duration(None), 33);
        assert_eq!(section.duration(Some("loading")), 33 + 8 * 33);
        assert_eq!(section.duration(Some("missing")), 33);
    }
}
