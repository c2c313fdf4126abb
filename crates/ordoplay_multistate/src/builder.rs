// SPDX-License-Identifier: MIT OR Apache-2.0
//! Programmatic section construction.

use crate::clip::{ClipDescriptor, FrameRef, DEFAULT_FRAME_DURATION_MS, DEFAULT_ONE_SHOT};
use crate::config::{check_clip, Result};
use crate::registry::{RegistryError, SectionRegistry};
use crate::section::Section;
use indexmap::IndexMap;

/// Builds a transition clip
#[derive(Debug, Clone)]
pub struct TransitionBuilder {
    frame_duration: u32,
    frames: Vec<FrameRef>,
}

impl TransitionBuilder {
    /// Start an empty transition
    pub fn new() -> Self {
        Self {
            frame_duration: DEFAULT_FRAME_DURATION_MS,
            frames: Vec::new(),
        }
    }

    /// Set milliseconds per frame
    pub fn frame_duration(mut self, frame_duration: u32) -> Self {
        self.frame_duration = frame_duration;
        self
    }

    /// Append a frame
    pub fn frame(mut self, frame: impl Into<FrameRef>) -> Self {
        self.frames.push(frame.into());
        self
    }

    /// Append several frames
    pub fn frames<I, F>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FrameRef>,
    {
        self.frames.extend(frames.into_iter().map(Into::into));
        self
    }

    fn descriptor(&self) -> ClipDescriptor {
        ClipDescriptor {
            frames: self.frames.clone(),
            frame_duration_ms: self.frame_duration,
            one_shot: true,
        }
    }
}

impl Default for TransitionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds one section
#[derive(Debug, Clone)]
pub struct SectionBuilder {
    id: String,
    one_shot: bool,
    frame_duration: u32,
    frames: Vec<FrameRef>,
    transitions: IndexMap<String, TransitionBuilder>,
}

impl SectionBuilder {
    /// Start a section
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            one_shot: DEFAULT_ONE_SHOT,
            frame_duration: DEFAULT_FRAME_DURATION_MS,
            frames: Vec::new(),
            transitions: IndexMap::new(),
        }
    }

    /// Play once instead of looping
    pub fn one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
    }

    /// Set milliseconds per frame
    pub fn frame_duration(mut self, frame_duration: u32) -> Self {
        self.frame_duration = frame_duration;
        self
    }

    /// Append a frame
    pub fn frame(mut self, frame: impl Into<FrameRef>) -> Self {
        self.frames.push(frame.into());
        self
    }

    /// Append several frames
    pub fn frames<I, F>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FrameRef>,
    {
        self.frames.extend(frames.into_iter().map(Into::into));
        self
    }

    /// Add a transition played when arriving from `from_id` ("" for idle)
    pub fn transition(mut self, from_id: impl Into<String>, transition: TransitionBuilder) -> Self {
        self.transitions.insert(from_id.into(), transition);
        self
    }

    /// Build the section, rejecting empty clips
    pub fn build(&self) -> Result<Section> {
        if self.id.is_empty() {
            return Err(RegistryError::EmptySectionId.into());
        }
        check_clip(&self.id, None, &self.frames, self.frame_duration)?;

        let primary = ClipDescriptor {
            frames: self.frames.clone(),
            frame_duration_ms: self.frame_duration,
            one_shot: self.one_shot,
        };
        let mut section = Section::new(self.id.clone(), primary);
        for (from, transition) in &self.transitions {
            check_clip(&self.id, Some(from), &transition.frames, transition.frame_duration)?;
            section.add_transition(from.clone(), transition.descriptor());
        }
        Ok(section)
    }
}

/// Collects sections into a registry
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    sections: Vec<SectionBuilder>,
}

impl RegistryBuilder {
    /// Start an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section. A later section with the same ID replaces this one.
    pub fn section(mut self, section: SectionBuilder) -> Self {
        self.sections.push(section);
        self
    }

    /// Build every section and register them in order
    pub fn build(&self) -> Result<SectionRegistry> {
        let mut registry = SectionRegistry::new();
        for builder in &self.sections {
            registry.register(builder.build()?)?;
        }
        Ok(registry)
    }
}
