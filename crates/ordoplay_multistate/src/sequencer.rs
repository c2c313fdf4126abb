// SPDX-License-Identifier: MIT OR Apache-2.0
//! Section sequencing state machine.
//!
//! The sequencer owns the active clip and decides what plays next:
//! - `transition_now` interrupts whatever is playing
//! - `queue_transition` waits for the active one-shot clip to finish
//! - completion signals hand a transition clip over to the primary clip and
//!   realize queued section changes
//!
//! It never advances time itself. The host drives the clip and reports each
//! completed pass back through [`Sequencer::on_clip_finished_for`].

use crate::clip::{ClipDescriptor, ClipFactory, ClipId, Playable};
use crate::listener::{ClipEvent, HostBinding, ListenerSlot, SequencerListener};
use crate::registry::SectionRegistry;
use crate::section::{ResolvedClip, Section};
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Sequencer errors
#[derive(Debug, Error)]
pub enum SequencerError {
    /// Requested section is not registered
    #[error("Unknown section: {0:?}")]
    UnknownSection(String),

    /// The clip factory could not build a clip
    #[error("Failed to create clip: {0}")]
    ClipLoad(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, SequencerError>;

/// Coarse playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerState {
    /// No current section
    #[default]
    Idle,
    /// The current section's primary clip is playing
    PlayingPrimary,
    /// A transition clip is playing ahead of the primary clip
    PlayingTransition,
}

/// The clip currently owned by the sequencer
struct ActiveClip<C> {
    id: ClipId,
    descriptor: ClipDescriptor,
    clip: C,
}

/// Plays sections from a registry, one clip at a time
pub struct Sequencer<F: ClipFactory> {
    registry: SectionRegistry,
    factory: F,
    current_section: Option<String>,
    active: Option<ActiveClip<F::Clip>>,
    /// Set while a transition clip is playing
    transitioning_from: Option<String>,
    queued_section: Option<String>,
    listener: ListenerSlot,
    host: Option<Box<dyn HostBinding<F::Clip>>>,
}

impl<F: ClipFactory> Sequencer<F> {
    /// Create an idle sequencer over a registry
    pub fn new(registry: SectionRegistry, factory: F) -> Self {
        Self {
            registry,
            factory,
            current_section: None,
            active: None,
            transitioning_from: None,
            queued_section: None,
            listener: ListenerSlot::default(),
            host: None,
        }
    }

    /// Attach a host surface at construction
    pub fn with_host_binding(mut self, host: impl HostBinding<F::Clip> + 'static) -> Self {
        self.host = Some(Box::new(host));
        self
    }

    /// Replace the host surface
    pub fn set_host_binding(&mut self, host: Option<Box<dyn HostBinding<F::Clip>>>) {
        self.host = host;
    }

    /// Remove and return the host surface
    pub fn take_host_binding(&mut self) -> Option<Box<dyn HostBinding<F::Clip>>> {
        self.host.take()
    }

    /// Register a listener without taking ownership of it
    pub fn set_listener<L: SequencerListener + 'static>(&mut self, listener: &Rc<L>) {
        let weak: Weak<L> = Rc::downgrade(listener);
        let weak: Weak<dyn SequencerListener> = weak;
        self.listener.set(Some(weak));
    }

    /// Register (or clear) a listener from an existing weak handle
    pub fn set_listener_weak(&mut self, listener: Option<Weak<dyn SequencerListener>>) {
        self.listener.set(listener);
    }

    /// Drop the listener registration
    pub fn clear_listener(&mut self) {
        self.listener.set(None);
    }

    /// The registered listener, if it is still alive
    pub fn listener(&self) -> Option<Rc<dyn SequencerListener>> {
        self.listener.get()
    }

    /// The section registry
    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    /// The clip factory
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// ID of the section governing playback
    pub fn current_section_id(&self) -> Option<&str> {
        self.current_section.as_deref()
    }

    /// The section governing playback
    pub fn current_section(&self) -> Option<&Section> {
        self.current_section
            .as_deref()
            .and_then(|id| self.registry.lookup(id))
    }

    /// Predecessor key while a transition clip plays
    pub fn transitioning_from_id(&self) -> Option<&str> {
        self.transitioning_from.as_deref()
    }

    /// Section waiting for the active clip to finish
    pub fn queued_section_id(&self) -> Option<&str> {
        self.queued_section.as_deref()
    }

    /// The live clip
    pub fn current_clip(&self) -> Option<&F::Clip> {
        self.active.as_ref().map(|active| &active.clip)
    }

    /// The live clip, for hosts that drive it
    pub fn current_clip_mut(&mut self) -> Option<&mut F::Clip> {
        self.active.as_mut().map(|active| &mut active.clip)
    }

    /// ID of the live clip
    pub fn current_clip_id(&self) -> Option<ClipId> {
        self.active.as_ref().map(|active| active.id)
    }

    /// Descriptor the live clip was built from
    pub fn current_descriptor(&self) -> Option<&ClipDescriptor> {
        self.active.as_ref().map(|active| &active.descriptor)
    }

    /// Coarse playback state
    pub fn state(&self) -> SequencerState {
        match (&self.current_section, &self.transitioning_from) {
            (None, _) => SequencerState::Idle,
            (Some(_), Some(_)) => SequencerState::PlayingTransition,
            (Some(_), None) => SequencerState::PlayingPrimary,
        }
    }

    /// Milliseconds for one pass of the current section, including the
    /// transition in effect. Zero when idle.
    pub fn current_section_duration(&self) -> u32 {
        self.current_section()
            .map_or(0, |section| section.duration(self.transitioning_from.as_deref()))
    }

    /// Switch to section `id` immediately.
    ///
    /// Plays the transition registered for the current section (or for the
    /// idle state) first, if there is one. Switching to the section that is
    /// already playing restarts it. Clears any queued section.
    pub fn transition_now(&mut self, id: &str) -> Result<()> {
        let section = self
            .registry
            .lookup(id)
            .ok_or_else(|| SequencerError::UnknownSection(id.to_string()))?;

        let resolved = section.resolve(self.current_section.as_deref());
        let transitioning_from = resolved.transitioning_from().map(str::to_string);
        let descriptor = match resolved {
            ResolvedClip::Primary(clip) => clip.clone(),
            ResolvedClip::Transition { clip, .. } => clip.forced_one_shot(),
        };
        let active = Self::instantiate(&mut self.factory, &descriptor)?;

        tracing::debug!(
            "Section {:?} -> {:?} (transition from {:?})",
            self.current_section,
            id,
            transitioning_from
        );

        self.discard_active();
        self.queued_section = None;
        self.current_section = Some(id.to_string());
        self.transitioning_from = transitioning_from;
        self.play(active);
        Ok(())
    }

    /// Switch to section `id` once the active clip finishes.
    ///
    /// Queuing the current section does nothing. When idle, or when the
    /// active one-shot clip has already finished, the switch happens now.
    /// Otherwise `id` replaces any previously queued section and is realized
    /// on the next completion signal; unknown IDs are reported at that point.
    pub fn queue_transition(&mut self, id: &str) -> Result<()> {
        if self.current_section.as_deref() == Some(id) {
            tracing::debug!("Ignoring queue request for current section {:?}", id);
            return Ok(());
        }

        let ready = match (&self.current_section, &self.active) {
            (None, _) => true,
            (Some(_), Some(active)) => active.clip.is_one_shot() && active.clip.is_finished(),
            (Some(_), None) => false,
        };

        if ready {
            self.transition_now(id)
        } else {
            tracing::debug!("Queued section {:?}", id);
            self.queued_section = Some(id.to_string());
            Ok(())
        }
    }

    /// Completion signal from the clip identified by `clip_id`.
    ///
    /// Signals from clips that have since been replaced are ignored.
    pub fn on_clip_finished_for(&mut self, clip_id: ClipId) -> Result<()> {
        if self.current_clip_id() != Some(clip_id) {
            tracing::debug!("Dropping completion from stale clip {}", clip_id);
            return Ok(());
        }
        self.on_clip_finished()
    }

    /// Completion signal from the active clip.
    ///
    /// Notifies the listener, then either hands a finished transition over to
    /// the primary clip or realizes the queued section. A queued section is
    /// dropped from the queue even if realizing it fails.
    pub fn on_clip_finished(&mut self) -> Result<()> {
        let Some(active) = &self.active else {
            tracing::debug!("Completion signal with no active clip");
            return Ok(());
        };
        self.notify(active, |listener, event| listener.on_clip_finished(event));

        if self.transitioning_from.is_some() {
            return self.finish_transition();
        }

        if let Some(queued) = self.queued_section.take() {
            self.transition_now(&queued)?;
        }
        Ok(())
    }

    /// Stop playback and forget all section state without notifying the
    /// listener. The next section entered resolves from the idle state.
    pub fn clear_animation(&mut self) {
        if self.discard_active() {
            if let Some(host) = self.host.as_mut() {
                host.detach();
            }
        }
        self.current_section = None;
        self.transitioning_from = None;
        self.queued_section = None;
        tracing::debug!("Animation cleared");
    }

    /// Replace the finished transition clip with the section's primary clip,
    /// then apply a queued change to a different section.
    fn finish_transition(&mut self) -> Result<()> {
        let current = self.current_section.as_deref();
        let Some(section) = current.and_then(|id| self.registry.lookup(id)) else {
            return Ok(());
        };
        let section_id = section.id.clone();
        let active = Self::instantiate(&mut self.factory, &section.primary)?;

        tracing::debug!("Transition into {:?} finished, playing primary clip", section_id);
        self.discard_active();
        self.transitioning_from = None;
        self.play(active);

        match self.queued_section.take() {
            Some(queued) if queued != section_id => self.transition_now(&queued),
            _ => Ok(()),
        }
    }

    fn instantiate(factory: &mut F, descriptor: &ClipDescriptor) -> Result<ActiveClip<F::Clip>> {
        let id = ClipId::new();
        let clip = factory
            .create(id, descriptor)
            .map_err(|err| SequencerError::ClipLoad(Box::new(err)))?;
        Ok(ActiveClip {
            id,
            descriptor: descriptor.clone(),
            clip,
        })
    }

    fn play(&mut self, mut active: ActiveClip<F::Clip>) {
        self.notify(&active, |listener, event| listener.on_clip_starting(event));

        if let Some(host) = self.host.as_mut() {
            host.attach(active.id, &active.clip);
        }
        active.clip.start();
        self.active = Some(active);
    }

    /// Stop and drop the active clip. Returns whether one was playing.
    fn discard_active(&mut self) -> bool {
        match self.active.take() {
            Some(mut old) => {
                old.clip.stop();
                true
            }
            None => false,
        }
    }

    fn notify(
        &self,
        active: &ActiveClip<F::Clip>,
        callback: impl FnOnce(&dyn SequencerListener, &ClipEvent<'_>),
    ) {
        let Some(listener) = self.listener.get() else {
            return;
        };
        let Some(section_id) = self.current_section.as_deref() else {
            return;
        };

        let event = ClipEvent {
            clip_id: active.id,
            section_id,
            transitioning_from: self.transitioning_from.as_deref(),
            descriptor: &active.descriptor,
            one_shot: active.clip.is_one_shot(),
        };
        callback(&*listener, &event);
    }
}

impl<F: ClipFactory> std::fmt::Debug for Sequencer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("sections", &self.registry.len())
            .field("current_section", &self.current_section)
            .field("transitioning_from", &self.transitioning_from)
            .field("queued_section", &self.queued_section)
            .field("active_clip", &self.current_clip_id())
            .field("listener", &self.listener)
            .field("has_host", &self.host.is_some())
            .finish()
    }
}
