// SPDX-License-Identifier: MIT OR Apache-2.0
//! Console stand-ins for the widget and status label of a real host.

use ordoplay_multistate::{ClipEvent, ClipId, FramePlayer, HostBinding, SequencerListener};
use std::cell::RefCell;

/// Host surface that logs what it would display
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    attached: Option<ClipId>,
}

impl HostBinding<FramePlayer> for ConsoleSurface {
    fn attach(&mut self, clip_id: ClipId, clip: &FramePlayer) {
        tracing::info!(
            "Surface shows clip {} ({} per pass)",
            clip_id,
            humanize(clip.pass_duration().as_millis())
        );
        self.attached = Some(clip_id);
    }

    fn detach(&mut self) {
        if let Some(clip_id) = self.attached.take() {
            tracing::info!("Surface cleared (was {})", clip_id);
        }
    }
}

fn humanize(millis: u128) -> String {
    format!("{}.{:03}s", millis / 1000, millis % 1000)
}

/// Status line driven by sequencer notifications
#[derive(Debug, Default)]
pub struct StatusLine {
    text: RefCell<String>,
}

impl StatusLine {
    /// Current status text
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    fn set(&self, text: String) {
        tracing::info!("Status: {}", text);
        *self.text.borrow_mut() = text;
    }
}

impl SequencerListener for StatusLine {
    fn on_clip_starting(&self, event: &ClipEvent<'_>) {
        if event.is_transition() {
            self.set(format!("Transitioning to: {}", event.section_id));
        } else if !event.one_shot {
            self.set(format!("Current state: {}", event.section_id));
        }
    }

    fn on_clip_finished(&self, event: &ClipEvent<'_>) {
        if event.one_shot && !event.is_transition() {
            self.set(format!("Showing: {}", event.section_id));
        }
    }
}
