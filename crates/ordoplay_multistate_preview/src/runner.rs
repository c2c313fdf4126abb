// SPDX-License-Identifier: MIT OR Apache-2.0
//! Simulated clock driving a sequencer.

use crate::surface::{ConsoleSurface, StatusLine};
use ordoplay_multistate::frame_player;
use ordoplay_multistate::{FramePlayerFactory, Playable, SectionRegistry, Sequencer, SequencerError, SequencerState};
use std::rc::Rc;
use std::time::Duration;

/// Upper bound on ticks spent waiting for a section to settle
const MAX_SETTLE_TICKS: u32 = 10_000;

/// Headless preview of one animation
pub struct Preview {
    sequencer: Sequencer<FramePlayerFactory>,
    status: Rc<StatusLine>,
    tick: Duration,
    elapsed: Duration,
}

impl Preview {
    /// Create a preview over `registry`, advancing by `tick` per step
    pub fn new(registry: SectionRegistry, tick: Duration) -> Self {
        let status = Rc::new(StatusLine::default());
        let mut sequencer =
            Sequencer::new(registry, FramePlayerFactory::new()).with_host_binding(ConsoleSurface::default());
        sequencer.set_listener(&status);

        Self {
            sequencer,
            status,
            tick,
            elapsed: Duration::ZERO,
        }
    }

    /// The sequencer being previewed
    pub fn sequencer(&self) -> &Sequencer<FramePlayerFactory> {
        &self.sequencer
    }

    /// Latest status text
    pub fn status(&self) -> String {
        self.status.text()
    }

    /// Simulated time so far
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Request `id` the way a "next state" button would: start it when idle,
    /// otherwise queue it behind the active clip.
    pub fn request(&mut self, id: &str) -> Result<(), SequencerError> {
        tracing::info!(
            "[{:>6}ms] Requesting {:?} (section duration {}ms)",
            self.elapsed.as_millis(),
            id,
            self.sequencer.current_section_duration()
        );
        if self.sequencer.state() == SequencerState::Idle {
            self.sequencer.transition_now(id)
        } else {
            self.sequencer.queue_transition(id)
        }
    }

    /// Advance until nothing is queued and the primary clip has completed a
    /// pass. Returns false if that never happens within the tick budget.
    pub fn settle(&mut self) -> Result<bool, SequencerError> {
        for _ in 0..MAX_SETTLE_TICKS {
            if self.is_settled() {
                return Ok(true);
            }
            frame_player::advance(&mut self.sequencer, self.tick)?;
            self.elapsed += self.tick;
        }
        Ok(self.is_settled())
    }

    fn is_settled(&self) -> bool {
        self.sequencer.queued_section_id().is_none()
            && self.sequencer.state() == SequencerState::PlayingPrimary
            && self.sequencer.current_clip().is_some_and(Playable::is_finished)
    }

    /// Stop playback and clear the surface
    pub fn clear(&mut self) {
        self.sequencer.clear_animation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{three_state_registry, SAMPLE_STEPS};

    #[test]
    fn test_sample_walkthrough() {
        let mut preview = Preview::new(three_state_registry().unwrap(), Duration::from_millis(33));

        for id in SAMPLE_STEPS {
            preview.request(id).unwrap();
            assert!(preview.settle().unwrap());
            assert_eq!(preview.sequencer().current_section_id(), Some(id));
        }
        assert_eq!(preview.status(), "Showing: finished");
        assert!(preview.elapsed() >= Duration::from_millis(90 * 33 + 8 * 33));

        preview.clear();
        assert_eq!(preview.sequencer().state(), SequencerState::Idle);
    }

    #[test]
    fn test_unknown_request() {
        let mut preview = Preview::new(three_state_registry().unwrap(), Duration::from_millis(33));
        assert!(matches!(
            preview.request("missing"),
            Err(SequencerError::UnknownSection(_))
        ));
    }
}
