// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in three-state animation used when no document is given.

use ordoplay_multistate::{ConfigError, RegistryBuilder, SectionBuilder, SectionRegistry, TransitionBuilder};

/// Section order walked by the preview
pub const SAMPLE_STEPS: [&str; 3] = ["pending", "loading", "finished"];

fn frame(index: u32) -> String {
    format!("pending_animation_{index:03}")
}

/// pending (one frame), loading (90-frame loop), finished (one frame,
/// reached through an 8-frame transition out of loading)
pub fn three_state_registry() -> Result<SectionRegistry, ConfigError> {
    let end_transition = TransitionBuilder::new()
        .frame_duration(33)
        .frames((91..=98).map(frame));

    RegistryBuilder::new()
        .section(SectionBuilder::new("pending").one_shot(true).frame(frame(0)))
        .section(
            SectionBuilder::new("loading")
                .one_shot(false)
                .frame_duration(33)
                .frames((1..=90).map(frame)),
        )
        .section(
            SectionBuilder::new("finished")
                .one_shot(true)
                .transition("loading", end_transition)
                .frame(frame(99)),
        )
        .build()
}
