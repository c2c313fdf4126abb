// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` multi-state animation preview.
//!
//! Plays an animation document headlessly on a simulated 30fps clock and
//! logs every section change, transition and completion.
//!
//! Usage: `multistate_preview [DOCUMENT.json|DOCUMENT.ron] [SECTION...]`
//!
//! Without arguments the built-in pending/loading/finished sample runs.

mod runner;
mod sample;
mod surface;

use ordoplay_multistate::{AnimationConfig, ConfigError, SequencerError, DEFAULT_FRAME_DURATION_MS};
use runner::Preview;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Preview errors
#[derive(Debug, Error)]
enum PreviewError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error("Document defines no sections")]
    NoSections,
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ordoplay_multistate=debug,multistate_preview=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting multistate preview v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(std::env::args().skip(1).collect()) {
        tracing::error!("Preview failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: Vec<String>) -> Result<(), PreviewError> {
    let (registry, steps) = match args.split_first() {
        Some((path, steps)) => {
            let registry = AnimationConfig::load(path)?.into_registry()?;
            let steps = if steps.is_empty() {
                registry.ids().map(str::to_string).collect()
            } else {
                steps.to_vec()
            };
            (registry, steps)
        }
        None => (
            sample::three_state_registry()?,
            sample::SAMPLE_STEPS.iter().map(|s| (*s).to_string()).collect(),
        ),
    };

    if registry.is_empty() {
        return Err(PreviewError::NoSections);
    }

    let tick = Duration::from_millis(u64::from(DEFAULT_FRAME_DURATION_MS));
    let mut preview = Preview::new(registry, tick);

    for id in &steps {
        preview.request(id)?;
        if !preview.settle()? {
            tracing::warn!("Section {:?} did not settle, moving on", id);
        }
        tracing::info!(
            "Reached {:?} ({:?})",
            preview.sequencer().current_section_id().unwrap_or_default(),
            preview.sequencer().state()
        );
    }

    tracing::info!(
        "Finished after {}ms of animation, status {:?}",
        preview.elapsed().as_millis(),
        preview.status()
    );
    preview.clear();
    Ok(())
}
