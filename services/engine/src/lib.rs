//! Blindtest Session Engine
//!
//! This library contains the per-room quiz session orchestration: the
//! session registry, the round state machine, the push-to-pull media relay,
//! and the trait seams for the external collaborators (chat/voice gateway,
//! media extractor, catalog store). The chat-platform adapter embedding
//! this crate owns process wiring and calls [`init_tracing`] once at boot.

pub mod announce;
pub mod catalog;
pub mod config;
pub mod gateway;
pub mod media;
pub mod relay;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil;

use tracing::Level;

/// Installs the global `tracing` subscriber used by the engine.
pub fn init_tracing(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
}
