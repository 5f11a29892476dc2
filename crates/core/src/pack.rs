//! Catalog pack model.
//!
//! A pack is the unit a quiz session is started against: a named list of
//! playable entries copied out of the catalog store at session start. The
//! session works on an immutable, shuffled copy and never writes back.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One playable clip and its accepted answers.
///
/// Entries are copied from the catalog when a session starts and are never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackEntry {
    /// Performer label shown when the answer is revealed.
    pub performer: String,
    /// Canonical title; the primary accepted answer.
    pub title: String,
    /// Additional accepted answers (abbreviations, localized titles, ...).
    pub alternates: Vec<String>,
    /// Opaque media identifier resolved by the media-extraction collaborator.
    pub locator: String,
    /// Playback start offset within the source media, in seconds.
    pub start_secs: u64,
    /// Clip length in seconds. `None` means "play to the natural end",
    /// capped by the configured per-round maximum.
    pub play_secs: Option<u64>,
}

impl PackEntry {
    /// The effective round length for this entry under the given cap.
    pub fn clip_secs(&self, max_round_secs: u64) -> u64 {
        self.play_secs
            .map_or(max_round_secs, |secs| secs.min(max_round_secs))
    }
}

/// A named collection of playable entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pack {
    pub id: Uuid,
    pub name: String,
    pub entries: Vec<PackEntry>,
}

impl Pack {
    /// Returns a shuffled copy of the pack's entries for one session.
    pub fn shuffled_entries(&self) -> Vec<PackEntry> {
        let mut entries = self.entries.clone();
        entries.shuffle(&mut rand::rng());
        entries
    }
}
