//! Round lifecycle primitives.
//!
//! A round moves `Preparing -> Playing -> Resolved` and must resolve through
//! exactly one of three paths: a correct answer, a skip consensus, or the
//! round timer. The [`RoundGate`] serializes those competing paths behind a
//! generation counter so that a callback armed for an earlier round (a stale
//! timer, most commonly) can never resolve a later one.

use tracing::warn;

/// The phase of the round currently owned by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Preparing,
    Playing,
    Resolved,
}

/// The terminal outcome of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A participant guessed the answer first.
    Correct { winner: String },
    /// A skip consensus formed before anyone answered.
    Skipped,
    /// The round timer fired.
    Timeout,
}

/// Single-writer resolution guard for one session's rounds.
///
/// `arm` bumps the generation when a new round enters `Preparing`; every
/// resolution path must present the generation it was armed with and wins
/// only if the round is still `Playing`.
#[derive(Debug)]
pub struct RoundGate {
    generation: u64,
    phase: RoundPhase,
}

impl RoundGate {
    pub fn new() -> Self {
        Self {
            generation: 0,
            phase: RoundPhase::Resolved,
        }
    }

    /// Enters `Preparing` for a new round and returns its generation.
    pub fn arm(&mut self) -> u64 {
        self.generation += 1;
        self.phase = RoundPhase::Preparing;
        self.generation
    }

    /// Enters `Playing` once playback has started for the armed round.
    pub fn begin_playing(&mut self, generation: u64) {
        if generation == self.generation && self.phase == RoundPhase::Preparing {
            self.phase = RoundPhase::Playing;
        }
    }

    /// Attempts to resolve the round armed with `generation`.
    ///
    /// Returns `true` for exactly one caller per generation; stale or
    /// repeated attempts are no-ops.
    pub fn try_resolve(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            warn!(
                stale = generation,
                current = self.generation,
                "ignoring resolution attempt for a past round"
            );
            return false;
        }
        if self.phase != RoundPhase::Playing {
            return false;
        }
        self.phase = RoundPhase::Resolved;
        true
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for RoundGate {
    fn default() -> Self {
        Self::new()
    }
}

/// A room message, classified once before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomMessage {
    /// The configured skip keyword.
    SkipVote,
    /// Anything else is treated as a guess.
    AnswerAttempt(String),
}

/// Classifies a raw room message against the configured skip keyword.
pub fn classify(text: &str, skip_keyword: &str) -> RoomMessage {
    if text.trim().eq_ignore_ascii_case(skip_keyword) {
        RoomMessage::SkipVote
    } else {
        RoomMessage::AnswerAttempt(text.to_string())
    }
}

/// Skip consensus requires strictly more than half of the participants.
pub fn skip_consensus(votes: usize, participants: usize) -> bool {
    votes * 2 > participants
}
