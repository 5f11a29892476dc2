//! Room announcements produced by a session.
//!
//! The gateway renders these however the platform likes; `Display` gives
//! the default plain-text rendering.

use blindtest_core::score::ScoreEntry;
use std::fmt;

/// The answer shown when a round ends without (or after) a correct guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub performer: String,
    pub title: String,
}

impl fmt::Display for Reveal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.performer)
    }
}

/// Everything a session ever says to its room.
#[derive(Debug, Clone, PartialEq)]
pub enum Announcement {
    /// Session start: the rules recap.
    Rules {
        pack: String,
        rounds: usize,
        skip_keyword: String,
    },
    ParticipantJoined(String),
    ParticipantLeft(String),
    /// A participant guessed first.
    Correct { winner: String, reveal: Reveal },
    /// After a correct guess, the room may vote to jump ahead.
    FastForwardHint { skip_keyword: String },
    /// Round skipped by consensus. `reveal` is `None` when the answer was
    /// already announced this round.
    Skipped { reveal: Option<Reveal> },
    /// The round timer fired.
    Timeout { reveal: Reveal },
    /// The entry could not be played and the round was skipped.
    EntrySkippedOnError,
    /// The moderator stopped the session.
    SessionStopped,
    FinalLeaderboard(Vec<ScoreEntry>),
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Announcement::Rules {
                pack,
                rounds,
                skip_keyword,
            } => write!(
                f,
                "Quiz time! Pack \"{pack}\", {rounds} rounds. Type your guess in the chat; \
                 first correct answer wins the round. Vote {skip_keyword} to skip a track."
            ),
            Announcement::ParticipantJoined(user) => {
                write!(f, "{user} joined the quiz.")
            }
            Announcement::ParticipantLeft(user) => {
                write!(f, "{user} left the quiz.")
            }
            Announcement::Correct { winner, reveal } => {
                write!(f, "{winner} got it! It was {reveal}.")
            }
            Announcement::FastForwardHint { skip_keyword } => {
                write!(f, "Vote {skip_keyword} to jump to the next round.")
            }
            Announcement::Skipped { reveal: Some(reveal) } => {
                write!(f, "Round skipped. It was {reveal}.")
            }
            Announcement::Skipped { reveal: None } => write!(f, "Moving on."),
            Announcement::Timeout { reveal } => {
                write!(f, "Time's up! It was {reveal}.")
            }
            Announcement::EntrySkippedOnError => {
                write!(f, "Couldn't play that one; skipping to the next round.")
            }
            Announcement::SessionStopped => write!(f, "Quiz stopped."),
            Announcement::FinalLeaderboard(entries) if entries.is_empty() => {
                write!(f, "That's a wrap! Nobody scored this time.")
            }
            Announcement::FinalLeaderboard(entries) => {
                write!(f, "That's a wrap! Final scores:")?;
                for (position, entry) in entries.iter().enumerate() {
                    write!(f, "\n{}. {}: {}", position + 1, entry.user, entry.points)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_announcement_names_winner_and_answer() {
        let text = Announcement::Correct {
            winner: "ada".to_string(),
            reveal: Reveal {
                performer: "Queen".to_string(),
                title: "Bohemian Rhapsody".to_string(),
            },
        }
        .to_string();
        assert!(text.contains("ada"));
        assert!(text.contains("Bohemian Rhapsody by Queen"));
    }

    #[test]
    fn skipped_without_reveal_stays_quiet_about_the_answer() {
        let text = Announcement::Skipped { reveal: None }.to_string();
        assert!(!text.contains(" by "));
    }

    #[test]
    fn leaderboard_lists_ranked_entries() {
        let text = Announcement::FinalLeaderboard(vec![
            ScoreEntry {
                user: "ada".to_string(),
                points: 3,
            },
            ScoreEntry {
                user: "grace".to_string(),
                points: 1,
            },
        ])
        .to_string();
        assert!(text.contains("1. ada: 3"));
        assert!(text.contains("2. grace: 1"));
    }

    #[test]
    fn empty_leaderboard_has_a_message() {
        let text = Announcement::FinalLeaderboard(vec![]).to_string();
        assert!(text.contains("Nobody scored"));
    }
}
