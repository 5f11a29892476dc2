//! Per-session score bookkeeping.

use serde::Serialize;

/// One participant's accumulated score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    pub user: String,
    pub points: u32,
}

/// Monotonically increasing per-participant counters.
///
/// Entries are created on first credit and never removed; a participant who
/// leaves the session keeps their accumulated points on the leaderboard.
#[derive(Debug, Default)]
pub struct ScoreLedger {
    entries: Vec<ScoreEntry>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one point, creating a zero-initialized entry on first sight.
    pub fn credit(&mut self, user: &str) {
        match self.entries.iter_mut().find(|e| e.user == user) {
            Some(entry) => entry.points += 1,
            None => self.entries.push(ScoreEntry {
                user: user.to_string(),
                points: 1,
            }),
        }
    }

    /// Participants ordered by descending score. Ties keep the order in
    /// which participants first scored.
    pub fn rank(&self) -> Vec<ScoreEntry> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.points.cmp(&a.points));
        ranked
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_creates_and_increments() {
        let mut ledger = ScoreLedger::new();
        assert!(ledger.is_empty());

        ledger.credit("ada");
        ledger.credit("ada");
        ledger.credit("grace");

        let ranked = ledger.rank();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].user, "ada");
        assert_eq!(ranked[0].points, 2);
        assert_eq!(ranked[1].user, "grace");
        assert_eq!(ranked[1].points, 1);
    }

    #[test]
    fn scores_never_decrease() {
        let mut ledger = ScoreLedger::new();
        let mut last = 0;
        for _ in 0..16 {
            ledger.credit("ada");
            let points = ledger.rank()[0].points;
            assert!(points > last);
            last = points;
        }
    }

    #[test]
    fn ties_keep_first_scored_order() {
        let mut ledger = ScoreLedger::new();
        ledger.credit("first");
        ledger.credit("second");
        ledger.credit("third");

        let ranked = ledger.rank();
        let users: Vec<&str> = ranked.iter().map(|e| e.user.as_str()).collect();
        assert_eq!(users, vec!["first", "second", "third"]);
    }

    #[test]
    fn rank_sorts_descending() {
        let mut ledger = ScoreLedger::new();
        ledger.credit("low");
        for _ in 0..3 {
            ledger.credit("high");
        }
        ledger.credit("mid");
        ledger.credit("mid");

        let ranked = ledger.rank();
        let users: Vec<&str> = ranked.iter().map(|e| e.user.as_str()).collect();
        assert_eq!(users, vec!["high", "mid", "low"]);
    }
}
