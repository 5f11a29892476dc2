//! Guess matching for one round.
//!
//! The variant set is built once per round from the canonical title and its
//! stored alternates. Matching is lenient on letter case but strict on
//! internal spacing: a guess is only matched space-insensitively when the
//! stored answer itself contributes a whitespace-stripped variant. That
//! asymmetry is kept on purpose; see DESIGN.md.

use std::collections::HashSet;

/// Pre-computed set of acceptable textual variants for one entry's answer.
#[derive(Debug, Clone)]
pub struct AnswerMatcher {
    canonical: String,
    variants: HashSet<String>,
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

impl AnswerMatcher {
    /// Builds the variant set for a canonical title and its alternates.
    ///
    /// Each accepted answer contributes four variants: as-is, lowercased,
    /// whitespace-stripped, and lowercased-and-stripped.
    pub fn new(title: &str, alternates: &[String]) -> Self {
        let mut variants = HashSet::new();
        for answer in std::iter::once(title).chain(alternates.iter().map(String::as_str)) {
            let lowered = answer.to_lowercase();
            variants.insert(strip_whitespace(&lowered));
            variants.insert(strip_whitespace(answer));
            variants.insert(lowered);
            variants.insert(answer.to_string());
        }
        Self {
            canonical: title.to_string(),
            variants,
        }
    }

    /// Whether a raw guess matches. The guess is lowercased but never
    /// stripped before the lookup.
    pub fn matches(&self, guess: &str) -> bool {
        self.variants.contains(&guess.to_lowercase())
    }

    /// The canonical title, for reveal announcements.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}
