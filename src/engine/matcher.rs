//! Free-text issue matching for the triage flow.
//!
//! Maps a natural-language complaint (plus an optional AI-produced summary)
//! onto one of the catalogued issue definitions for an application. This is a
//! deliberately simple, deterministic scoring function so triage decisions
//! stay reproducible in tests; it is not a generalized fuzzy matcher.

use crate::models::IssueDefinition;

/// Minimum token length considered for scoring. Single characters match too
/// much to carry signal.
const MIN_TOKEN_LEN: usize = 2;

/// Pick the catalogued issue that best matches the user's description and
/// AI summary. Either text input may be empty.
///
/// Scoring, per token of the lowercased, whitespace-split concatenation of
/// both inputs:
/// - +2 if the token is a literal substring of the candidate's lowercase
///   name or code;
/// - +1 additionally if the token is a prefix-or-suffix match against any
///   single word of the candidate's name (token prefix of word, or word
///   prefix of token).
///
/// Ties resolve to the first candidate in input order. The baseline score of
/// -1 guarantees the first candidate wins even when nothing matches, so a
/// non-empty candidate list always produces a match. Returns `None` only for
/// an empty candidate list.
pub fn best_match<'a>(
    candidates: &'a [IssueDefinition],
    description: &str,
    ai_summary: &str,
) -> Option<&'a IssueDefinition> {
    if candidates.is_empty() {
        return None;
    }

    let text = format!(
        "{} {}",
        description.to_lowercase(),
        ai_summary.to_lowercase()
    );
    let tokens: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_LEN)
        .collect();

    let mut best = &candidates[0];
    let mut best_score: i32 = -1;

    for issue in candidates {
        let name = issue.name.to_lowercase();
        let code = issue.code.to_lowercase();
        let name_words: Vec<&str> = name.split_whitespace().collect();

        let mut score = 0;
        for token in &tokens {
            if name.contains(token) || code.contains(token) {
                score += 2;
            }
            if name_words
                .iter()
                .any(|w| w.starts_with(token) || token.starts_with(w))
            {
                score += 1;
            }
        }

        if score > best_score {
            best = issue;
            best_score = score;
        }
    }

    Some(best)
}
