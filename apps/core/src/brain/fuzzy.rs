//! Fuzzy name matching.
//!
//! Scores are integers on a 0..=100 scale. A candidate is accepted only when
//! its score is strictly greater than the threshold.

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

/// Default acceptance threshold for team names.
pub const DEFAULT_THRESHOLD: u8 = 65;

/// Stricter threshold for the "score of X and Y" phrasing.
pub const SCORE_QUERY_THRESHOLD: u8 = 70;

/// Similarity between two strings on a 0..=100 scale.
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> u8;
}

/// Token-sort ratio: both sides are lowercased, stripped of punctuation and
/// split into tokens, the tokens are sorted and re-joined, then compared with
/// a normalized Levenshtein ratio. Word order does not matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl TokenSortRatio {
    fn normalize(text: &str) -> String {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    }
}

impl Similarity for TokenSortRatio {
    fn similarity(&self, a: &str, b: &str) -> u8 {
        let a = Self::normalize(a);
        let b = Self::normalize(b);
        if a.is_empty() || b.is_empty() {
            return 0;
        }
        (normalized_levenshtein(&a, &b) * 100.0).round() as u8
    }
}

/// Best candidate for a query, with its score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyMatch {
    pub name: String,
    pub score: u8,
}

impl FuzzyMatch {
    /// Strict acceptance: `score > threshold`.
    pub fn passes(&self, threshold: u8) -> bool {
        self.score > threshold
    }
}

/// Returns the highest-scoring candidate. Ties keep the earliest candidate.
pub fn best_match<S, I>(similarity: &S, query: &str, candidates: I) -> Option<FuzzyMatch>
where
    S: Similarity + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut best: Option<FuzzyMatch> = None;
    for candidate in candidates {
        let candidate = candidate.as_ref();
        let score = similarity.similarity(query, candidate);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(FuzzyMatch {
                name: candidate.to_string(),
                score,
            });
        }
    }
    best
}

/// Best candidate, kept only if it clears `threshold`.
pub fn match_above<S, I>(similarity: &S, query: &str, candidates: I, threshold: u8) -> Option<FuzzyMatch>
where
    S: Similarity + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    best_match(similarity, query, candidates).filter(|m| m.passes(threshold))
}
