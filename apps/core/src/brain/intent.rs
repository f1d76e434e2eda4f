//! Intent Classification using indicator phrases.
//!
//! Decides which match status the user is asking about. Runs on the pivot
//! (English) form of the query.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Status;

/// Detected intent type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// A match in progress ("what's the score now")
    Live,
    /// An upcoming fixture ("when will Senegal play")
    Scheduled,
    /// A completed match ("who won")
    Finished,
    /// No status preference
    All,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Intent {
    /// Returns a human-readable label for the intent
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Live => "live",
            Intent::Scheduled => "scheduled",
            Intent::Finished => "finished",
            Intent::All => "all",
        }
    }

    /// The record status this intent selects, `None` for `All`.
    pub fn status(&self) -> Option<Status> {
        match self {
            Intent::Live => Some(Status::Live),
            Intent::Scheduled => Some(Status::Scheduled),
            Intent::Finished => Some(Status::Finished),
            Intent::All => None,
        }
    }

    /// Whether a record with `status` satisfies this intent.
    pub fn accepts(&self, status: Status) -> bool {
        self.status().map_or(true, |wanted| wanted == status)
    }
}

/// Result of intent classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    /// Detected intent
    pub intent: Intent,
    /// Indicators of the winning group found in the query
    pub matched_indicators: Vec<String>,
}

/// Indicator group for one intent
struct IntentPattern {
    intent: Intent,
    indicators: &'static [&'static str],
}

const LIVE_INDICATORS: &[&str] = &[
    "live",
    "going",
    "happening",
    "now",
    "current",
    "playing right now",
    "what is the score",
    "what's the score",
];

const SCHEDULED_INDICATORS: &[&str] = &[
    "when", "will", "schedule", "upcoming", "soon", "next", "date", "playing",
];

const FINISHED_INDICATORS: &[&str] = &[
    "result", "won", "win", "lost", "score", "was", "did", "perform", "final",
];

/// Intent classifier using substring indicators.
///
/// Groups are checked in strict precedence (live, scheduled, finished); the
/// first group with any hit wins, so "now" beats "result".
pub struct IntentClassifier {
    patterns: Vec<IntentPattern>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Create a new intent classifier with all indicator groups
    pub fn new() -> Self {
        let patterns = vec![
            IntentPattern {
                intent: Intent::Live,
                indicators: LIVE_INDICATORS,
            },
            IntentPattern {
                intent: Intent::Scheduled,
                indicators: SCHEDULED_INDICATORS,
            },
            IntentPattern {
                intent: Intent::Finished,
                indicators: FINISHED_INDICATORS,
            },
        ];

        Self { patterns }
    }

    /// Classify the intent of a text
    pub fn classify(&self, text: &str) -> IntentResult {
        let text = text.trim().to_lowercase();

        for group in &self.patterns {
            let matched: Vec<String> = group
                .indicators
                .iter()
                .filter(|indicator| text.contains(*indicator))
                .map(|indicator| indicator.to_string())
                .collect();

            if !matched.is_empty() {
                return IntentResult {
                    intent: group.intent,
                    matched_indicators: matched,
                };
            }
        }

        IntentResult {
            intent: Intent::All,
            matched_indicators: vec![],
        }
    }
}
