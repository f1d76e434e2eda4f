//! Query Trace - diagnostic record of one pipeline run.
//!
//! Collects what each stage decided plus every degradation the pipeline
//! absorbed on the way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::Extraction;
use super::intent::{Intent, IntentResult};
use super::language::{Detection, Language};

/// A degradation absorbed by the pipeline. None of these fail the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Fallback {
    /// Language could not be decided; the pivot language was assumed.
    DetectionFailure,
    /// The dataset could not be loaded.
    DataUnavailable(String),
    /// No team name was recognised.
    NoEntityFound,
    /// Teams were recognised but no record matched.
    NoMatchFound,
    /// The answer had no lexicon coverage and was returned untranslated.
    TranslationMismatch,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::DetectionFailure => write!(f, "detection_failure"),
            Fallback::DataUnavailable(e) => write!(f, "data_unavailable ({})", e),
            Fallback::NoEntityFound => write!(f, "no_entity_found"),
            Fallback::NoMatchFound => write!(f, "no_match_found"),
            Fallback::TranslationMismatch => write!(f, "translation_mismatch"),
        }
    }
}

/// Complete trace of one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryTrace {
    /// Original user query
    pub query: String,

    /// Raw detector output
    pub detection: Detection,

    /// Language the query was processed as
    pub language: Language,

    /// Pivot-language form of the query, when it was translated
    pub translated_query: Option<String>,

    /// Detected intent, after any override
    pub intent: IntentResult,

    /// Extracted teams and the stage that found them
    pub extraction: Extraction,

    /// Number of lookups performed (two when the swapped retry ran)
    pub lookups: u8,

    /// Records satisfying the final lookup
    pub matches_found: usize,

    /// Absorbed degradations, in the order they happened
    pub fallbacks: Vec<Fallback>,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,

    /// Timestamp of the run
    pub timestamp: DateTime<Utc>,
}

impl QueryTrace {
    /// Create a new empty trace
    pub fn new(query: String) -> Self {
        Self {
            query,
            detection: Detection::Undetermined,
            language: Language::English,
            translated_query: None,
            intent: IntentResult {
                intent: Intent::All,
                matched_indicators: vec![],
            },
            extraction: Extraction::default(),
            lookups: 0,
            matches_found: 0,
            fallbacks: vec![],
            processing_time_ms: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn record(&mut self, fallback: Fallback) {
        self.fallbacks.push(fallback);
    }

    pub fn has_fallback(&self, predicate: impl Fn(&Fallback) -> bool) -> bool {
        self.fallbacks.iter().any(predicate)
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        let fallbacks = if self.fallbacks.is_empty() {
            "none".to_string()
        } else {
            self.fallbacks
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "Language: {}, Intent: {}, Teams: [{}], Lookups: {}, Matches: {}, Fallbacks: {}",
            self.language.code(),
            self.intent.intent,
            self.extraction.teams.join(", "),
            self.lookups,
            self.matches_found,
            fallbacks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_creation() {
        let trace = QueryTrace::new("Morocco vs Mali".to_string());

        assert_eq!(trace.query, "Morocco vs Mali");
        assert_eq!(trace.language, Language::English);
        assert!(trace.fallbacks.is_empty());
        assert!(trace.extraction.is_empty());
    }

    #[test]
    fn test_summary() {
        let mut trace = QueryTrace::new("test".to_string());
        trace.record(Fallback::NoEntityFound);
        let summary = trace.summary();

        assert!(summary.contains("Language: en"));
        assert!(summary.contains("Intent: all"));
        assert!(summary.contains("no_entity_found"));
        assert!(trace.has_fallback(|f| matches!(f, Fallback::NoEntityFound)));
    }

    #[test]
    fn test_fallback_serialization() {
        let json = serde_json::to_string(&Fallback::DataUnavailable("missing".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"data_unavailable","detail":"missing"}"#);
    }
}
