//! Language Detector.
//!
//! Classifies a query as English (pivot) or French (source). Detection never
//! fails: when neither pass is confident the result is `Undetermined`, which
//! callers resolve to English.

use serde::{Deserialize, Serialize};
use whatlang::{Detector, Lang};

use super::lexicon::Lexicon;

/// Below this many words the statistical pass is not consulted.
const MIN_STATISTICAL_WORDS: usize = 4;

const FRENCH_WORDS: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "du", "de", "et", "ou", "mais", "je", "tu", "il",
    "elle", "nous", "vous", "ils", "elles", "est", "sont", "être", "avoir", "faire", "pour",
    "dans", "sur", "avec", "contre", "entre", "comment", "pourquoi", "quand", "qui", "que",
    "quoi", "quel", "quelle", "bonjour", "salut", "merci", "s'il",
];

const ENGLISH_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do",
    "does", "did", "i", "you", "he", "she", "it", "we", "they", "and", "or", "but", "for",
    "with", "from", "to", "in", "on", "what", "what's", "why", "how", "when", "where", "who",
    "which", "hello", "hi", "please", "thank", "against", "between", "score", "won", "will",
];

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Pivot language: all lookup logic runs in English.
    English,
    /// Source language covered by the lexicon.
    French,
}

impl Language {
    /// Returns the language code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
        }
    }

    pub fn is_pivot(&self) -> bool {
        matches!(self, Language::English)
    }
}

/// Outcome of language detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detection {
    Detected(Language),
    Undetermined,
}

impl Detection {
    /// Falls back to the pivot language when detection was inconclusive.
    pub fn resolve(self) -> Language {
        match self {
            Detection::Detected(language) => language,
            Detection::Undetermined => Language::English,
        }
    }
}

/// Two-pass detector: a deterministic lexical vote, then a statistical
/// trigram model restricted to the two supported languages.
pub struct LanguageDetector {
    statistical: Detector,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector {
    pub fn new() -> Self {
        Self {
            statistical: Detector::with_allowlist(vec![Lang::Eng, Lang::Fra]),
        }
    }

    /// Detects the language of `text`.
    pub fn detect(&self, text: &str, lexicon: &Lexicon) -> Detection {
        let text_lower = text.to_lowercase();
        if text_lower.trim().is_empty() {
            return Detection::Undetermined;
        }

        if let Some(language) = self.lexical_vote(&text_lower, lexicon) {
            return Detection::Detected(language);
        }

        self.statistical_vote(&text_lower)
    }

    /// Counts function words, accents and source-only lexicon terms.
    /// A close vote goes to French when a source-only term is present and
    /// French is not behind. Returns `None` when the vote is empty or
    /// otherwise too close to call.
    fn lexical_vote(&self, text_lower: &str, lexicon: &Lexicon) -> Option<Language> {
        let french_chars = text_lower
            .chars()
            .filter(|c| {
                matches!(
                    *c,
                    'é' | 'è' | 'ê' | 'ë' | 'à' | 'â' | 'ù' | 'û' | 'ô' | 'î' | 'ï' | 'ç' | 'œ'
                )
            })
            .count();

        let words: Vec<&str> = text_lower
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|word| !word.is_empty())
            .collect();

        let french_word_count = words.iter().filter(|w| FRENCH_WORDS.contains(w)).count();
        let english_word_count = words.iter().filter(|w| ENGLISH_WORDS.contains(w)).count();

        let source_markers = lexicon.count_source_markers(text_lower);
        let french_score = french_word_count + french_chars + source_markers;
        let english_score = english_word_count;

        if french_score > 0 && english_score > 0 {
            if french_score > english_score * 2 {
                Some(Language::French)
            } else if english_score > french_score * 2 {
                Some(Language::English)
            } else if source_markers > 0 && french_score >= english_score {
                Some(Language::French)
            } else {
                None
            }
        } else if french_score > 0 {
            Some(Language::French)
        } else if english_score > 0 {
            Some(Language::English)
        } else {
            None
        }
    }

    fn statistical_vote(&self, text_lower: &str) -> Detection {
        if text_lower.split_whitespace().count() < MIN_STATISTICAL_WORDS {
            return Detection::Undetermined;
        }

        match self.statistical.detect(text_lower) {
            Some(info) if info.is_reliable() => match info.lang() {
                Lang::Fra => Detection::Detected(Language::French),
                Lang::Eng => Detection::Detected(Language::English),
                _ => Detection::Undetermined,
            },
            _ => Detection::Undetermined,
        }
    }
}
