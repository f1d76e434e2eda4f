//! Tokenizer / Tagger capability.
//!
//! The entity extractor's last stage needs tokens with a coarse part of speech
//! and, when available, named-entity spans. `HeuristicTagger` provides both
//! from capitalisation, a stopword list and a place gazetteer.
//! `PlainTokenizer` is the degraded mode: tokens only, no tags.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::warn;

use super::entities::DEFAULT_ROSTER;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+(?:'\w+)*").expect("Invalid regex: token pattern")
});

/// Function words never treated as name candidates.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "nor", "for", "yet", "so", "i", "you", "he", "she", "it",
    "we", "they", "me", "him", "her", "us", "them", "my", "your", "his", "its", "our", "their",
    "this", "that", "these", "those", "who", "whom", "which", "what", "what's", "whose", "is",
    "am", "are", "was", "were", "be", "been", "being", "have", "has", "had", "having", "do",
    "does", "did", "doing", "will", "would", "shall", "should", "can", "could", "may", "might",
    "must", "in", "on", "at", "to", "from", "by", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "up", "down", "out", "off", "over", "under", "again",
    "here", "there", "where", "when", "why", "how", "all", "each", "every", "both", "some", "any",
    "no", "not", "only", "than", "too", "very", "just", "also", "now", "then", "once", "if",
    "as", "of", "vs", "versus", "please", "tell", "know",
];

/// Tokens that mark a run of proper nouns as a club rather than a country.
const CLUB_MARKERS: &[&str] = &["fc", "sc", "ac", "afc", "club", "united", "city", "athletic"];

/// Coarse part of speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    ProperNoun,
    Noun,
    Function,
    Number,
}

/// Named-entity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Country, city or region
    Place,
    /// Club or other organisation
    Organization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// `None` when the tagger does not assign parts of speech.
    pub pos: Option<PartOfSpeech>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub kind: EntityKind,
}

/// Output of a tagging pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedText {
    pub tokens: Vec<Token>,
    pub entities: Vec<EntitySpan>,
}

impl TaggedText {
    /// Proper- and common-noun tokens longer than `min_chars`, in order.
    pub fn nouns(&self, min_chars: usize) -> impl Iterator<Item = &str> + '_ {
        self.tokens
            .iter()
            .filter(move |t| {
                matches!(t.pos, Some(PartOfSpeech::ProperNoun | PartOfSpeech::Noun))
                    && t.text.chars().count() > min_chars
            })
            .map(|t| t.text.as_str())
    }

    /// Adjacent proper-noun pairs ("Burkina Faso").
    pub fn proper_bigrams(&self) -> Vec<String> {
        self.tokens
            .windows(2)
            .filter(|pair| {
                pair.iter()
                    .all(|t| t.pos == Some(PartOfSpeech::ProperNoun))
            })
            .map(|pair| format!("{} {}", pair[0].text, pair[1].text))
            .collect()
    }
}

/// Splits text into tokens and optionally tags them.
pub trait Tagger: Send + Sync {
    fn tag(&self, text: &str) -> TaggedText;

    /// Short name used in traces.
    fn name(&self) -> &'static str;

    /// The same tagger recognising `places` as place entities.
    /// `None` when the tagger keeps no gazetteer.
    fn with_gazetteer(&self, _places: &[String]) -> Option<Arc<dyn Tagger>> {
        None
    }
}

/// Tokens only. Used when no tagging model is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTokenizer;

impl Tagger for PlainTokenizer {
    fn tag(&self, text: &str) -> TaggedText {
        TaggedText {
            tokens: TOKEN_PATTERN
                .find_iter(text)
                .map(|m| Token {
                    text: m.as_str().to_string(),
                    pos: None,
                })
                .collect(),
            entities: vec![],
        }
    }

    fn name(&self) -> &'static str {
        "plain"
    }
}

/// Rule-based tagger.
pub struct HeuristicTagger {
    stopwords: HashSet<&'static str>,
    gazetteer: Option<Regex>,
}

impl Default for HeuristicTagger {
    fn default() -> Self {
        Self::with_places(DEFAULT_ROSTER.iter().copied())
    }
}

impl HeuristicTagger {
    /// Builds a tagger that recognises the given place names as entities,
    /// case-insensitively, longest name first.
    pub fn with_places<I>(places: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut names: Vec<String> = places
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty() && seen.insert(p.to_lowercase()))
            .collect();
        names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));

        let gazetteer = if names.is_empty() {
            None
        } else {
            let alternation = names
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            match RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
                .case_insensitive(true)
                .build()
            {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Gazetteer disabled: {}", e);
                    None
                }
            }
        };

        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            gazetteer,
        }
    }

    fn part_of_speech(&self, word: &str) -> PartOfSpeech {
        if word.chars().all(|c| c.is_ascii_digit()) {
            PartOfSpeech::Number
        } else if self.stopwords.contains(word.to_lowercase().as_str()) {
            PartOfSpeech::Function
        } else if word.chars().next().is_some_and(char::is_uppercase) {
            PartOfSpeech::ProperNoun
        } else {
            PartOfSpeech::Noun
        }
    }

    fn club_entities(&self, tokens: &[Token]) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        let mut run: Vec<&str> = Vec::new();

        let mut flush = |run: &mut Vec<&str>| {
            if run.len() > 1
                && run
                    .iter()
                    .any(|w| CLUB_MARKERS.contains(&w.to_lowercase().as_str()))
            {
                spans.push(EntitySpan {
                    text: run.join(" "),
                    kind: EntityKind::Organization,
                });
            }
            run.clear();
        };

        for token in tokens {
            if token.pos == Some(PartOfSpeech::ProperNoun) {
                run.push(&token.text);
            } else {
                flush(&mut run);
            }
        }
        flush(&mut run);
        spans
    }
}

impl Tagger for HeuristicTagger {
    fn tag(&self, text: &str) -> TaggedText {
        let tokens: Vec<Token> = TOKEN_PATTERN
            .find_iter(text)
            .map(|m| Token {
                text: m.as_str().to_string(),
                pos: Some(self.part_of_speech(m.as_str())),
            })
            .collect();

        let mut entities: Vec<EntitySpan> = self
            .gazetteer
            .iter()
            .flat_map(|re| re.find_iter(text))
            .map(|m| EntitySpan {
                text: m.as_str().to_string(),
                kind: EntityKind::Place,
            })
            .collect();
        entities.extend(self.club_entities(&tokens));

        TaggedText { tokens, entities }
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn with_gazetteer(&self, places: &[String]) -> Option<Arc<dyn Tagger>> {
        Some(Arc::new(HeuristicTagger::with_places(places)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gazetteer_finds_places_case_insensitively() {
        let tagger = HeuristicTagger::default();
        let tagged = tagger.tag("when joue le senegal and ivory coast?");
        let places: Vec<&str> = tagged.entities.iter().map(|e| e.text.as_str()).collect();

        assert_eq!(places, vec!["senegal", "ivory coast"]);
        assert!(tagged.entities.iter().all(|e| e.kind == EntityKind::Place));
    }

    #[test]
    fn test_longer_place_names_win() {
        let tagger = HeuristicTagger::default();
        let tagged = tagger.tag("Equatorial Guinea results");

        assert_eq!(tagged.entities.len(), 1);
        assert_eq!(tagged.entities[0].text, "Equatorial Guinea");
    }

    #[test]
    fn test_gazetteer_can_be_replaced() {
        let tagger = HeuristicTagger::default();
        assert!(tagger.tag("Kaizer Chiefs tonight").entities.is_empty());

        let rebuilt = tagger
            .with_gazetteer(&["Kaizer Chiefs".to_string()])
            .expect("heuristic tagger keeps a gazetteer");
        let tagged = rebuilt.tag("Kaizer Chiefs tonight");

        assert_eq!(tagged.entities.len(), 1);
        assert_eq!(tagged.entities[0].kind, EntityKind::Place);
        assert!(PlainTokenizer.with_gazetteer(&["Mali".to_string()]).is_none());
    }

    #[test]
    fn test_parts_of_speech() {
        let tagger = HeuristicTagger::with_places(Vec::<String>::new());
        let tagged = tagger.tag("When did Atlantis play 3 games");
        let pos: Vec<PartOfSpeech> = tagged.tokens.iter().filter_map(|t| t.pos).collect();

        assert_eq!(
            pos,
            vec![
                PartOfSpeech::Function,
                PartOfSpeech::Function,
                PartOfSpeech::ProperNoun,
                PartOfSpeech::Noun,
                PartOfSpeech::Number,
                PartOfSpeech::Noun,
            ]
        );
        assert!(tagged.entities.is_empty());
    }

    #[test]
    fn test_nouns_and_bigrams() {
        let tagger = HeuristicTagger::with_places(Vec::<String>::new());
        let tagged = tagger.tag("did Burkina Faso win");

        assert_eq!(tagged.nouns(2).collect::<Vec<_>>(), vec!["Burkina", "Faso", "win"]);
        assert_eq!(tagged.proper_bigrams(), vec!["Burkina Faso".to_string()]);
    }

    #[test]
    fn test_club_runs_become_organizations() {
        let tagger = HeuristicTagger::with_places(Vec::<String>::new());
        let tagged = tagger.tag("Did Wydad Athletic Club win");

        assert_eq!(tagged.entities.len(), 1);
        assert_eq!(tagged.entities[0].text, "Wydad Athletic Club");
        assert_eq!(tagged.entities[0].kind, EntityKind::Organization);
    }

    #[test]
    fn test_plain_tokenizer_has_no_tags() {
        let tagged = PlainTokenizer.tag("Morocco vs Mali");

        assert_eq!(tagged.tokens.len(), 3);
        assert!(tagged.tokens.iter().all(|t| t.pos.is_none()));
        assert!(tagged.entities.is_empty());
        assert_eq!(tagged.nouns(2).count(), 0);
    }
}
