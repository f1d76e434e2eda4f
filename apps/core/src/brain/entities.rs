//! Entity Extractor.
//!
//! Finds up to two canonical team names in a pivot-language query. Three
//! stages are tried in order and the first one that produces a result wins:
//! a structural "A vs B" pattern, a fixed alias table, then tagger-driven
//! candidates. Every candidate is resolved against the request's roster with
//! the fuzzy matcher.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use super::fuzzy::{match_above, FuzzyMatch, Similarity, TokenSortRatio, DEFAULT_THRESHOLD};
use super::tagger::{EntityKind, HeuristicTagger, Tagger};
use crate::dataset::Dataset;

/// Roster used when the dataset yields no team names.
pub const DEFAULT_ROSTER: [&str; 28] = [
    "Morocco",
    "Mali",
    "Comoros",
    "Zambia",
    "Egypt",
    "Angola",
    "South Africa",
    "Zimbabwe",
    "Nigeria",
    "Tanzania",
    "Tunisia",
    "Uganda",
    "Algeria",
    "Burkina Faso",
    "DR Congo",
    "Ivory Coast",
    "Equatorial Guinea",
    "Ghana",
    "Mozambique",
    "Senegal",
    "Gambia",
    "Cameroon",
    "Guinea",
    "Gabon",
    "Sudan",
    "Benin",
    "Botswana",
    "Mauritania",
];

/// Abbreviations and partial names, checked in this order.
const ALIASES: &[(&str, &str)] = &[
    ("ivory", "Ivory Coast"),
    ("cote", "Ivory Coast"),
    ("drc", "DR Congo"),
    ("congo dr", "DR Congo"),
    ("sa", "South Africa"),
    ("rsa", "South Africa"),
    ("eq guinea", "Equatorial Guinea"),
    ("burkina", "Burkina Faso"),
    ("bf", "Burkina Faso"),
];

/// Maximum number of teams a query can name.
const MAX_TEAMS: usize = 2;

/// Minimum token length for tagger noun candidates (exclusive).
const MIN_NOUN_CHARS: usize = 2;

static PAIR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([\w\s]+)\s+(?:vs|against|versus|and|v\.?|-|playing|match(?:ed)? (?:with|against))\s+([\w\s]+)",
    )
    .expect("Invalid regex: team pair pattern")
});

static ALIAS_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    ALIASES
        .iter()
        .map(|(alias, canonical)| {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(alias)))
                .expect("Invalid regex: team alias");
            (re, *canonical)
        })
        .collect()
});

/// Distinct team names known for one request, in dataset order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    names: Vec<String>,
    fallback: bool,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            names: DEFAULT_ROSTER.iter().map(|n| n.to_string()).collect(),
            fallback: true,
        }
    }
}

impl Roster {
    /// Collects team names from live groups and knockout stages. Falls back
    /// to [`DEFAULT_ROSTER`] when there are none.
    pub fn from_dataset(dataset: Option<&Dataset>) -> Self {
        let mut seen = HashSet::new();
        let names: Vec<String> = dataset
            .into_iter()
            .flat_map(|d| d.matches())
            .flat_map(|m| [&m.team1, &m.team2])
            .filter(|name| !name.is_empty() && seen.insert(name.as_str()))
            .cloned()
            .collect();

        if names.is_empty() {
            Self::default()
        } else {
            Self {
                names,
                fallback: false,
            }
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// True when the default roster is in use.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Stage that produced the extracted teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStage {
    /// "A vs B" structural pattern
    Pair,
    /// Alias table
    Alias,
    /// Tagger entities or noun candidates
    Tagger,
    /// "score of A and B" phrasing, resolved by the orchestrator
    ScorePhrase,
}

/// Result of entity extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Canonical team names, at most two.
    pub teams: Vec<String>,
    /// `None` when nothing was found.
    pub stage: Option<ExtractionStage>,
    /// Accepted fuzzy matches, in acceptance order.
    pub matches: Vec<FuzzyMatch>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.teams.first().map(String::as_str)
    }

    pub fn second(&self) -> Option<&str> {
        self.teams.get(1).map(String::as_str)
    }

    fn found(stage: ExtractionStage, matches: Vec<FuzzyMatch>) -> Self {
        let teams = matches.iter().take(MAX_TEAMS).map(|m| m.name.clone()).collect();
        Self {
            teams,
            stage: Some(stage),
            matches,
        }
    }
}

/// Team-name extractor.
pub struct EntityExtractor {
    tagger: Arc<dyn Tagger>,
    similarity: Arc<dyn Similarity>,
    threshold: u8,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicTagger::default()), Arc::new(TokenSortRatio))
    }
}

impl EntityExtractor {
    pub fn new(tagger: Arc<dyn Tagger>, similarity: Arc<dyn Similarity>) -> Self {
        Self {
            tagger,
            similarity,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn tagger_name(&self) -> &'static str {
        self.tagger.name()
    }

    /// Extracts up to two canonical team names from `query`.
    pub fn extract(&self, query: &str, roster: &Roster) -> Extraction {
        if query.trim().is_empty() {
            return Extraction::default();
        }

        if let Some(matches) = self.pair_stage(query, roster) {
            debug!(teams = ?matches, "Teams found by pair pattern");
            return Extraction::found(ExtractionStage::Pair, matches);
        }

        if let Some(team) = self.alias_stage(query, roster) {
            debug!(team = %team, "Team found by alias");
            let matched = FuzzyMatch {
                name: team.to_string(),
                score: 100,
            };
            return Extraction::found(ExtractionStage::Alias, vec![matched]);
        }

        let matches = self.tagger_stage(query, roster);
        if matches.is_empty() {
            debug!(tagger = self.tagger.name(), "No team found");
            return Extraction::default();
        }
        debug!(teams = ?matches, "Teams found by tagger candidates");
        Extraction::found(ExtractionStage::Tagger, matches)
    }

    /// Resolves two free-text sides against the roster. Both must clear
    /// `threshold`.
    pub fn match_pair(
        &self,
        first: &str,
        second: &str,
        roster: &Roster,
        threshold: u8,
    ) -> Option<(FuzzyMatch, FuzzyMatch)> {
        let a = match_above(self.similarity.as_ref(), first.trim(), roster.names(), threshold)?;
        let b = match_above(self.similarity.as_ref(), second.trim(), roster.names(), threshold)?;
        Some((a, b))
    }

    fn pair_stage(&self, query: &str, roster: &Roster) -> Option<Vec<FuzzyMatch>> {
        let caps = PAIR_PATTERN.captures(query)?;
        let (a, b) = self.match_pair(&caps[1], &caps[2], roster, self.threshold)?;
        Some(vec![a, b])
    }

    fn alias_stage<'a>(&self, query: &str, roster: &'a Roster) -> Option<&'a str> {
        let lowered = query.to_lowercase();
        ALIAS_PATTERNS
            .iter()
            .filter(|(re, _)| re.is_match(&lowered))
            .find_map(|(_, canonical)| {
                roster
                    .names()
                    .iter()
                    .find(|n| n.as_str() == *canonical)
                    .map(String::as_str)
            })
    }

    fn tagger_stage(&self, query: &str, roster: &Roster) -> Vec<FuzzyMatch> {
        let tagged = self.tagger.tag(query);

        let mut candidates: Vec<String> = tagged
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Place | EntityKind::Organization))
            .map(|e| e.text.clone())
            .collect();

        if candidates.is_empty() {
            candidates = tagged
                .nouns(MIN_NOUN_CHARS)
                .map(str::to_string)
                .chain(tagged.proper_bigrams())
                .collect();
        }

        let mut seen = HashSet::new();
        candidates
            .iter()
            .filter_map(|c| {
                match_above(self.similarity.as_ref(), c, roster.names(), self.threshold)
            })
            .filter(|m| seen.insert(m.name.clone()))
            .collect()
    }
}
