//! Lexicon Store.
//!
//! Bidirectional term tables between the source language (French) and the
//! pivot language (English). The tables live in a data file so they can be
//! updated without touching code; the default copy is embedded at build time.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock, RwLock};
use thiserror::Error;
use tracing::info;

const BUILTIN_LEXICON: &str = include_str!("../../data/lexicon/fr.json");

// The embedded file is validated by the unit tests below.
static BUILTIN: LazyLock<Arc<Lexicon>> = LazyLock::new(|| {
    Arc::new(Lexicon::from_json(BUILTIN_LEXICON).expect("Invalid builtin lexicon"))
});

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse lexicon: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to compile lexicon pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("lexicon has no keyword entries")]
    Empty,
}

/// Coarse role of a keyword entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhraseKind {
    /// Match-state vocabulary ("en direct", "résultat").
    #[default]
    Indicator,
    /// Country / team names.
    Team,
    /// Connective words ("contre", "et").
    Connective,
}

/// One row of a translation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhrasePair {
    pub source: String,
    pub pivot: String,
    #[serde(default)]
    pub kind: PhraseKind,
}

/// On-disk layout of a lexicon file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconFile {
    pub source_language: String,
    pub pivot_language: String,
    /// Source → pivot keyword table, in declared order.
    pub keywords: Vec<PhrasePair>,
    /// Pivot → source response phrases.
    pub responses: Vec<PhrasePair>,
    /// Canonical (pivot) team name → source-language display name.
    #[serde(default)]
    pub teams: Vec<PhrasePair>,
}

/// Compiled, read-only lexicon.
#[derive(Debug)]
pub struct Lexicon {
    file: LexiconFile,
    keyword_pattern: Regex,
    keyword_index: HashMap<String, usize>,
    responses_by_length: Vec<usize>,
    team_display: HashMap<String, String>,
}

impl Lexicon {
    /// Parses and compiles a lexicon from its JSON text.
    pub fn from_json(raw: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = serde_json::from_str(raw)?;
        Self::compile(file)
    }

    /// Loads a lexicon file from disk.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// The lexicon shipped with the binary.
    pub fn builtin() -> Arc<Lexicon> {
        BUILTIN.clone()
    }

    fn compile(file: LexiconFile) -> Result<Self, LexiconError> {
        if file.keywords.is_empty() {
            return Err(LexiconError::Empty);
        }

        // First declaration of a key wins.
        let mut keyword_index = HashMap::new();
        for (idx, pair) in file.keywords.iter().enumerate() {
            keyword_index.entry(pair.source.to_lowercase()).or_insert(idx);
        }

        // Longest keys first so the alternation prefers "score final" over
        // "score" at the same position. The sort is stable, so equal lengths
        // keep declared order.
        let mut keys: Vec<&str> = file.keywords.iter().map(|p| p.source.as_str()).collect();
        keys.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));
        let alternation = keys
            .iter()
            .map(|k| regex::escape(&k.to_lowercase()))
            .collect::<Vec<_>>()
            .join("|");
        let keyword_pattern = RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
            .case_insensitive(true)
            .build()?;

        let mut responses_by_length: Vec<usize> = (0..file.responses.len()).collect();
        responses_by_length
            .sort_by_key(|&i| std::cmp::Reverse(file.responses[i].pivot.chars().count()));

        let team_display = file
            .teams
            .iter()
            .map(|p| (p.pivot.to_lowercase(), p.source.clone()))
            .collect();

        Ok(Self {
            file,
            keyword_pattern,
            keyword_index,
            responses_by_length,
            team_display,
        })
    }

    pub fn source_language(&self) -> &str {
        &self.file.source_language
    }

    pub fn pivot_language(&self) -> &str {
        &self.file.pivot_language
    }

    /// Keyword table in declared order.
    pub fn keywords(&self) -> &[PhrasePair] {
        &self.file.keywords
    }

    /// Single alternation over every source keyword, longest first,
    /// word-boundary anchored and case-insensitive.
    pub fn keyword_pattern(&self) -> &Regex {
        &self.keyword_pattern
    }

    /// Looks up the keyword entry for a matched source phrase.
    pub fn keyword(&self, source_phrase: &str) -> Option<&PhrasePair> {
        self.keyword_index
            .get(&source_phrase.to_lowercase())
            .map(|&idx| &self.file.keywords[idx])
    }

    /// Pivot equivalent of a source phrase.
    pub fn pivot_for(&self, source_phrase: &str) -> Option<&str> {
        self.keyword(source_phrase).map(|p| p.pivot.as_str())
    }

    /// Counts keyword hits that only make sense in the source language:
    /// entries whose pivot differs from the source text, connectives excluded
    /// ("versus" is valid English too).
    pub fn count_source_markers(&self, text: &str) -> usize {
        self.keyword_pattern
            .find_iter(text)
            .filter_map(|m| self.keyword(m.as_str()))
            .filter(|p| p.kind != PhraseKind::Connective && !p.source.eq_ignore_ascii_case(&p.pivot))
            .count()
    }

    /// Exact response phrase translation.
    pub fn response_phrase(&self, pivot: &str) -> Option<&str> {
        self.file
            .responses
            .iter()
            .find(|p| p.pivot == pivot)
            .map(|p| p.source.as_str())
    }

    /// Response phrases, longest pivot text first.
    pub fn responses_longest_first(&self) -> impl Iterator<Item = &PhrasePair> + '_ {
        self.responses_by_length
            .iter()
            .map(move |&i| &self.file.responses[i])
    }

    /// Source-language display name of a canonical team, case-insensitive.
    pub fn team_display(&self, pivot_team: &str) -> Option<&str> {
        self.team_display
            .get(&pivot_team.to_lowercase())
            .map(String::as_str)
    }

    /// Canonical team names known to the lexicon.
    pub fn team_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.file.teams.iter().map(|p| p.pivot.as_str())
    }
}

/// Process-wide holder of the active lexicon. Readers take a cheap `Arc`
/// snapshot per request; `reload` swaps the tables atomically.
#[derive(Debug)]
pub struct LexiconStore {
    current: RwLock<Arc<Lexicon>>,
}

impl Default for LexiconStore {
    fn default() -> Self {
        Self::new(Lexicon::builtin())
    }
}

impl LexiconStore {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            current: RwLock::new(lexicon),
        }
    }

    /// Snapshot of the active lexicon.
    pub fn current(&self) -> Arc<Lexicon> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replaces the active lexicon with the content of `path`.
    /// On error the previous tables stay in place.
    pub fn reload(&self, path: &Path) -> Result<(), LexiconError> {
        let lexicon = Arc::new(Lexicon::load(path)?);
        info!(
            path = %path.display(),
            keywords = lexicon.keywords().len(),
            "Lexicon reloaded"
        );
        match self.current.write() {
            Ok(mut guard) => *guard = lexicon,
            Err(poisoned) => *poisoned.into_inner() = lexicon,
        }
        Ok(())
    }
}
