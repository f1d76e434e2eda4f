//! Query Orchestrator.
//!
//! One synchronous pass per query:
//! detect → translate (French only) → classify + extract → lookup
//! (swapped retry on empty) → format → translate back (French only).
//!
//! Nothing in here fails the request: degradations are recorded in the
//! [`QueryTrace`] and the user gets the closest honest answer.

use regex::Regex;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::entities::{EntityExtractor, Extraction, ExtractionStage, Roster};
use super::formatter::{Answer, ResponseFormatter};
use super::fuzzy::{Similarity, TokenSortRatio, DEFAULT_THRESHOLD, SCORE_QUERY_THRESHOLD};
use super::intent::{Intent, IntentClassifier};
use super::language::{Detection, Language, LanguageDetector};
use super::lexicon::{Lexicon, LexiconStore};
use super::repository::{MatchRepository, Snapshot};
use super::tagger::{HeuristicTagger, Tagger};
use super::trace::{Fallback, QueryTrace};
use super::translate::{QueryTranslator, ResponseTranslator};
use crate::config::Settings;
use crate::dataset::{JsonFileSource, MatchSource};
use crate::error::AppError;

static SCORE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)(?:what(?:'s| is) the|current) score (?:of|for|between) (.*?)(?:\?|$)")
            .expect("Invalid regex: score question pattern"),
        Regex::new(r"(?i)score (?:of|for|between) (.*?)(?:\?|$)")
            .expect("Invalid regex: score phrase pattern"),
    ]
});

/// Separators tried, in order, to split a "score of A and B" span.
const SCORE_SEPARATORS: [&str; 3] = [" and ", " vs ", " against "];

/// Answer and diagnostics for one query.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Final text shown to the user
    pub response: String,
    /// What was answered, before rendering
    pub answer: Answer,
    pub trace: QueryTrace,
}

/// Tagger whose gazetteer was built for `places`.
struct PlaceTagger {
    places: Vec<String>,
    tagger: Arc<dyn Tagger>,
}

/// The query-understanding pipeline. `Send + Sync`; share it behind `Arc`.
pub struct QueryEngine {
    lexicon: Arc<LexiconStore>,
    detector: LanguageDetector,
    query_translator: QueryTranslator,
    response_translator: ResponseTranslator,
    classifier: IntentClassifier,
    tagger: Arc<dyn Tagger>,
    /// Last gazetteer built from a request's roster and lexicon.
    place_tagger: Mutex<Option<PlaceTagger>>,
    similarity: Arc<dyn Similarity>,
    extractor: EntityExtractor,
    repository: MatchRepository,
    formatter: ResponseFormatter,
    fuzzy_threshold: u8,
    score_threshold: u8,
}

impl QueryEngine {
    /// Engine over `source` with the built-in lexicon, the heuristic tagger
    /// and token-sort fuzzy matching.
    pub fn new(source: Arc<dyn MatchSource>) -> Self {
        let tagger: Arc<dyn Tagger> = Arc::new(HeuristicTagger::default());
        let similarity: Arc<dyn Similarity> = Arc::new(TokenSortRatio);

        Self {
            lexicon: Arc::new(LexiconStore::new(Lexicon::builtin())),
            detector: LanguageDetector::new(),
            query_translator: QueryTranslator,
            response_translator: ResponseTranslator,
            classifier: IntentClassifier::new(),
            extractor: EntityExtractor::new(tagger.clone(), similarity.clone()),
            tagger,
            place_tagger: Mutex::new(None),
            similarity,
            repository: MatchRepository::new(source),
            formatter: ResponseFormatter,
            fuzzy_threshold: DEFAULT_THRESHOLD,
            score_threshold: SCORE_QUERY_THRESHOLD,
        }
    }

    /// Builds the engine described by `settings`: a JSON dataset file, an
    /// optional lexicon override and the configured thresholds.
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let store = LexiconStore::default();
        if let Some(path) = &settings.lexicon_path {
            store.reload(path)?;
        }

        let engine = Self::new(Arc::new(JsonFileSource::new(&settings.dataset_path)))
            .with_lexicon(Arc::new(store))
            .with_thresholds(settings.fuzzy_threshold, settings.score_threshold);

        info!(
            dataset = %engine.repository.describe(),
            tagger = engine.extractor.tagger_name(),
            fuzzy_threshold = engine.fuzzy_threshold,
            "Query engine ready"
        );
        Ok(engine)
    }

    pub fn with_lexicon(mut self, lexicon: Arc<LexiconStore>) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_tagger(mut self, tagger: Arc<dyn Tagger>) -> Self {
        self.tagger = tagger;
        self.place_tagger = Mutex::new(None);
        self.rebuild_extractor();
        self
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self.rebuild_extractor();
        self
    }

    /// Sets the general fuzzy threshold and the stricter one used for
    /// "score of A and B" questions.
    pub fn with_thresholds(mut self, fuzzy: u8, score: u8) -> Self {
        self.fuzzy_threshold = fuzzy;
        self.score_threshold = score;
        self.rebuild_extractor();
        self
    }

    fn rebuild_extractor(&mut self) {
        self.extractor = EntityExtractor::new(self.tagger.clone(), self.similarity.clone())
            .with_threshold(self.fuzzy_threshold);
    }

    /// Extractor whose tagger knows the request's roster and the current
    /// lexicon's team names as places.
    fn extractor_for(&self, roster: &Roster, lexicon: &Lexicon) -> EntityExtractor {
        let places: Vec<String> = roster
            .names()
            .iter()
            .cloned()
            .chain(lexicon.team_names().map(str::to_string))
            .collect();

        EntityExtractor::new(self.tagger_for(places), self.similarity.clone())
            .with_threshold(self.fuzzy_threshold)
    }

    fn tagger_for(&self, places: Vec<String>) -> Arc<dyn Tagger> {
        let mut cached = match self.place_tagger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(entry) = cached.as_ref().filter(|entry| entry.places == places) {
            return entry.tagger.clone();
        }

        let Some(tagger) = self.tagger.with_gazetteer(&places) else {
            return self.tagger.clone();
        };
        debug!(places = places.len(), "Place gazetteer rebuilt");
        *cached = Some(PlaceTagger {
            places,
            tagger: tagger.clone(),
        });
        tagger
    }

    pub fn lexicon(&self) -> &Arc<LexiconStore> {
        &self.lexicon
    }

    pub fn repository(&self) -> &MatchRepository {
        &self.repository
    }

    /// Answers one query. Never fails.
    pub fn process_query(&self, text: &str) -> String {
        self.process(text).response
    }

    /// Answers one query and returns the diagnostic trace with it.
    pub fn process(&self, text: &str) -> QueryOutcome {
        let started = Instant::now();
        let mut trace = QueryTrace::new(text.to_string());

        if text.trim().is_empty() {
            let answer = Answer::EmptyMessage;
            return self.finish(self.formatter.format(&answer), answer, trace, started);
        }

        let lexicon = self.lexicon.current();

        // 1. Language
        let detection = self.detector.detect(text, &lexicon);
        if detection == Detection::Undetermined {
            debug!("Language undetermined, assuming pivot language");
            trace.record(Fallback::DetectionFailure);
        }
        let language = detection.resolve();
        trace.detection = detection;
        trace.language = language;

        // 2. Pivot form of the query
        let query = match language {
            Language::French => {
                let translation = self.query_translator.translate(text, &lexicon);
                debug!(
                    substitutions = translation.substitutions,
                    "Query translated: {}", translation.text
                );
                trace.translated_query = Some(translation.text.clone());
                translation.text
            }
            Language::English => text.to_string(),
        };

        // 3. Data snapshot for this request
        let snapshot = self.repository.snapshot();
        if let Some(error) = snapshot.error() {
            trace.record(Fallback::DataUnavailable(error.to_string()));
        }
        let roster = snapshot.roster();

        // 4. Intent and teams
        let mut intent = self.classifier.classify(&query);
        let mut extraction = self.extractor_for(&roster, &lexicon).extract(&query, &roster);
        if extraction.is_empty() {
            if let Some(found) = self.score_phrase(&query, &roster) {
                debug!(teams = ?found.teams, "Teams found by score phrasing");
                extraction = found;
                intent.intent = Intent::Live;
            }
        }
        trace.intent = intent.clone();
        trace.extraction = extraction.clone();

        // 5. Lookup
        let answer = self.lookup(&snapshot, &extraction, intent.intent, &mut trace);

        // 6. Rendering
        let english = self.formatter.format(&answer);
        let response = match language {
            Language::French => {
                let translation = self.response_translator.translate(&english, &lexicon);
                if !translation.recognized {
                    debug!("No lexicon coverage for response, returning it untranslated");
                    trace.record(Fallback::TranslationMismatch);
                }
                translation.text
            }
            Language::English => english,
        };

        self.finish(response, answer, trace, started)
    }

    fn lookup(
        &self,
        snapshot: &Snapshot,
        extraction: &Extraction,
        intent: Intent,
        trace: &mut QueryTrace,
    ) -> Answer {
        let Some(first) = extraction.first() else {
            trace.record(Fallback::NoEntityFound);
            return Answer::Unclear;
        };
        let second = extraction.second();

        let mut records = snapshot.find(first, second, intent);
        trace.lookups = 1;
        if records.is_empty() {
            if let Some(second) = second {
                records = snapshot.find(second, Some(first), intent);
                trace.lookups = 2;
            }
        }
        trace.matches_found = records.len();

        match records.first() {
            Some(record) => Answer::Match((*record).clone()),
            None => {
                trace.record(Fallback::NoMatchFound);
                Answer::NoMatch {
                    intent,
                    teams: extraction.teams.clone(),
                }
            }
        }
    }

    /// "What is the score of A and B" phrasing, tried only when extraction
    /// found nothing. Both sides must clear the stricter score threshold.
    fn score_phrase(&self, query: &str, roster: &Roster) -> Option<Extraction> {
        for pattern in SCORE_PATTERNS.iter() {
            let Some(caps) = pattern.captures(query) else {
                continue;
            };
            let span = caps[1].trim();
            let parts = SCORE_SEPARATORS
                .iter()
                .map(|sep| span.split(sep).collect::<Vec<_>>())
                .find(|parts| parts.len() > 1)
                .unwrap_or_else(|| vec![span]);
            if parts.len() != 2 {
                continue;
            }

            if let Some((a, b)) =
                self.extractor
                    .match_pair(parts[0], parts[1], roster, self.score_threshold)
            {
                return Some(Extraction {
                    teams: vec![a.name.clone(), b.name.clone()],
                    stage: Some(ExtractionStage::ScorePhrase),
                    matches: vec![a, b],
                });
            }
        }
        None
    }

    fn finish(
        &self,
        response: String,
        answer: Answer,
        mut trace: QueryTrace,
        started: Instant,
    ) -> QueryOutcome {
        trace.processing_time_ms = started.elapsed().as_millis() as u64;
        debug!("Query processed in {}ms: {}", trace.processing_time_ms, trace.summary());
        QueryOutcome {
            response,
            answer,
            trace,
        }
    }
}
