//! # Brain Module
//!
//! Rule-based query understanding for match questions. No model is loaded:
//! everything is lexicon tables, regex patterns and fuzzy string matching.
//!
//! ## Components
//! - `lexicon`: French/English term tables, reloadable at runtime
//! - `language`: Language detection (lexical vote, then statistical)
//! - `translate`: Query and response translation through the lexicon
//! - `intent`: Live / scheduled / finished classification
//! - `tagger`, `fuzzy`, `entities`: Team-name extraction
//! - `repository`: Per-request dataset lookups
//! - `templates`, `formatter`: Answer rendering
//! - `trace`: Diagnostic output
//! - `pipeline`: Main orchestrator

pub mod entities;
pub mod formatter;
pub mod fuzzy;
pub mod intent;
pub mod language;
pub mod lexicon;
pub mod pipeline;
pub mod repository;
pub mod tagger;
pub mod templates;
pub mod trace;
pub mod translate;

// Re-export main types for convenience
pub use entities::{EntityExtractor, Extraction, ExtractionStage, Roster, DEFAULT_ROSTER};
pub use formatter::{Answer, ResponseFormatter};
pub use fuzzy::{FuzzyMatch, Similarity, TokenSortRatio};
pub use intent::{Intent, IntentClassifier, IntentResult};
pub use language::{Detection, Language, LanguageDetector};
pub use lexicon::{Lexicon, LexiconError, LexiconStore};
pub use pipeline::{QueryEngine, QueryOutcome};
pub use repository::{MatchRepository, Snapshot};
pub use tagger::{HeuristicTagger, PlainTokenizer, Tagger};
pub use trace::{Fallback, QueryTrace};
pub use translate::{QueryTranslator, ResponseTranslator, Translation};
