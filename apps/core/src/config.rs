//! Runtime settings, read from the environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use validator::Validate;

use crate::brain::fuzzy::{DEFAULT_THRESHOLD, SCORE_QUERY_THRESHOLD};
use crate::error::AppError;
use crate::fs_manager::PortablePathManager;

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// Bunyan JSON records
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("Unknown LOG_FORMAT '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Tournament snapshot, re-read on every query.
    pub dataset_path: PathBuf,
    /// Optional lexicon file replacing the built-in tables.
    pub lexicon_path: Option<PathBuf>,
    /// Team-name acceptance threshold (strictly greater than).
    #[validate(range(max = 100))]
    pub fuzzy_threshold: u8,
    /// Threshold for "score of A and B" questions.
    #[validate(range(max = 100))]
    pub score_threshold: u8,
    /// Conversation store.
    #[validate(length(min = 1))]
    pub database_url: String,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: PortablePathManager::dataset_path(),
            lexicon_path: None,
            fuzzy_threshold: DEFAULT_THRESHOLD,
            score_threshold: SCORE_QUERY_THRESHOLD,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Reads `MATCHDAY_*` and `LOG_FORMAT`; unset variables keep their
    /// defaults. Call `dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, AppError> {
        let mut settings = Settings::default();

        if let Some(path) = read_var("MATCHDAY_DATASET") {
            settings.dataset_path = PortablePathManager::resolve(path);
        }
        if let Some(path) = read_var("MATCHDAY_LEXICON") {
            settings.lexicon_path = Some(PortablePathManager::resolve(path));
        }
        if let Some(raw) = read_var("MATCHDAY_FUZZY_THRESHOLD") {
            settings.fuzzy_threshold = parse_threshold("MATCHDAY_FUZZY_THRESHOLD", &raw)?;
        }
        if let Some(raw) = read_var("MATCHDAY_SCORE_THRESHOLD") {
            settings.score_threshold = parse_threshold("MATCHDAY_SCORE_THRESHOLD", &raw)?;
        }
        if let Some(url) = read_var("MATCHDAY_DATABASE_URL") {
            settings.database_url = url;
        }
        if let Some(format) = read_var("LOG_FORMAT") {
            settings.log_format = format.parse()?;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn read_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_threshold(key: &str, raw: &str) -> Result<u8, AppError> {
    raw.trim()
        .parse::<u8>()
        .map_err(|e| AppError::Config(format!("{} must be an integer 0-100: {}", key, e)))
}
