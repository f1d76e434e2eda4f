//! Dataset Provider
//!
//! Reads the tournament snapshot (`db.json`). The file is treated as externally
//! updated ground truth, so every call re-reads it; nothing is cached.

use crate::models::MatchRecord;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while loading the dataset. Callers in the query pipeline
/// absorb these and treat them as "no data".
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset not found at {0}")]
    Missing(PathBuf),

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no dataset configured")]
    Unavailable,
}

/// One group of the group stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchGroup {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub mlsf: Vec<MatchRecord>,
}

/// Knockout rounds, in bracket order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnockoutStage {
    #[serde(default, deserialize_with = "lenient_records")]
    pub round_of_16: Vec<MatchRecord>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub quarter_finals: Vec<MatchRecord>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub semi_finals: Vec<MatchRecord>,
    #[serde(default, rename = "final", deserialize_with = "lenient_records")]
    pub final_round: Vec<MatchRecord>,
}

impl KnockoutStage {
    pub fn matches(&self) -> impl Iterator<Item = &MatchRecord> + '_ {
        [
            &self.round_of_16,
            &self.quarter_finals,
            &self.semi_finals,
            &self.final_round,
        ]
        .into_iter()
        .flatten()
    }
}

/// Reads a list of records one by one. A record that does not fit
/// `MatchRecord` (unknown status, non-numeric score, missing team) is skipped
/// so the rest of the list is still served. `null` reads as an empty list.
fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<MatchRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(raw
        .into_iter()
        .filter_map(|value| {
            let label = format!(
                "{} vs {}",
                value.get("team1").and_then(|v| v.as_str()).unwrap_or("?"),
                value.get("team2").and_then(|v| v.as_str()).unwrap_or("?")
            );
            match serde_json::from_value::<MatchRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(record = %label, error = %e, "Skipping unreadable match record");
                    None
                }
            }
        })
        .collect())
}

/// Root of `db.json`. Either key may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub live: Option<Vec<MatchGroup>>,
    #[serde(default)]
    pub knockout_stage: Option<KnockoutStage>,
}

impl Dataset {
    /// Group-stage matches in file order.
    pub fn live_matches(&self) -> impl Iterator<Item = &MatchRecord> + '_ {
        self.live.iter().flatten().flat_map(|group| group.mlsf.iter())
    }

    /// Knockout matches in bracket order.
    pub fn knockout_matches(&self) -> impl Iterator<Item = &MatchRecord> + '_ {
        self.knockout_stage.iter().flat_map(|stage| stage.matches())
    }

    /// Every match: group stage first, then the knockout bracket.
    pub fn matches(&self) -> impl Iterator<Item = &MatchRecord> + '_ {
        self.live_matches().chain(self.knockout_matches())
    }

    /// True when neither root key is present.
    pub fn has_no_root(&self) -> bool {
        self.live.is_none() && self.knockout_stage.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.matches().next().is_none()
    }
}

/// Capability to load the current match snapshot.
pub trait MatchSource: Send + Sync {
    /// Loads a fresh snapshot.
    fn load_matches(&self) -> Result<Dataset, DatasetError>;

    /// Short human-readable description used in logs and health checks.
    fn describe(&self) -> String;
}

/// Reads a JSON file from disk on every call.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MatchSource for JsonFileSource {
    fn load_matches(&self) -> Result<Dataset, DatasetError> {
        if !self.path.exists() {
            return Err(DatasetError::Missing(self.path.clone()));
        }
        let raw = fs::read_to_string(&self.path)?;
        let dataset: Dataset = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), "Dataset loaded");
        Ok(dataset)
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

/// In-memory snapshot, mostly useful for tests and embedding.
/// `None` behaves like a dataset that cannot be loaded.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    dataset: Option<Dataset>,
}

impl StaticSource {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Some(dataset),
        }
    }

    pub fn unavailable() -> Self {
        Self { dataset: None }
    }

    /// Builds a single-group dataset from a list of records.
    pub fn from_records(records: Vec<MatchRecord>) -> Self {
        Self::new(Dataset {
            live: Some(vec![MatchGroup {
                group: Some("A".to_string()),
                mlsf: records,
            }]),
            knockout_stage: None,
        })
    }
}

impl MatchSource for StaticSource {
    fn load_matches(&self) -> Result<Dataset, DatasetError> {
        self.dataset.clone().ok_or(DatasetError::Unavailable)
    }

    fn describe(&self) -> String {
        match &self.dataset {
            Some(_) => "static dataset".to_string(),
            None => "static dataset (unavailable)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "live": [
            {"group": "A", "mlsf": [
                {"team1": "Morocco", "team2": "Mali", "score1": 1, "score2": 0, "status": "live", "time": "65'"}
            ]}
        ],
        "knockout_stage": {
            "round_of_16": [
                {"team1": "Ghana", "team2": "Gabon", "score1": null, "score2": null, "status": "scheduled", "time": "Not started"}
            ],
            "final": [
                {"team1": "Egypt", "team2": "Senegal", "score1": 2, "score2": 1, "status": "finished", "time": "FT"}
            ]
        }
    }"#;

    #[test]
    fn test_json_source_reads_both_stages_in_order() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = JsonFileSource::new(file.path()).load_matches().unwrap();
        let teams: Vec<&str> = dataset.matches().map(|m| m.team1.as_str()).collect();

        assert_eq!(teams, vec!["Morocco", "Ghana", "Egypt"]);
        assert_eq!(dataset.live_matches().count(), 1);
        assert_eq!(dataset.knockout_matches().last().unwrap().status, Status::Finished);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let source = JsonFileSource::new("/definitely/not/here/db.json");
        assert!(matches!(source.load_matches(), Err(DatasetError::Missing(_))));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let source = JsonFileSource::new(file.path());
        assert!(matches!(source.load_matches(), Err(DatasetError::Parse(_))));
    }

    #[test]
    fn test_file_is_reread_on_every_call() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"live": []}"#).unwrap();
        let source = JsonFileSource::new(file.path());
        assert!(source.load_matches().unwrap().is_empty());

        fs::write(file.path(), SAMPLE).unwrap();
        assert_eq!(source.load_matches().unwrap().matches().count(), 3);
    }

    #[test]
    fn test_bad_record_does_not_hide_the_others() {
        let raw = r#"{
            "live": [
                {"group": "A", "mlsf": [
                    {"team1": "Morocco", "team2": "Mali", "score1": 1, "score2": 0, "status": "live", "time": "65'"},
                    {"team1": "Ghana", "team2": "Gabon", "score1": null, "score2": null, "status": "postponed", "time": null},
                    {"team1": "Egypt", "team2": "Senegal", "score1": "two", "score2": 1, "status": "finished", "time": "FT"}
                ]}
            ],
            "knockout_stage": {
                "round_of_16": [
                    {"team2": "Nigeria", "status": "scheduled"},
                    {"team1": "Zambia", "team2": "Comoros", "status": "scheduled", "time": "Not started"}
                ],
                "final": null
            }
        }"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(raw.as_bytes()).unwrap();

        let dataset = JsonFileSource::new(file.path()).load_matches().unwrap();
        let teams: Vec<&str> = dataset.matches().map(|m| m.team1.as_str()).collect();

        assert_eq!(teams, vec!["Morocco", "Zambia"]);
    }

    #[test]
    fn test_root_keys_are_optional() {
        let dataset: Dataset = serde_json::from_str("{}").unwrap();
        assert!(dataset.has_no_root());
        assert!(dataset.is_empty());
    }
}
