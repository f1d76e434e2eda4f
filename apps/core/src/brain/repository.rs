//! Match Repository.
//!
//! Loads one dataset snapshot per request and answers team/status lookups
//! against it. Load failures are absorbed: the snapshot is simply empty.

use std::sync::Arc;
use tracing::warn;

use super::entities::Roster;
use super::intent::Intent;
use crate::dataset::{Dataset, MatchSource};
use crate::models::MatchRecord;

pub struct MatchRepository {
    source: Arc<dyn MatchSource>,
}

impl MatchRepository {
    pub fn new(source: Arc<dyn MatchSource>) -> Self {
        Self { source }
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Loads a fresh snapshot for one request.
    pub fn snapshot(&self) -> Snapshot {
        match self.source.load_matches() {
            Ok(dataset) => Snapshot {
                dataset: Some(dataset),
                error: None,
            },
            Err(e) => {
                warn!(source = %self.source.describe(), "Dataset unavailable: {}", e);
                Snapshot {
                    dataset: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Per-request view of the dataset.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    dataset: Option<Dataset>,
    error: Option<String>,
}

impl Snapshot {
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            dataset: Some(dataset),
            error: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.dataset.is_some()
    }

    /// Load error, when the dataset could not be read.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn match_count(&self) -> usize {
        self.dataset.iter().flat_map(|d| d.matches()).count()
    }

    /// Team roster for this request.
    pub fn roster(&self) -> Roster {
        Roster::from_dataset(self.dataset.as_ref())
    }

    /// Records opposing `team1` and `team2` in either order, or involving
    /// `team1` alone when `team2` is `None`, filtered by `intent`. Dataset
    /// order: group stage first, then the knockout bracket.
    pub fn find(&self, team1: &str, team2: Option<&str>, intent: Intent) -> Vec<&MatchRecord> {
        self.dataset
            .iter()
            .flat_map(|d| d.matches())
            .filter(|m| match team2 {
                Some(team2) => m.is_between(team1, team2),
                None => m.involves(team1),
            })
            .filter(|m| intent.accepts(m.status))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::StaticSource;
    use crate::models::Status;

    fn record(team1: &str, team2: &str, status: Status) -> MatchRecord {
        MatchRecord {
            team1: team1.to_string(),
            team2: team2.to_string(),
            score1: Some(0),
            score2: Some(0),
            status,
            time: String::new(),
        }
    }

    fn repository(records: Vec<MatchRecord>) -> MatchRepository {
        MatchRepository::new(Arc::new(StaticSource::from_records(records)))
    }

    #[test]
    fn test_lookup_is_order_independent() {
        let repo = repository(vec![record("Morocco", "Mali", Status::Live)]);
        let snapshot = repo.snapshot();

        let forward = snapshot.find("Morocco", Some("Mali"), Intent::All);
        let reverse = snapshot.find("Mali", Some("Morocco"), Intent::All);
        assert_eq!(forward, reverse);
        assert_eq!(forward.len(), 1);
    }

    #[test]
    fn test_single_team_and_status_filter() {
        let repo = repository(vec![
            record("Egypt", "South Africa", Status::Finished),
            record("Angola", "Egypt", Status::Live),
        ]);
        let snapshot = repo.snapshot();

        assert_eq!(snapshot.find("Egypt", None, Intent::All).len(), 2);
        let live = snapshot.find("Egypt", None, Intent::Live);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].team1, "Angola");
        assert!(snapshot.find("Egypt", None, Intent::Scheduled).is_empty());
    }

    #[test]
    fn test_unavailable_dataset_gives_empty_results() {
        let repo = MatchRepository::new(Arc::new(StaticSource::unavailable()));
        let snapshot = repo.snapshot();

        assert!(!snapshot.is_available());
        assert!(snapshot.error().is_some());
        assert!(snapshot.find("Morocco", None, Intent::All).is_empty());
        assert!(snapshot.roster().is_fallback());
    }
}
