//! Preflight Check System
//!
//! Health checks on the pieces a query depends on: the match dataset, the
//! lexicon tables and the session database. Used at start-up and by the
//! `/health` command.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::brain::lexicon::Lexicon;
use crate::brain::repository::MatchRepository;
use crate::config::Settings;
use crate::database;
use crate::dataset::JsonFileSource;

/// Result of a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Complete preflight check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub all_passed: bool,
    pub checks: Vec<CheckResult>,
    /// False only when a critical check failed. A missing dataset is not
    /// critical: queries still get the unclear answer.
    pub ready_to_start: bool,
    pub summary: String,
}

impl PreflightReport {
    pub fn from_checks(checks: Vec<CheckResult>) -> Self {
        let all_passed = checks.iter().all(|c| c.passed);
        let critical_passed = checks
            .iter()
            .filter(|c| is_critical_check(&c.name))
            .all(|c| c.passed);

        let summary = if all_passed {
            "All checks passed. System ready.".to_string()
        } else if critical_passed {
            "Some non-critical checks failed. System can start with warnings.".to_string()
        } else {
            "Critical checks failed. System cannot start.".to_string()
        };

        Self {
            all_passed,
            checks,
            ready_to_start: critical_passed,
            summary,
        }
    }

    pub fn log(&self) {
        for check in &self.checks {
            if check.passed {
                info!("  [ok] {}: {}", check.name, check.message);
            } else {
                warn!("  [failed] {}: {}", check.name, check.message);
                if let Some(details) = &check.details {
                    warn!("      Details: {}", details);
                }
            }
        }
        info!("Summary: {}", self.summary);
    }
}

fn is_critical_check(name: &str) -> bool {
    matches!(name, "lexicon" | "database")
}

/// Runs every check against the configured dataset, lexicon and database.
pub async fn run_preflight_checks(settings: &Settings, pool: &SqlitePool) -> PreflightReport {
    info!("Running preflight checks");

    let repository = MatchRepository::new(Arc::new(JsonFileSource::new(&settings.dataset_path)));
    let lexicon_check = match &settings.lexicon_path {
        Some(path) => match Lexicon::load(path) {
            Ok(lexicon) => check_lexicon(&lexicon),
            Err(e) => CheckResult::fail(
                "lexicon",
                "Cannot load lexicon file",
                Some(format!("{}: {}", path.display(), e)),
            ),
        },
        None => check_lexicon(&Lexicon::builtin()),
    };

    let checks = vec![
        check_dataset(&repository),
        lexicon_check,
        check_database(pool).await,
    ];

    let report = PreflightReport::from_checks(checks);
    report.log();
    report
}

// --- Individual Checks ---

pub fn check_dataset(repository: &MatchRepository) -> CheckResult {
    let snapshot = repository.snapshot();
    if !snapshot.is_available() {
        return CheckResult::fail(
            "dataset",
            "Dataset cannot be loaded",
            snapshot.error().map(str::to_string),
        );
    }

    let count = snapshot.match_count();
    if count == 0 {
        CheckResult::fail(
            "dataset",
            "Dataset loaded but holds no matches",
            Some(repository.describe()),
        )
    } else {
        CheckResult::pass(
            "dataset",
            &format!("Dataset OK ({} matches, {} teams)", count, snapshot.roster().names().len()),
        )
    }
}

pub fn check_lexicon(lexicon: &Lexicon) -> CheckResult {
    let keywords = lexicon.keywords().len();
    let teams = lexicon.team_names().count();
    if keywords == 0 {
        CheckResult::fail("lexicon", "Lexicon has no keyword entries", None)
    } else {
        CheckResult::pass(
            "lexicon",
            &format!(
                "Lexicon OK ({} -> {}, {} keywords, {} teams)",
                lexicon.source_language(),
                lexicon.pivot_language(),
                keywords,
                teams
            ),
        )
    }
}

pub async fn check_database(pool: &SqlitePool) -> CheckResult {
    if let Err(e) = database::ping(pool).await {
        return CheckResult::fail("database", "Cannot query database", Some(e.to_string()));
    }

    let tables = sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name",
    )
    .fetch_all(pool)
    .await;

    match tables {
        Ok(tables) => {
            let missing: Vec<&str> = ["sessions", "messages"]
                .into_iter()
                .filter(|t| !tables.iter().any(|name| name == t))
                .collect();

            if missing.is_empty() {
                CheckResult::pass("database", &format!("Database OK ({} tables)", tables.len()))
            } else {
                CheckResult::fail(
                    "database",
                    "Missing tables",
                    Some(format!("Missing: {}", missing.join(", "))),
                )
            }
        }
        Err(e) => CheckResult::fail("database", "Cannot list tables", Some(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::StaticSource;
    use crate::models::{MatchRecord, Status};

    #[test]
    fn test_report_flags_critical_failures() {
        let report = PreflightReport::from_checks(vec![
            CheckResult::fail("dataset", "Dataset cannot be loaded", None),
            CheckResult::pass("lexicon", "ok"),
            CheckResult::pass("database", "ok"),
        ]);
        assert!(!report.all_passed);
        assert!(report.ready_to_start);

        let report = PreflightReport::from_checks(vec![CheckResult::fail("database", "down", None)]);
        assert!(!report.ready_to_start);
    }

    #[test]
    fn test_dataset_check() {
        let missing = MatchRepository::new(Arc::new(StaticSource::unavailable()));
        assert!(!check_dataset(&missing).passed);

        let loaded = MatchRepository::new(Arc::new(StaticSource::from_records(vec![MatchRecord {
            team1: "Morocco".to_string(),
            team2: "Mali".to_string(),
            score1: Some(1),
            score2: Some(0),
            status: Status::Live,
            time: "65'".to_string(),
        }])));
        let check = check_dataset(&loaded);
        assert!(check.passed);
        assert!(check.message.contains("1 matches"));
    }

    #[test]
    fn test_builtin_lexicon_check_passes() {
        assert!(check_lexicon(&Lexicon::builtin()).passed);
    }

    #[tokio::test]
    async fn test_database_check() {
        let pool = database::init_db("sqlite::memory:").await.unwrap();
        let check = check_database(&pool).await;
        assert!(check.passed, "{:?}", check);
    }
}
