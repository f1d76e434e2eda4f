//! Query Pipeline Tests
//!
//! End-to-end scenarios through `QueryEngine` over a dataset file on disk,
//! in both languages.

use crate::brain::{Answer, ExtractionStage, Fallback, Intent, Language, QueryEngine};
use crate::dataset::JsonFileSource;
use std::fs;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn dataset_json() -> serde_json::Value {
    serde_json::json!({
        "live": [
            {
                "group": "A",
                "mlsf": [
                    {"team1": "Morocco", "team2": "Mali", "score1": 1, "score2": 0, "status": "live", "time": "65'"},
                    {"team1": "Zambia", "team2": "Comoros", "score1": 2, "score2": 2, "status": "finished", "time": "FT"},
                    {"team1": "Morocco", "team2": "Zambia", "score1": null, "score2": null, "status": "scheduled", "time": "2025-12-29 20:00"}
                ]
            },
            {
                "group": "B",
                "mlsf": [
                    {"team1": "Egypt", "team2": "South Africa", "score1": 2, "score2": 1, "status": "finished", "time": "FT"},
                    {"team1": "Senegal", "team2": "Botswana", "score1": 3, "score2": 0, "status": "finished", "time": "FT"}
                ]
            }
        ],
        "knockout_stage": {
            "round_of_16": [
                {"team1": "Nigeria", "team2": "Ghana", "score1": null, "score2": null, "status": "scheduled", "time": "2026-01-10 17:00"}
            ]
        }
    })
}

/// Engine over a `db.json` written to a temporary directory. Keep the
/// directory alive for the duration of the test.
fn engine_with_file() -> (TempDir, QueryEngine) {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("db.json");
    fs::write(&path, dataset_json().to_string()).expect("Failed to write dataset");

    let engine = QueryEngine::new(Arc::new(JsonFileSource::new(path)));
    (dir, engine)
}

#[cfg(test)]
mod english_tests {
    use super::*;

    #[test]
    fn test_live_match_by_pair() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("Morocco vs Mali");

        assert_eq!(outcome.response, "Morocco 1 - 0 Mali | Status: Live - 65'");
        assert_eq!(outcome.trace.extraction.stage, Some(ExtractionStage::Pair));
        assert_eq!(outcome.trace.language, Language::English);
        assert_eq!(outcome.trace.lookups, 1);
    }

    #[test]
    fn test_lookup_is_symmetric() {
        let (_dir, engine) = engine_with_file();

        let forward = engine.process("Morocco vs Mali");
        let reverse = engine.process("Mali vs Morocco");

        assert_eq!(reverse.trace.extraction.teams, vec!["Mali", "Morocco"]);
        assert_eq!(forward.answer, reverse.answer);
        assert_eq!(forward.response, reverse.response);
    }

    #[test]
    fn test_finished_match_from_tagger_candidates() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("Who won Egypt vs South Africa?");

        assert_eq!(outcome.trace.intent.intent, Intent::Finished);
        assert_eq!(outcome.trace.extraction.teams, vec!["Egypt", "South Africa"]);
        assert_eq!(outcome.response, "Egypt 2 - 1 South Africa | Status: Finished");
    }

    #[test]
    fn test_knockout_matches_are_searched() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("When does Nigeria play?");

        assert_eq!(outcome.trace.intent.intent, Intent::Scheduled);
        assert_eq!(
            outcome.response,
            "Nigeria vs Ghana | Status: Scheduled for 2026-01-10 17:00"
        );
    }

    #[test]
    fn test_misspelled_team_is_corrected() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("Moroco vs Mali");

        assert_eq!(outcome.trace.extraction.teams, vec!["Morocco", "Mali"]);
        assert_eq!(outcome.response, "Morocco 1 - 0 Mali | Status: Live - 65'");
    }

    #[test]
    fn test_unknown_teams_are_unclear() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("Atlantis vs Narnia");

        assert_eq!(outcome.answer, Answer::Unclear);
        assert_eq!(
            outcome.response,
            "Please specify the teams you are referring to, e.g., 'Morocco vs Mali.'"
        );
        assert!(outcome.trace.has_fallback(|f| *f == Fallback::NoEntityFound));
        assert_eq!(outcome.trace.lookups, 0);
    }

    #[test]
    fn test_intent_filters_records() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("Is Zambia playing right now?");

        assert_eq!(outcome.trace.intent.intent, Intent::Live);
        assert_eq!(outcome.response, "No live matches found for Zambia.");
        assert!(outcome.trace.has_fallback(|f| *f == Fallback::NoMatchFound));
    }

    #[test]
    fn test_empty_input() {
        let (_dir, engine) = engine_with_file();

        assert_eq!(engine.process_query(""), "Please enter a message.");
    }

    #[test]
    fn test_missing_dataset_degrades() {
        let dir = tempdir().expect("Failed to create temp dir");
        let engine = QueryEngine::new(Arc::new(JsonFileSource::new(dir.path().join("missing.json"))));

        let outcome = engine.process("Morocco vs Mali");

        assert!(outcome
            .trace
            .has_fallback(|f| matches!(f, Fallback::DataUnavailable(_))));
        assert_eq!(outcome.response, "No matches found for Morocco vs Mali.");
    }

    #[test]
    fn test_unknown_status_does_not_hide_other_matches() {
        let (dir, engine) = engine_with_file();

        let mut updated = dataset_json();
        updated["live"][0]["mlsf"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!(
                {"team1": "Ghana", "team2": "Gabon", "score1": null, "score2": null, "status": "postponed", "time": null}
            ));
        fs::write(dir.path().join("db.json"), updated.to_string()).unwrap();

        let outcome = engine.process("Morocco vs Mali");

        assert_eq!(outcome.response, "Morocco 1 - 0 Mali | Status: Live - 65'");
        assert!(!outcome
            .trace
            .has_fallback(|f| matches!(f, Fallback::DataUnavailable(_))));
    }

    #[test]
    fn test_dataset_is_reread_per_request() {
        let (dir, engine) = engine_with_file();
        assert_eq!(
            engine.process_query("Morocco vs Mali"),
            "Morocco 1 - 0 Mali | Status: Live - 65'"
        );

        let mut updated = dataset_json();
        updated["live"][0]["mlsf"][0]["score1"] = serde_json::json!(2);
        updated["live"][0]["mlsf"][0]["time"] = serde_json::json!("80'");
        fs::write(dir.path().join("db.json"), updated.to_string()).unwrap();

        assert_eq!(
            engine.process_query("Morocco vs Mali"),
            "Morocco 2 - 0 Mali | Status: Live - 80'"
        );
    }
}

#[cfg(test)]
mod french_tests {
    use super::*;

    #[test]
    fn test_live_match_in_french() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("Maroc contre Mali en direct");

        assert_eq!(outcome.trace.language, Language::French);
        assert_eq!(
            outcome.trace.translated_query.as_deref(),
            Some("morocco vs mali live")
        );
        assert_eq!(outcome.trace.intent.intent, Intent::Live);
        assert_eq!(outcome.response, "Maroc 1 - 0 Mali | Statut : En direct - 65'");
    }

    #[test]
    fn test_no_scheduled_match_in_french() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("Quand joue le Sénégal?");

        assert_eq!(outcome.trace.intent.intent, Intent::Scheduled);
        assert_eq!(outcome.trace.extraction.teams, vec!["Senegal"]);
        assert_eq!(outcome.response, "Aucun match programmé trouvé pour Sénégal.");
    }

    #[test]
    fn test_score_question_in_french() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("Quel est le score de Maroc et Mali ?");

        assert_eq!(outcome.trace.intent.intent, Intent::Live);
        assert_eq!(outcome.trace.extraction.teams, vec!["Morocco", "Mali"]);
        assert_eq!(outcome.response, "Maroc 1 - 0 Mali | Statut : En direct - 65'");
    }

    #[test]
    fn test_scheduled_match_in_french() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("Quand joue le Maroc contre la Zambie ?");

        assert_eq!(
            outcome.response,
            "Maroc vs Zambie | Statut : Programmé pour 2025-12-29 20:00"
        );
    }

    #[test]
    fn test_french_team_with_english_word() {
        let (_dir, engine) = engine_with_file();
        let outcome = engine.process("Maroc vs Mali score?");

        assert_eq!(outcome.trace.language, Language::French);
        assert_eq!(outcome.trace.extraction.teams, vec!["Morocco", "Mali"]);
        assert!(!outcome.response.starts_with("No "));
    }

    #[test]
    fn test_unclear_in_french() {
        let (_dir, engine) = engine_with_file();
        let response = engine.process_query("Bonjour, comment ça va ?");

        assert!(response.starts_with("Veuillez préciser"), "{}", response);
    }
}
