//! Response Formatter.
//!
//! Renders the pipeline's decision as English text through the template
//! registry.

use serde::{Deserialize, Serialize};

use super::intent::Intent;
use super::templates;
use crate::models::{MatchRecord, Status};

/// What the pipeline decided to answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    /// First record satisfying the lookup.
    Match(MatchRecord),
    /// Teams were found but no record satisfied the lookup.
    NoMatch { intent: Intent, teams: Vec<String> },
    /// No team could be extracted.
    Unclear,
    /// Blank input.
    EmptyMessage,
    /// Internal fault.
    Apology,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn format(&self, answer: &Answer) -> String {
        match answer {
            Answer::Match(record) => self.format_record(record),
            Answer::NoMatch { intent, teams } => templates::no_match_line(*intent, teams),
            Answer::Unclear => templates::UNCLEAR.to_string(),
            Answer::EmptyMessage => templates::EMPTY_MESSAGE.to_string(),
            Answer::Apology => templates::APOLOGY.to_string(),
        }
    }

    /// Single-record rendering. Missing scores render as 0.
    pub fn format_record(&self, record: &MatchRecord) -> String {
        let status = templates::status_text(record.status, &record.time);
        match record.status {
            Status::Finished | Status::Live => templates::score_line(
                &record.team1,
                record.score1.unwrap_or(0),
                record.score2.unwrap_or(0),
                &record.team2,
                &status,
            ),
            Status::Scheduled => templates::scheduled_line(&record.team1, &record.team2, &status),
        }
    }
}
