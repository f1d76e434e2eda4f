//! Response template registry.
//!
//! Every answer shape is defined once here: how it is rendered in English,
//! how it is recognised again, and how it is rebuilt in the source language.
//! The formatter and the response translator both go through this module.

use regex::Regex;
use std::sync::LazyLock;

use super::intent::Intent;
use crate::models::Status;

pub const UNCLEAR: &str = "Please specify the teams you are referring to, e.g., 'Morocco vs Mali.'";
pub const EMPTY_MESSAGE: &str = "Please enter a message.";
pub const APOLOGY: &str = "Sorry, there was an error processing your request. Please try again.";

pub const STATUS_FINISHED: &str = "Status: Finished";
pub const STATUS_LIVE: &str = "Status: Live";
pub const STATUS_SCHEDULED: &str = "Status: Scheduled";
pub const STATUS_SCHEDULED_FOR: &str = "Status: Scheduled for";

/// Kickoff placeholder used by the dataset for undated fixtures.
pub const NOT_STARTED: &str = "Not started";

/// Separator between two team names in rendered answers.
pub const TEAM_SEPARATOR: &str = " vs ";

static SCORE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?) (\d+) - (\d+) (.+?) \| (status\s*:.*)$")
        .expect("Invalid regex: score line")
});

static SCHEDULED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?) vs (.+?) \| (status\s*:.*)$").expect("Invalid regex: scheduled line")
});

static NO_MATCH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^No (?:(live|finished|scheduled) )?matches found for (.+)\.$")
        .expect("Invalid regex: no-match line")
});

static STATUS_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^status\s*:\s*(live|finished|scheduled)").expect("Invalid regex: status prefix")
});

/// A rendered answer, recognised back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// `{team1} {score1} - {score2} {team2} | {status}`
    Score {
        team1: String,
        score1: u32,
        score2: u32,
        team2: String,
        status: String,
    },
    /// `{team1} vs {team2} | {status}`
    Scheduled {
        team1: String,
        team2: String,
        status: String,
    },
    /// `No [{intent} ]matches found for {teams}.`
    NoMatch { intent: Intent, teams: Vec<String> },
}

impl Shape {
    /// The status named by the status segment, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            Shape::Score { status, .. } | Shape::Scheduled { status, .. } => status_of(status),
            Shape::NoMatch { .. } => None,
        }
    }
}

/// Status text for a record.
pub fn status_text(status: Status, time: &str) -> String {
    match status {
        Status::Finished => STATUS_FINISHED.to_string(),
        Status::Live => format!("{} - {}", STATUS_LIVE, time),
        Status::Scheduled if time.is_empty() || time == NOT_STARTED => {
            STATUS_SCHEDULED.to_string()
        }
        Status::Scheduled => format!("{} {}", STATUS_SCHEDULED_FOR, time),
    }
}

pub fn score_line(team1: &str, score1: u32, score2: u32, team2: &str, status: &str) -> String {
    format!("{} {} - {} {} | {}", team1, score1, score2, team2, status)
}

pub fn scheduled_line(team1: &str, team2: &str, status: &str) -> String {
    format!("{}{}{} | {}", team1, TEAM_SEPARATOR, team2, status)
}

/// English lead-in of the no-match sentence.
pub fn no_match_prefix(intent: Intent) -> &'static str {
    match intent {
        Intent::All => "No matches found for",
        Intent::Live => "No live matches found for",
        Intent::Finished => "No finished matches found for",
        Intent::Scheduled => "No scheduled matches found for",
    }
}

pub fn no_match_line<S: AsRef<str>>(intent: Intent, teams: &[S]) -> String {
    let joined = teams
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(TEAM_SEPARATOR);
    format!("{} {}.", no_match_prefix(intent), joined)
}

/// Recognises a rendered answer. Matching of the score and scheduled lines
/// is case-insensitive so the lowercased output of the query translator can
/// be parsed as well.
pub fn parse(text: &str) -> Option<Shape> {
    let text = text.trim();

    if let Some(caps) = NO_MATCH_LINE.captures(text) {
        let intent = match caps.get(1).map(|m| m.as_str()) {
            Some("live") => Intent::Live,
            Some("finished") => Intent::Finished,
            Some("scheduled") => Intent::Scheduled,
            _ => Intent::All,
        };
        let teams = caps[2]
            .split(TEAM_SEPARATOR)
            .map(|t| t.trim().to_string())
            .collect();
        return Some(Shape::NoMatch { intent, teams });
    }

    if let Some(caps) = SCORE_LINE.captures(text) {
        if let (Ok(score1), Ok(score2)) = (caps[2].parse(), caps[3].parse()) {
            return Some(Shape::Score {
                team1: caps[1].trim().to_string(),
                score1,
                score2,
                team2: caps[4].trim().to_string(),
                status: caps[5].to_string(),
            });
        }
    }

    SCHEDULED_LINE.captures(text).map(|caps| Shape::Scheduled {
        team1: caps[1].trim().to_string(),
        team2: caps[2].trim().to_string(),
        status: caps[3].to_string(),
    })
}

/// Reads the status out of a status segment ("Status: Live - 65'",
/// "status : scheduled for ...").
pub fn status_of(segment: &str) -> Option<Status> {
    let caps = STATUS_PREFIX.captures(segment.trim())?;
    match caps[1].to_lowercase().as_str() {
        "live" => Some(Status::Live),
        "finished" => Some(Status::Finished),
        "scheduled" => Some(Status::Scheduled),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(Status::Finished, "FT"), "Status: Finished");
        assert_eq!(status_text(Status::Live, "65'"), "Status: Live - 65'");
        assert_eq!(status_text(Status::Scheduled, "Not started"), "Status: Scheduled");
        assert_eq!(
            status_text(Status::Scheduled, "2025-12-29 20:00"),
            "Status: Scheduled for 2025-12-29 20:00"
        );
    }

    #[test]
    fn test_no_match_lines() {
        assert_eq!(
            no_match_line(Intent::All, &["Morocco", "Mali"]),
            "No matches found for Morocco vs Mali."
        );
        assert_eq!(
            no_match_line(Intent::Scheduled, &["Senegal"]),
            "No scheduled matches found for Senegal."
        );
    }

    #[test]
    fn test_parse_score_line() {
        let shape = parse("Morocco 1 - 0 Mali | Status: Live - 65'").unwrap();

        assert_eq!(
            shape,
            Shape::Score {
                team1: "Morocco".to_string(),
                score1: 1,
                score2: 0,
                team2: "Mali".to_string(),
                status: "Status: Live - 65'".to_string(),
            }
        );
        assert_eq!(shape.status(), Some(Status::Live));
    }

    #[test]
    fn test_parse_multiword_teams() {
        let shape = parse("Egypt 2 - 1 South Africa | Status: Finished").unwrap();
        match shape {
            Shape::Score { team2, .. } => assert_eq!(team2, "South Africa"),
            other => panic!("unexpected shape {:?}", other),
        }

        let shape = parse("Ivory Coast vs Burkina Faso | Status: Scheduled").unwrap();
        assert_eq!(
            shape,
            Shape::Scheduled {
                team1: "Ivory Coast".to_string(),
                team2: "Burkina Faso".to_string(),
                status: "Status: Scheduled".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_is_case_insensitive_for_lines() {
        let shape = parse("morocco vs zambia | status : scheduled for 2025-12-29 20:00").unwrap();
        assert_eq!(shape.status(), Some(Status::Scheduled));
    }

    #[test]
    fn test_parse_no_match_line() {
        assert_eq!(
            parse("No scheduled matches found for Senegal."),
            Some(Shape::NoMatch {
                intent: Intent::Scheduled,
                teams: vec!["Senegal".to_string()],
            })
        );
        assert_eq!(
            parse("No matches found for Morocco vs Mali."),
            Some(Shape::NoMatch {
                intent: Intent::All,
                teams: vec!["Morocco".to_string(), "Mali".to_string()],
            })
        );
    }

    #[test]
    fn test_unknown_text_has_no_shape() {
        assert_eq!(parse(UNCLEAR), None);
        assert_eq!(parse("Bonjour tout le monde"), None);
    }
}
