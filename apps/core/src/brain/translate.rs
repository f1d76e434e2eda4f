//! Lexical translation between the source language and the pivot language.
//!
//! - `QueryTranslator`: French query → lowercased English vocabulary, one
//!   longest-match pass over the keyword table.
//! - `ResponseTranslator`: English answer → French, driven by the template
//!   registry so every answer shape is rebuilt with translated parts.

use regex::Captures;
use serde::{Deserialize, Serialize};

use super::lexicon::Lexicon;
use super::templates::{self, Shape, TEAM_SEPARATOR};

/// Translated text and how much of it the lexicon covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    /// Number of lexicon entries applied.
    pub substitutions: usize,
    /// False when the input matched nothing the lexicon knows; the text is
    /// then returned unchanged.
    pub recognized: bool,
}

impl Translation {
    fn untouched(text: String) -> Self {
        Self {
            text,
            substitutions: 0,
            recognized: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTranslator;

impl QueryTranslator {
    /// Lowercases `text` and swaps every source keyword for its pivot value.
    /// Replaced text is never matched again.
    pub fn translate(&self, text: &str, lexicon: &Lexicon) -> Translation {
        let lowered = text.replace(['\u{2019}', '\u{2018}'], "'").to_lowercase();
        let mut substitutions = 0;

        let translated = lexicon
            .keyword_pattern()
            .replace_all(&lowered, |caps: &Captures| match lexicon.pivot_for(&caps[0]) {
                Some(pivot) => {
                    substitutions += 1;
                    pivot.to_string()
                }
                None => caps[0].to_string(),
            })
            .into_owned();

        Translation {
            text: translated,
            substitutions,
            recognized: substitutions > 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseTranslator;

impl ResponseTranslator {
    pub fn translate(&self, english: &str, lexicon: &Lexicon) -> Translation {
        if let Some(source) = lexicon.response_phrase(english.trim()) {
            return Translation {
                text: source.to_string(),
                substitutions: 1,
                recognized: true,
            };
        }

        if let Some(shape) = templates::parse(english) {
            return self.rebuild(shape, lexicon);
        }

        self.substitute_phrases(english, lexicon)
    }

    fn rebuild(&self, shape: Shape, lexicon: &Lexicon) -> Translation {
        let mut substitutions = 0;
        let mut team = |name: &str| match lexicon.team_display(name) {
            Some(display) => {
                substitutions += 1;
                display.to_string()
            }
            None => name.to_string(),
        };

        let text = match shape {
            Shape::Score {
                team1,
                score1,
                score2,
                team2,
                status,
            } => {
                let (t1, t2) = (team(&team1), team(&team2));
                let status = self.status(&status, lexicon, &mut substitutions);
                templates::score_line(&t1, score1, score2, &t2, &status)
            }
            Shape::Scheduled {
                team1,
                team2,
                status,
            } => {
                let (t1, t2) = (team(&team1), team(&team2));
                let status = self.status(&status, lexicon, &mut substitutions);
                templates::scheduled_line(&t1, &t2, &status)
            }
            Shape::NoMatch { intent, teams } => {
                let teams: Vec<String> = teams.iter().map(|t| team(t)).collect();
                let english_prefix = templates::no_match_prefix(intent);
                let prefix = match lexicon.response_phrase(english_prefix) {
                    Some(source) => {
                        substitutions += 1;
                        source
                    }
                    None => english_prefix,
                };
                format!("{} {}.", prefix, teams.join(TEAM_SEPARATOR))
            }
        };

        Translation {
            text,
            substitutions,
            recognized: true,
        }
    }

    /// Swaps the longest known status phrase at the start of `segment`.
    fn status(&self, segment: &str, lexicon: &Lexicon, substitutions: &mut usize) -> String {
        for phrase in lexicon.responses_longest_first() {
            if let Some(rest) = segment.strip_prefix(phrase.pivot.as_str()) {
                *substitutions += 1;
                return format!("{}{}", phrase.source, rest);
            }
        }
        segment.to_string()
    }

    /// Last resort for text outside the registry: replace any known phrase
    /// it contains, longest first.
    fn substitute_phrases(&self, english: &str, lexicon: &Lexicon) -> Translation {
        let mut text = english.to_string();
        let mut substitutions = 0;
        for phrase in lexicon.responses_longest_first() {
            if text.contains(phrase.pivot.as_str()) {
                text = text.replace(phrase.pivot.as_str(), &phrase.source);
                substitutions += 1;
            }
        }

        if substitutions == 0 {
            return Translation::untouched(text);
        }
        Translation {
            text,
            substitutions,
            recognized: true,
        }
    }
}
