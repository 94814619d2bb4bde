use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::post::{Competition, PostRef};

/// A match line as captured by the pattern cascade, before any typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawGame {
    pub line: String,
    pub home_team: String,
    pub home_score: String,
    pub away_score: String,
    pub away_team: String,
    pub trailing: String,
}

impl RawGame {
    /// Tuple view in capture order: line, home, home score, away score, away, trailing.
    pub fn as_tuple(&self) -> (&str, &str, &str, &str, &str, &str) {
        (
            &self.line,
            &self.home_team,
            &self.home_score,
            &self.away_score,
            &self.away_team,
            &self.trailing,
        )
    }
}

/// Which side of a fixture something belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

/// One goal scorer. `team` is `None` when the scorer list could not be tied
/// to either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorerEntry {
    pub player: String,
    pub goals: u32,
    pub team: Option<String>,
}

/// A typed game result extracted from a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub source: PostRef,
    pub competition: Competition,
    pub home_team: String,
    pub home_score: u32,
    pub away_team: String,
    pub away_score: u32,
    pub scorer_text: Option<String>,
    pub scorers: Vec<ScorerEntry>,
    pub date: NaiveDate,
    pub season: String,
}

impl GameRecord {
    pub fn fixture(&self) -> Fixture {
        Fixture::new(&self.home_team, &self.away_team)
    }

    /// The same result with home and away swapped.
    pub fn flipped(&self) -> Self {
        Self {
            home_team: self.away_team.clone(),
            home_score: self.away_score,
            away_team: self.home_team.clone(),
            away_score: self.home_score,
            ..self.clone()
        }
    }

    pub fn to_row(&self) -> GameRow {
        GameRow {
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            home_score: self.home_score,
            away_score: self.away_score,
            filepath: self.source.filepath.clone(),
            post_title: self.source.title.clone(),
            date: self.date,
            season: self.season.clone(),
            competition: self.competition,
        }
    }
}

/// An ordered home/away pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fixture {
    pub home_team: String,
    pub away_team: String,
}

impl Fixture {
    pub fn new(home_team: &str, away_team: &str) -> Self {
        Self {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self::new(&self.away_team, &self.home_team)
    }
}

impl Display for Fixture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vs. {}", self.home_team, self.away_team)
    }
}

/// Flat game row for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRow {
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub filepath: String,
    pub post_title: String,
    pub date: NaiveDate,
    pub season: String,
    pub competition: Competition,
}

/// A row of the published fixture list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Division")]
    pub division: String,
    #[serde(rename = "Home Team")]
    pub home_team: String,
    #[serde(rename = "Away Team")]
    pub away_team: String,
    #[serde(rename = "Venue")]
    pub venue: String,
    #[serde(rename = "Pitch")]
    pub pitch: String,
    #[serde(rename = "Home Score")]
    pub home_score: u32,
    #[serde(rename = "Away Score")]
    pub away_score: u32,
}
