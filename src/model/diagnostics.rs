use chrono::NaiveDate;
use serde::Serialize;

use super::game::{Fixture, Side};
use super::standings::StandingsRow;

/// Goals attributed to one side do not add up to that side's score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorerMismatch {
    pub home_team: String,
    pub away_team: String,
    pub date: NaiveDate,
    pub side: Side,
    pub recorded: u32,
    pub attributed: u32,
}

/// A round-robin fixture with no recorded result after repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingFixture {
    pub season: String,
    pub fixture: Fixture,
}

/// A standings delta that could not be paired with an opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedDelta {
    pub date: Option<NaiveDate>,
    pub source: Option<String>,
    pub team: String,
    pub played: i32,
    pub goals_for: i32,
    pub goals_against: i32,
}

/// A team whose computed row disagrees with the published final table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDiscrepancy {
    pub team: String,
    pub columns: Vec<&'static str>,
    pub computed: Option<StandingsRow>,
    pub published: Option<StandingsRow>,
}
