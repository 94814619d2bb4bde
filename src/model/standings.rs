use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One team's cumulative record in a standings table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    #[serde(rename = "Rank")]
    pub rank: Option<u32>,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "P")]
    pub played: u32,
    #[serde(rename = "W")]
    pub won: u32,
    #[serde(rename = "D")]
    pub drawn: u32,
    #[serde(rename = "L")]
    pub lost: u32,
    #[serde(rename = "F")]
    pub goals_for: u32,
    #[serde(rename = "A")]
    pub goals_against: u32,
    #[serde(rename = "GD")]
    pub goal_difference: i32,
    #[serde(rename = "Pts")]
    pub points: u32,
}

impl StandingsRow {
    pub fn empty(team: &str) -> Self {
        Self {
            team: team.to_string(),
            ..Self::default()
        }
    }

    /// Names of the statistic columns whose values differ from `other`.
    /// Rank and team name are not compared.
    pub fn differing_columns(&self, other: &StandingsRow) -> Vec<&'static str> {
        let pairs: [(&'static str, i64, i64); 8] = [
            ("P", self.played.into(), other.played.into()),
            ("W", self.won.into(), other.won.into()),
            ("D", self.drawn.into(), other.drawn.into()),
            ("L", self.lost.into(), other.lost.into()),
            ("F", self.goals_for.into(), other.goals_for.into()),
            ("A", self.goals_against.into(), other.goals_against.into()),
            ("GD", self.goal_difference.into(), other.goal_difference.into()),
            ("Pts", self.points.into(), other.points.into()),
        ];
        pairs
            .into_iter()
            .filter(|(_, a, b)| a != b)
            .map(|(name, _, _)| name)
            .collect()
    }
}

/// A published (or computed) standings table as of a date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StandingsSnapshot {
    pub date: Option<NaiveDate>,
    pub source: Option<String>,
    pub rows: Vec<StandingsRow>,
}

impl StandingsSnapshot {
    pub fn new(rows: Vec<StandingsRow>) -> Self {
        Self {
            date: None,
            source: None,
            rows,
        }
    }

    pub fn dated(mut self, date: NaiveDate, source: impl Into<String>) -> Self {
        self.date = Some(date);
        self.source = Some(source.into());
        self
    }

    pub fn teams(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.team.clone()).collect()
    }

    pub fn row(&self, team: &str) -> Option<&StandingsRow> {
        self.rows.iter().find(|r| r.team == team)
    }

    /// Sum of games played over all rows; grows monotonically through a season.
    pub fn total_played(&self) -> u32 {
        self.rows.iter().map(|r| r.played).sum()
    }
}

/// Clean a team cell: non-breaking spaces become spaces, doubled spaces collapse.
pub fn clean_team_name(raw: &str) -> String {
    raw.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
