//! Override tables and tunables, loaded once and passed into the engine.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{Competition, GameRecord};

/// Administrative post titles that never carry results.
const DEFAULT_UNNEEDED_TITLES: &[&str] = &[
    "Welcome to HIFL 2012/13",
    "Welcome to HIFL 2013/14",
    "Welcome to HIFL 2014/15",
    "Welcome to HIFL 2015/16",
    "Welcome to HIFL 2016/17",
    "HIFL Schedule",
    "Season Schedule",
    "Fixtures",
    "Cup Draw",
    "HIFL Cup Draw",
    "League Rules",
    "Registration",
    "Pre-season Friendlies",
];

/// Settings for per-post extraction.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub unneeded_titles: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            unneeded_titles: DEFAULT_UNNEEDED_TITLES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// A game to discard. Every present field must match; `date` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoidGame {
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub season: String,
    pub competition: Competition,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl VoidGame {
    pub fn matches(&self, game: &GameRecord) -> bool {
        self.home_team == game.home_team
            && self.away_team == game.away_team
            && self.home_score == game.home_score
            && self.away_score == game.away_score
            && self.season == game.season
            && self.competition == game.competition
            && self.date.is_none_or(|d| d == game.date)
    }
}

/// Field-level fix for raw games, keyed by teams, season and competition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameCorrection {
    pub home_team: String,
    pub away_team: String,
    pub season: String,
    pub competition: Competition,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl GameCorrection {
    pub fn matches(&self, game: &GameRecord) -> bool {
        self.home_team == game.home_team
            && self.away_team == game.away_team
            && self.season == game.season
            && self.competition == game.competition
    }

    pub fn apply(&self, game: &mut GameRecord) {
        if let Some(score) = self.home_score {
            game.home_score = score;
        }
        if let Some(score) = self.away_score {
            game.away_score = score;
        }
        if let Some(date) = self.date {
            game.date = date;
        }
    }
}

/// Per-season manual overrides.
#[derive(Debug, Clone, Default)]
pub struct SeasonOverrides {
    /// Teams that withdrew; their strings may stay unresolved.
    pub dropouts: Vec<String>,
    /// Canonical team name to literal spellings forced onto it.
    pub pseudonyms: BTreeMap<String, Vec<String>>,
    pub void_games: Vec<VoidGame>,
    pub corrections: Vec<GameCorrection>,
}

impl SeasonOverrides {
    /// Dropout list: one team per line, first CSV column, no header.
    pub fn parse_dropouts(text: &str) -> Result<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut dropouts = vec![];
        for record in reader.records() {
            if let Some(team) = record?.get(0).map(str::trim).filter(|t| !t.is_empty()) {
                dropouts.push(team.to_string());
            }
        }
        Ok(dropouts)
    }

    /// Forced pseudonyms: YAML map `canonical: [variant, ...]`.
    pub fn parse_pseudonyms(text: &str) -> Result<BTreeMap<String, Vec<String>>> {
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Void games: CSV with a header row naming the [`VoidGame`] fields.
    pub fn parse_void_games(text: &str) -> Result<Vec<VoidGame>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        Ok(reader.deserialize().collect::<std::result::Result<_, _>>()?)
    }

    /// Corrected games: CSV with a header row naming the [`GameCorrection`] fields.
    pub fn parse_corrections(text: &str) -> Result<Vec<GameCorrection>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        Ok(reader.deserialize().collect::<std::result::Result<_, _>>()?)
    }

    pub fn is_dropout(&self, team: &str) -> bool {
        self.dropouts.iter().any(|d| d == team)
    }

    /// Apply the corrections overlay in place. Returns how many games changed.
    pub fn apply_corrections(&self, games: &mut [GameRecord]) -> usize {
        let mut changed = 0;
        for game in games.iter_mut() {
            if let Some(correction) = self.corrections.iter().find(|c| c.matches(game)) {
                correction.apply(game);
                changed += 1;
            }
        }
        if changed > 0 {
            debug!(changed, "applied game corrections");
        }
        changed
    }
}

/// Presentation renames applied to published fixture lists.
#[derive(Debug, Clone, Default)]
pub struct SiteNames(pub BTreeMap<String, String>);

impl SiteNames {
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(Self(serde_yaml::from_str(text)?))
    }

    pub fn rename<'a>(&'a self, team: &'a str) -> &'a str {
        self.0.get(team).map(String::as_str).unwrap_or(team)
    }
}

/// Constant columns of the published fixture list.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub time: String,
    pub division: String,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            time: "14:00".to_string(),
            division: "HIFL League".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PostRef;

    fn game(home: &str, away: &str, hs: u32, aws: u32) -> GameRecord {
        GameRecord {
            source: PostRef::default(),
            competition: Competition::League,
            home_team: home.into(),
            home_score: hs,
            away_team: away.into(),
            away_score: aws,
            scorer_text: None,
            scorers: vec![],
            date: NaiveDate::from_ymd_opt(2015, 3, 1).unwrap(),
            season: "2014/15".into(),
        }
    }

    #[test]
    fn dropouts_take_first_column() {
        let dropouts = SeasonOverrides::parse_dropouts("Red Star\nFC Ha Dong,withdrew\n\n").unwrap();
        assert_eq!(dropouts, vec!["Red Star", "FC Ha Dong"]);
    }

    #[test]
    fn pseudonyms_parse_from_yaml() {
        let map = SeasonOverrides::parse_pseudonyms("Hanoi Capitals:\n  - Caps\n  - HN Caps\n").unwrap();
        assert_eq!(map["Hanoi Capitals"], vec!["Caps", "HN Caps"]);
        assert!(SeasonOverrides::parse_pseudonyms("").unwrap().is_empty());
    }

    #[test]
    fn void_games_match_exactly() {
        let voids = SeasonOverrides::parse_void_games(
            "home_team,away_team,home_score,away_score,season,competition,date\n\
             Roots,Drink,3,0,2014/15,league,\n",
        )
        .unwrap();
        assert_eq!(voids.len(), 1);
        assert!(voids[0].date.is_none());
        assert!(voids[0].matches(&game("Roots", "Drink", 3, 0)));
        assert!(!voids[0].matches(&game("Roots", "Drink", 3, 1)));
    }

    #[test]
    fn corrections_update_fields() {
        let overrides = SeasonOverrides {
            corrections: SeasonOverrides::parse_corrections(
                "home_team,away_team,season,competition,home_score,away_score,date\n\
                 Roots,Drink,2014/15,league,,2,2015-04-01\n",
            )
            .unwrap(),
            ..SeasonOverrides::default()
        };
        let mut games = vec![game("Roots", "Drink", 3, 0), game("Drink", "Roots", 1, 1)];
        assert_eq!(overrides.apply_corrections(&mut games), 1);
        assert_eq!(games[0].home_score, 3);
        assert_eq!(games[0].away_score, 2);
        assert_eq!(games[0].date, NaiveDate::from_ymd_opt(2015, 4, 1).unwrap());
        assert_eq!(games[1].away_score, 1);
    }

    #[test]
    fn site_names_fall_back_to_input() {
        let names = SiteNames::parse("Hanoi Capitals: Capitals FC\n").unwrap();
        assert_eq!(names.rename("Hanoi Capitals"), "Capitals FC");
        assert_eq!(names.rename("Roots"), "Roots");
    }
}
