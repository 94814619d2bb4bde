use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::error::{ArchiveError, Result};
use crate::model::GameRecord;
use crate::similarity::{team_key, Similarity};

use super::Season;

/// Minimum score for an observed team string to join a canonical team.
pub const ALIAS_THRESHOLD: u8 = 80;

/// Canonical team names and every literal string assigned to each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    teams: Vec<(String, Vec<String>)>,
    lookup: HashMap<String, String>,
}

impl AliasMap {
    fn from_seeds(seeds: Vec<(String, Vec<String>)>) -> Self {
        let mut map = Self::default();
        for (team, aliases) in seeds {
            map.teams.push((team.clone(), vec![]));
            map.assign(&team, &team);
            for alias in aliases {
                map.assign(&team, &alias);
            }
        }
        map
    }

    fn assign(&mut self, team: &str, alias: &str) {
        if self.lookup.contains_key(alias) {
            return;
        }
        if let Some((_, aliases)) = self.teams.iter_mut().find(|(t, _)| t == team) {
            aliases.push(alias.to_string());
            self.lookup.insert(alias.to_string(), team.to_string());
        }
    }

    /// Canonical name for `alias`, if it was assigned.
    pub fn canonical(&self, alias: &str) -> Option<&str> {
        self.lookup.get(alias).map(String::as_str)
    }

    /// All strings assigned to `team`, the canonical name first.
    pub fn aliases(&self, team: &str) -> Option<&[String]> {
        self.teams
            .iter()
            .find(|(t, _)| t == team)
            .map(|(_, aliases)| aliases.as_slice())
    }

    pub fn teams(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.teams.iter().map(|(t, a)| (t.as_str(), a.as_slice()))
    }

    /// Rewrite a team string to its canonical name; unknown strings pass through.
    pub fn rewrite(&self, team: &str) -> String {
        self.canonical(team).unwrap_or(team).to_string()
    }
}

/// Maps observed team strings onto a season's canonical teams.
#[derive(Debug, Clone, Default)]
pub struct TeamNameResolver<S> {
    similarity: S,
}

impl<S: Similarity> TeamNameResolver<S> {
    pub fn new(similarity: S) -> Self {
        Self { similarity }
    }

    /// Assign each of `team_strs` to a seeded canonical team.
    ///
    /// An exact match on the normalized key wins; otherwise the first
    /// canonical team, in seed order, scoring at least [`ALIAS_THRESHOLD`].
    /// Returns the map and the strings nothing claimed.
    pub fn assign(
        &self,
        seeds: Vec<(String, Vec<String>)>,
        team_strs: &[String],
    ) -> (AliasMap, Vec<String>) {
        let mut map = AliasMap::from_seeds(seeds);
        let keys: Vec<(String, String)> = map
            .teams
            .iter()
            .map(|(team, _)| (team.clone(), team_key(team)))
            .collect();

        let mut unassigned = vec![];
        for ts in team_strs {
            if map.canonical(ts).is_some() {
                continue;
            }
            let key = team_key(ts);
            let team = keys
                .iter()
                .find(|(_, k)| *k == key)
                .or_else(|| {
                    keys.iter()
                        .find(|(_, k)| self.similarity.score(k, &key) >= ALIAS_THRESHOLD)
                })
                .map(|(team, _)| team.clone());
            match team {
                Some(team) => {
                    debug!(alias = %ts, %team, "assigned team alias");
                    map.assign(&team, ts);
                }
                None => unassigned.push(ts.clone()),
            }
        }
        (map, unassigned)
    }

    /// Build the alias map for `season` from the strings used in `games`.
    ///
    /// Strings that match no team are fatal unless they are declared dropouts.
    pub fn resolve(&self, season: &Season, games: &[GameRecord]) -> Result<AliasMap> {
        let forced = &season.overrides.pseudonyms;
        for team in forced.keys().filter(|t| !season.teams.contains(t)) {
            warn!(season = %season.name, %team, "forced pseudonyms for a team not in the final table");
        }
        let forced_strs: HashSet<&str> = forced.values().flatten().map(String::as_str).collect();
        let seeds = season
            .teams
            .iter()
            .map(|team| (team.clone(), forced.get(team).cloned().unwrap_or_default()))
            .collect();

        let team_strs: Vec<String> = games
            .iter()
            .flat_map(|g| [g.home_team.as_str(), g.away_team.as_str()])
            .filter(|s| !forced_strs.contains(s))
            .unique()
            .map(str::to_string)
            .collect();

        let (map, unassigned) = self.assign(seeds, &team_strs);
        let fatal: Vec<String> = unassigned
            .into_iter()
            .filter(|s| !season.overrides.is_dropout(s))
            .collect();
        if !fatal.is_empty() {
            return Err(ArchiveError::UnassignedAliases {
                season: season.name.clone(),
                aliases: fatal,
            });
        }
        Ok(map)
    }
}

/// Substitute canonical names into games and their scorer entries.
pub fn apply_aliases(games: Vec<GameRecord>, map: &AliasMap) -> Vec<GameRecord> {
    games
        .into_iter()
        .map(|mut game| {
            game.home_team = map.rewrite(&game.home_team);
            game.away_team = map.rewrite(&game.away_team);
            for scorer in &mut game.scorers {
                if let Some(team) = scorer.team.as_mut() {
                    *team = map.rewrite(team);
                }
            }
            game
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeasonOverrides;
    use crate::model::{Competition, PostRef, StandingsRow, StandingsSnapshot};
    use crate::similarity::PartialRatio;
    use chrono::NaiveDate;

    fn seeds(teams: &[&str]) -> Vec<(String, Vec<String>)> {
        teams.iter().map(|t| (t.to_string(), vec![])).collect()
    }

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn assigned(teams: &[&str], team_strs: &[&str]) -> Vec<(String, Vec<String>)> {
        let (map, unassigned) =
            TeamNameResolver::new(PartialRatio).assign(seeds(teams), &strs(team_strs));
        assert!(unassigned.is_empty(), "unassigned: {unassigned:?}");
        map.teams().map(|(t, a)| (t.to_string(), a.to_vec())).collect()
    }

    fn expect(team: &str, aliases: &[&str]) -> (String, Vec<String>) {
        (team.to_string(), strs(aliases))
    }

    #[test]
    fn shorter_name() {
        assert_eq!(
            assigned(&["Drink Team"], &["Drink"]),
            vec![expect("Drink Team", &["Drink Team", "Drink"])]
        );
    }

    #[test]
    fn longer_name() {
        assert_eq!(
            assigned(&["Drink"], &["Drink Team"]),
            vec![expect("Drink", &["Drink", "Drink Team"])]
        );
    }

    #[test]
    fn common_city_prefix() {
        assert_eq!(
            assigned(
                &["Hanoi Drink Team", "Hanoi Capitals"],
                &["Drink Team", "Capitals", "Hanoi Capitals", "Hanoi Drink Team"]
            ),
            vec![
                expect("Hanoi Drink Team", &["Hanoi Drink Team", "Drink Team"]),
                expect("Hanoi Capitals", &["Hanoi Capitals", "Capitals"]),
            ]
        );
    }

    #[test]
    fn colon_hyphen_and_diacritics() {
        assert_eq!(
            assigned(&["Brothers"], &["Brothers", "Brother:"]),
            vec![expect("Brothers", &["Brothers", "Brother:"])]
        );
        assert_eq!(
            assigned(&["X-men"], &["X-men", "X-Men", "X Men"]),
            vec![expect("X-men", &["X-men", "X-Men", "X Men"])]
        );
        assert_eq!(
            assigned(&["FC Thong Nhat"], &["FC Thong Nhat", "FC Thông Nhât"]),
            vec![expect("FC Thong Nhat", &["FC Thong Nhat", "FC Thông Nhât"])]
        );
    }

    #[test]
    fn opposite_word_order() {
        assert_eq!(
            assigned(&["Brothers FC"], &["Brothers FC", "FC Brothers"]),
            vec![expect("Brothers FC", &["Brothers FC", "FC Brothers"])]
        );
    }

    #[test]
    fn resolving_canonical_names_is_idempotent() {
        let resolver = TeamNameResolver::new(PartialRatio);
        let teams = &["Hanoi Drink Team", "Hanoi Capitals", "Roots"];
        let names = strs(teams);
        let (first, _) = resolver.assign(seeds(teams), &names);
        let (second, _) = resolver.assign(seeds(teams), &names);
        assert_eq!(first, second);
        for team in teams {
            assert_eq!(first.aliases(team), Some(&[team.to_string()][..]));
        }
    }

    fn season(dropouts: &[&str]) -> Season {
        let rows = ["Hanoi Drink Team", "Roots"]
            .iter()
            .map(|t| StandingsRow::empty(t))
            .collect();
        Season::new(
            "2015/16",
            StandingsSnapshot::new(rows),
            SeasonOverrides {
                dropouts: strs(dropouts),
                ..SeasonOverrides::default()
            },
        )
    }

    fn game(home: &str, away: &str) -> GameRecord {
        GameRecord {
            source: PostRef::default(),
            competition: Competition::League,
            home_team: home.into(),
            home_score: 1,
            away_team: away.into(),
            away_score: 0,
            scorer_text: None,
            scorers: vec![],
            date: NaiveDate::from_ymd_opt(2016, 1, 9).unwrap(),
            season: "2015/16".into(),
        }
    }

    #[test]
    fn unknown_team_is_fatal_unless_dropout() {
        let resolver = TeamNameResolver::new(PartialRatio);
        let games = vec![game("Drink", "Roots"), game("Red Star", "Roots")];

        let err = resolver.resolve(&season(&[]), &games).unwrap_err();
        match err {
            ArchiveError::UnassignedAliases { aliases, .. } => assert_eq!(aliases, vec!["Red Star"]),
            other => panic!("unexpected error {other:?}"),
        }

        let map = resolver.resolve(&season(&["Red Star"]), &games).unwrap();
        let rewritten = apply_aliases(games, &map);
        assert_eq!(rewritten[0].home_team, "Hanoi Drink Team");
        assert_eq!(rewritten[1].home_team, "Red Star");
    }
}
