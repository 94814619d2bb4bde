use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::model::{Fixture, GameRecord};

/// Every ordered pairing of distinct teams, each pair's two orientations adjacent.
pub fn expected_fixtures(teams: &[String]) -> Vec<Fixture> {
    let mut fixtures = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1));
    for (i, home) in teams.iter().enumerate() {
        for away in &teams[i + 1..] {
            fixtures.push(Fixture::new(home, away));
            fixtures.push(Fixture::new(away, home));
        }
    }
    fixtures
}

/// Total order used when one of several records must win: latest date first,
/// remaining fields only break ties so the choice never depends on input order.
fn recency(a: &GameRecord, b: &GameRecord) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.source.url.cmp(&b.source.url))
        .then_with(|| a.home_score.cmp(&b.home_score))
        .then_with(|| a.away_score.cmp(&b.away_score))
}

/// Outcome of repairing a season's duplicate fixtures.
#[derive(Debug, Clone, Default)]
pub struct Repair {
    pub games: Vec<GameRecord>,
    /// Records re-oriented into a missing fixture, as they were before flipping.
    pub flipped: Vec<GameRecord>,
    /// Older records of a fixture played more than once.
    pub replays: Vec<GameRecord>,
    pub missing: Vec<Fixture>,
}

/// Collapse each fixture to at most one record.
///
/// When a fixture appears more than once and its reverse never appears, the
/// latest of those records was most likely reported with home and away
/// swapped, so it is flipped into the empty slot. Any fixture still repeated
/// after that keeps only its latest record.
pub fn repair_duplicates(games: Vec<GameRecord>, teams: &[String]) -> Repair {
    let mut games = games;
    let counts = games.iter().fold(HashMap::<Fixture, usize>::new(), |mut acc, g| {
        *acc.entry(g.fixture()).or_default() += 1;
        acc
    });
    let missing: HashSet<Fixture> = expected_fixtures(teams)
        .into_iter()
        .filter(|f| !counts.contains_key(f))
        .collect();

    let mut candidates: BTreeMap<Fixture, Vec<usize>> = BTreeMap::new();
    for (idx, game) in games.iter().enumerate() {
        let fixture = game.fixture();
        if counts[&fixture] > 1 && missing.contains(&fixture.reversed()) {
            candidates.entry(fixture).or_default().push(idx);
        }
    }

    let mut flipped = vec![];
    for (fixture, indices) in candidates {
        let Some(&idx) = indices.iter().max_by(|&&a, &&b| recency(&games[a], &games[b])) else {
            continue;
        };
        debug!(%fixture, date = %games[idx].date, "flipping duplicate into missing fixture");
        flipped.push(games[idx].clone());
        games[idx] = games[idx].flipped();
    }

    let mut by_fixture: BTreeMap<Fixture, Vec<GameRecord>> = BTreeMap::new();
    for game in games {
        by_fixture.entry(game.fixture()).or_default().push(game);
    }
    let mut kept = vec![];
    let mut replays = vec![];
    for (fixture, mut records) in by_fixture {
        records.sort_by(recency);
        if let Some(latest) = records.pop() {
            if !records.is_empty() {
                debug!(%fixture, dropped = records.len(), "keeping latest of repeated fixture");
            }
            kept.push(latest);
        }
        replays.extend(records);
    }
    kept.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.home_team.cmp(&b.home_team))
            .then_with(|| a.away_team.cmp(&b.away_team))
    });

    let present: HashSet<Fixture> = kept.iter().map(GameRecord::fixture).collect();
    let missing = expected_fixtures(teams)
        .into_iter()
        .filter(|f| !present.contains(f))
        .collect();

    Repair {
        games: kept,
        flipped,
        replays,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Competition, PostRef};
    use chrono::NaiveDate;

    fn teams() -> Vec<String> {
        ["Drink", "Roots", "Minsk"].iter().map(|t| t.to_string()).collect()
    }

    fn game(home: &str, away: &str, hs: u32, aws: u32, day: u32) -> GameRecord {
        GameRecord {
            source: PostRef::default(),
            competition: Competition::League,
            home_team: home.into(),
            home_score: hs,
            away_team: away.into(),
            away_score: aws,
            scorer_text: None,
            scorers: vec![],
            date: NaiveDate::from_ymd_opt(2016, 1, day).unwrap(),
            season: "2015/16".into(),
        }
    }

    fn full_season() -> Vec<GameRecord> {
        vec![
            game("Drink", "Roots", 4, 1, 2),
            game("Roots", "Drink", 0, 0, 9),
            game("Drink", "Minsk", 2, 2, 3),
            game("Minsk", "Drink", 1, 3, 10),
            game("Roots", "Minsk", 1, 0, 4),
            game("Minsk", "Roots", 2, 1, 11),
        ]
    }

    #[test]
    fn expected_fixtures_cover_every_ordered_pair() {
        let fixtures = expected_fixtures(&teams());
        assert_eq!(fixtures.len(), 6);
        assert_eq!(fixtures[0], Fixture::new("Drink", "Roots"));
        assert_eq!(fixtures[1], Fixture::new("Roots", "Drink"));
        assert_eq!(fixtures.iter().collect::<HashSet<_>>().len(), 6);
    }

    #[test]
    fn complete_season_has_no_missing_fixtures() {
        let repair = repair_duplicates(full_season(), &teams());
        assert_eq!(repair.games.len(), 6);
        assert!(repair.missing.is_empty());
        assert!(repair.flipped.is_empty());
        assert!(repair.replays.is_empty());
    }

    #[test]
    fn reversed_duplicate_fills_missing_slot() {
        let mut games = full_season();
        // Roots v Drink reported as Drink v Roots.
        games[1] = game("Drink", "Roots", 0, 0, 9);
        let repair = repair_duplicates(games, &teams());
        assert!(repair.missing.is_empty());
        assert_eq!(repair.flipped.len(), 1);
        assert_eq!(repair.flipped[0].date, NaiveDate::from_ymd_opt(2016, 1, 9).unwrap());
        let roots_drink = repair
            .games
            .iter()
            .find(|g| g.fixture() == Fixture::new("Roots", "Drink"))
            .unwrap();
        assert_eq!((roots_drink.home_score, roots_drink.away_score), (0, 0));
    }

    #[test]
    fn replay_keeps_latest_record() {
        let mut games = full_season();
        games.push(game("Drink", "Minsk", 1, 0, 20));
        let repair = repair_duplicates(games, &teams());
        assert_eq!(repair.games.len(), 6);
        assert_eq!(repair.replays.len(), 1);
        let replayed = repair
            .games
            .iter()
            .find(|g| g.fixture() == Fixture::new("Drink", "Minsk"))
            .unwrap();
        assert_eq!((replayed.home_score, replayed.away_score), (1, 0));
    }

    #[test]
    fn absent_fixture_is_reported() {
        let mut games = full_season();
        games.remove(5);
        let repair = repair_duplicates(games, &teams());
        assert_eq!(repair.missing, vec![Fixture::new("Minsk", "Roots")]);
    }

    #[test]
    fn repair_is_independent_of_input_order() {
        let mut games = full_season();
        games[1] = game("Drink", "Roots", 0, 0, 9);
        games.push(game("Drink", "Minsk", 1, 0, 20));
        let forward = repair_duplicates(games.clone(), &teams());
        games.reverse();
        let backward = repair_duplicates(games, &teams());
        assert_eq!(forward.games, backward.games);
        assert_eq!(forward.missing, backward.missing);
    }
}
