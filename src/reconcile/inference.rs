use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::model::{
    Competition, GameRecord, PostRef, StandingsRow, StandingsSnapshot, UnresolvedDelta,
};

/// Games recovered from standings snapshots, plus the deltas that fit no game.
#[derive(Debug, Clone, Default)]
pub struct InferredGames {
    pub games: Vec<GameRecord>,
    pub unresolved: Vec<UnresolvedDelta>,
}

#[derive(Debug, Clone)]
struct Delta {
    team: String,
    played: i32,
    goals_for: i32,
    goals_against: i32,
    date: NaiveDate,
    source: Option<String>,
    deferred: bool,
}

impl Delta {
    fn between(previous: Option<&StandingsRow>, current: &StandingsRow) -> (i32, i32, i32) {
        let before = previous.cloned().unwrap_or_default();
        (
            current.played as i32 - before.played as i32,
            current.goals_for as i32 - before.goals_for as i32,
            current.goals_against as i32 - before.goals_against as i32,
        )
    }

    fn mirrors(&self, other: &Delta) -> bool {
        self.team != other.team
            && self.goals_for == other.goals_against
            && self.goals_against == other.goals_for
    }

    fn unresolved(self) -> UnresolvedDelta {
        UnresolvedDelta {
            date: Some(self.date),
            source: self.source,
            team: self.team,
            played: self.played,
            goals_for: self.goals_for,
            goals_against: self.goals_against,
        }
    }
}

/// Recover games missing from the posts by differencing consecutive snapshots.
///
/// Snapshots are ordered by total games played. Between two snapshots, each
/// team that played is paired with another whose goals for and against are
/// the mirror image of its own. A delta left unpaired is carried into the
/// next interval once and reported if it still finds no partner. With
/// `include_first`, the first snapshot is differenced against an empty table.
pub fn infer_missing_games(
    snapshots: Vec<StandingsSnapshot>,
    season: &str,
    include_first: bool,
) -> InferredGames {
    let mut snapshots: Vec<StandingsSnapshot> = snapshots
        .into_iter()
        .filter(|s| {
            if s.date.is_none() {
                warn!(source = ?s.source, "skipping undated standings snapshot");
            }
            s.date.is_some()
        })
        .collect();
    snapshots.sort_by_key(StandingsSnapshot::total_played);

    let mut inferred = InferredGames::default();
    let mut carried: Vec<Delta> = vec![];
    let start = if include_first { 0 } else { 1 };

    for idx in start..snapshots.len() {
        let current = &snapshots[idx];
        let previous = idx.checked_sub(1).map(|i| &snapshots[i]);
        let Some(date) = current.date else {
            continue;
        };

        let mut pool: Vec<Delta> = std::mem::take(&mut carried);
        for row in &current.rows {
            let (played, goals_for, goals_against) =
                Delta::between(previous.and_then(|p| p.row(&row.team)), row);
            if played == 0 {
                continue;
            }
            pool.push(Delta {
                team: row.team.clone(),
                played,
                goals_for,
                goals_against,
                date,
                source: current.source.clone(),
                deferred: false,
            });
        }

        let mut used = vec![false; pool.len()];
        for i in 0..pool.len() {
            if used[i] {
                continue;
            }
            let partner = (0..pool.len()).find(|&j| j != i && !used[j] && pool[i].mirrors(&pool[j]));
            let Some(j) = partner else {
                continue;
            };
            used[i] = true;
            used[j] = true;
            let (home, away) = (&pool[i], &pool[j]);
            debug!(home = %home.team, away = %away.team, %date, "inferred game from standings");
            inferred.games.push(GameRecord {
                source: PostRef {
                    url: current.source.clone().unwrap_or_default(),
                    ..PostRef::default()
                },
                competition: Competition::League,
                home_team: home.team.clone(),
                home_score: home.goals_for.max(0) as u32,
                away_team: away.team.clone(),
                away_score: away.goals_for.max(0) as u32,
                scorer_text: None,
                scorers: vec![],
                date,
                season: season.to_string(),
            });
        }

        for (delta, used) in pool.into_iter().zip(used) {
            if used {
                continue;
            }
            if delta.deferred {
                warn!(team = %delta.team, date = %delta.date, "standings delta has no opponent");
                inferred.unresolved.push(delta.unresolved());
            } else {
                carried.push(Delta {
                    deferred: true,
                    ..delta
                });
            }
        }
    }

    for delta in carried {
        warn!(team = %delta.team, date = %delta.date, "standings delta has no opponent");
        inferred.unresolved.push(delta.unresolved());
    }
    inferred
}
