use std::cmp::Reverse;
use std::collections::HashMap;

use crate::model::{GameRecord, StandingsRow, StandingsSnapshot, TableDiscrepancy};

const ALL_COLUMNS: &[&str] = &["P", "W", "D", "L", "F", "A", "GD", "Pts"];

/// Compute a league table from game results.
///
/// Every team in `teams` gets a row even without games. Ordering is points,
/// then goal difference, then goals for, then name.
pub fn compute_table(teams: &[String], games: &[GameRecord]) -> StandingsSnapshot {
    let mut rows: HashMap<&str, StandingsRow> = teams
        .iter()
        .map(|t| (t.as_str(), StandingsRow::empty(t)))
        .collect();

    for game in games {
        for (team, scored, conceded) in [
            (&game.home_team, game.home_score, game.away_score),
            (&game.away_team, game.away_score, game.home_score),
        ] {
            let row = rows
                .entry(team.as_str())
                .or_insert_with(|| StandingsRow::empty(team));
            row.goals_for += scored;
            row.goals_against += conceded;
            match scored.cmp(&conceded) {
                std::cmp::Ordering::Greater => row.won += 1,
                std::cmp::Ordering::Equal => row.drawn += 1,
                std::cmp::Ordering::Less => row.lost += 1,
            }
        }
    }

    let mut rows: Vec<StandingsRow> = rows
        .into_values()
        .map(|mut row| {
            row.played = row.won + row.drawn + row.lost;
            row.goal_difference = row.goals_for as i32 - row.goals_against as i32;
            row.points = 3 * row.won + row.drawn;
            row
        })
        .collect();
    rows.sort_by(|a, b| {
        (Reverse(a.points), Reverse(a.goal_difference), Reverse(a.goals_for), &a.team).cmp(&(
            Reverse(b.points),
            Reverse(b.goal_difference),
            Reverse(b.goals_for),
            &b.team,
        ))
    });
    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = Some(idx as u32 + 1);
    }
    StandingsSnapshot::new(rows)
}

/// Per-team differences between a computed and a published table.
pub fn compare_tables(
    computed: &StandingsSnapshot,
    published: &StandingsSnapshot,
) -> Vec<TableDiscrepancy> {
    let mut discrepancies = vec![];
    for row in &published.rows {
        let computed_row = computed.row(&row.team);
        let columns = match computed_row {
            Some(c) => c.differing_columns(row),
            None => ALL_COLUMNS.to_vec(),
        };
        if !columns.is_empty() {
            discrepancies.push(TableDiscrepancy {
                team: row.team.clone(),
                columns,
                computed: computed_row.cloned(),
                published: Some(row.clone()),
            });
        }
    }
    for row in computed.rows.iter().filter(|r| published.row(&r.team).is_none()) {
        discrepancies.push(TableDiscrepancy {
            team: row.team.clone(),
            columns: ALL_COLUMNS.to_vec(),
            computed: Some(row.clone()),
            published: None,
        });
    }
    discrepancies
}
