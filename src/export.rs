//! CSV output for games, standings and the published fixture list.

use std::io::Write;

use serde::Serialize;

use crate::config::{PublishOptions, SiteNames};
use crate::error::Result;
use crate::model::{FixtureRow, GameRecord, StandingsSnapshot};

fn write_rows<W: Write, T: Serialize>(writer: W, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write flat game rows with a header.
pub fn write_games<W: Write>(writer: W, games: &[GameRecord]) -> Result<()> {
    write_rows(writer, games.iter().map(GameRecord::to_row))
}

/// Write a standings table with the `Rank, Team, P, W, D, L, F, A, GD, Pts` header.
pub fn write_table<W: Write>(writer: W, table: &StandingsSnapshot) -> Result<()> {
    write_rows(writer, &table.rows)
}

/// Format reconciled games as the published fixture list, in date order.
pub fn publish_fixtures(
    games: &[GameRecord],
    names: &SiteNames,
    options: &PublishOptions,
) -> Vec<FixtureRow> {
    let mut games: Vec<&GameRecord> = games.iter().collect();
    games.sort_by_key(|g| g.date);
    games
        .into_iter()
        .map(|g| FixtureRow {
            date: g.date.format("%d/%m/%Y").to_string(),
            time: options.time.clone(),
            division: options.division.clone(),
            home_team: names.rename(&g.home_team).to_string(),
            away_team: names.rename(&g.away_team).to_string(),
            venue: String::new(),
            pitch: String::new(),
            home_score: g.home_score,
            away_score: g.away_score,
        })
        .collect()
}

pub fn write_fixtures<W: Write>(writer: W, fixtures: &[FixtureRow]) -> Result<()> {
    write_rows(writer, fixtures)
}
