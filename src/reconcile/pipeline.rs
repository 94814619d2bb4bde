//! Season reconciliation as a sequence of typed stages.
//!
//! Each transition consumes the previous stage, so the steps can only run
//! in order: names, dropouts, void games, duplicate repair, standings,
//! validation.

use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{
    Competition, GameRecord, MissingFixture, StandingsSnapshot, TableDiscrepancy,
};
use crate::similarity::Similarity;

use super::fixtures::repair_duplicates;
use super::names::{apply_aliases, AliasMap, TeamNameResolver};
use super::table::{compare_tables, compute_table};
use super::Season;

/// Everything the pipeline set aside along the way.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Games that became a team playing itself after name resolution.
    pub self_games: Vec<GameRecord>,
    pub dropout_games: Vec<GameRecord>,
    pub void_games: Vec<GameRecord>,
    pub flipped: Vec<GameRecord>,
    pub replays: Vec<GameRecord>,
    pub missing: Vec<MissingFixture>,
}

pub struct Loaded;

pub struct NamesResolved {
    pub aliases: AliasMap,
}

pub struct DropoutsRemoved;

pub struct VoidsRemoved;

pub struct DuplicatesRepaired;

pub struct StandingsComputed {
    pub table: StandingsSnapshot,
}

/// A season's games at one step of reconciliation.
pub struct Stage<'a, S> {
    season: &'a Season,
    games: Vec<GameRecord>,
    diagnostics: Diagnostics,
    state: S,
}

impl<'a, S> Stage<'a, S> {
    pub fn season(&self) -> &Season {
        self.season
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    fn advance<T>(self, games: Vec<GameRecord>, state: T) -> Stage<'a, T> {
        Stage {
            season: self.season,
            games,
            diagnostics: self.diagnostics,
            state,
        }
    }
}

impl<'a> Stage<'a, Loaded> {
    /// Keep the season's league games and apply its corrections.
    pub(super) fn new(season: &'a Season, games: Vec<GameRecord>) -> Self {
        let total = games.len();
        let mut games: Vec<GameRecord> = games
            .into_iter()
            .filter(|g| g.competition == Competition::League && g.season == season.name)
            .collect();
        let corrected = season.overrides.apply_corrections(&mut games);
        debug!(season = %season.name, total, league = games.len(), corrected, "loaded season games");
        Stage {
            season,
            games,
            diagnostics: Diagnostics::default(),
            state: Loaded,
        }
    }

    /// Rewrite every team string to its canonical name.
    pub fn resolve_names<T: Similarity>(
        mut self,
        similarity: T,
    ) -> Result<Stage<'a, NamesResolved>> {
        let aliases = TeamNameResolver::new(similarity).resolve(self.season, &self.games)?;
        let (games, self_games): (Vec<_>, Vec<_>) =
            apply_aliases(std::mem::take(&mut self.games), &aliases)
                .into_iter()
                .partition(|g| g.home_team != g.away_team);
        for game in &self_games {
            warn!(team = %game.home_team, date = %game.date, "dropping game of a team against itself");
        }
        self.diagnostics.self_games = self_games;
        Ok(self.advance(games, NamesResolved { aliases }))
    }
}

impl<'a> Stage<'a, NamesResolved> {
    /// Drop games involving a team that is not in the final table.
    pub fn drop_dropouts(mut self) -> Stage<'a, DropoutsRemoved> {
        let teams = &self.season.teams;
        let (games, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.games)
            .into_iter()
            .partition(|g| teams.contains(&g.home_team) && teams.contains(&g.away_team));
        if !dropped.is_empty() {
            debug!(season = %self.season.name, dropped = dropped.len(), "removed dropout games");
        }
        self.diagnostics.dropout_games = dropped;
        self.advance(games, DropoutsRemoved)
    }
}

impl<'a> Stage<'a, DropoutsRemoved> {
    pub fn remove_void_games(mut self) -> Stage<'a, VoidsRemoved> {
        let voids = &self.season.overrides.void_games;
        let (void, games): (Vec<_>, Vec<_>) = std::mem::take(&mut self.games)
            .into_iter()
            .partition(|g| voids.iter().any(|v| v.matches(g)));
        if !void.is_empty() {
            debug!(season = %self.season.name, voided = void.len(), "removed void games");
        }
        self.diagnostics.void_games = void;
        self.advance(games, VoidsRemoved)
    }
}

impl<'a> Stage<'a, VoidsRemoved> {
    /// Leave at most one record per fixture and list fixtures never played.
    pub fn repair_duplicates(mut self) -> Stage<'a, DuplicatesRepaired> {
        let repair = repair_duplicates(std::mem::take(&mut self.games), &self.season.teams);
        for fixture in &repair.missing {
            warn!(season = %self.season.name, %fixture, "missing fixture");
        }
        self.diagnostics.flipped = repair.flipped;
        self.diagnostics.replays = repair.replays;
        self.diagnostics.missing = repair
            .missing
            .into_iter()
            .map(|fixture| MissingFixture {
                season: self.season.name.clone(),
                fixture,
            })
            .collect();
        self.advance(repair.games, DuplicatesRepaired)
    }
}

impl<'a> Stage<'a, DuplicatesRepaired> {
    pub fn compute_standings(mut self) -> Stage<'a, StandingsComputed> {
        let table = compute_table(&self.season.teams, &self.games);
        let games = std::mem::take(&mut self.games);
        self.advance(games, StandingsComputed { table })
    }
}

impl Stage<'_, StandingsComputed> {
    /// Compare the computed table against the published final table.
    pub fn validate(self) -> SeasonOutcome {
        let discrepancies = compare_tables(&self.state.table, &self.season.final_table);
        for d in &discrepancies {
            warn!(season = %self.season.name, team = %d.team, columns = ?d.columns, "table mismatch");
        }
        let verdict = if discrepancies.is_empty() {
            Verdict::Validated
        } else {
            Verdict::Discrepant(discrepancies)
        };
        SeasonOutcome {
            season: self.season.name.clone(),
            games: self.games,
            table: self.state.table,
            diagnostics: self.diagnostics,
            verdict,
        }
    }
}

/// Whether the computed table matched the published one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Validated,
    Discrepant(Vec<TableDiscrepancy>),
}

/// Terminal result of reconciling a season.
#[derive(Debug, Clone)]
pub struct SeasonOutcome {
    pub season: String,
    pub games: Vec<GameRecord>,
    pub table: StandingsSnapshot,
    pub diagnostics: Diagnostics,
    pub verdict: Verdict,
}

impl SeasonOutcome {
    pub fn is_validated(&self) -> bool {
        self.verdict == Verdict::Validated
    }

    pub fn discrepancies(&self) -> &[TableDiscrepancy] {
        match &self.verdict {
            Verdict::Validated => &[],
            Verdict::Discrepant(d) => d,
        }
    }

    /// Missing fixtures plus table discrepancies.
    pub fn issue_count(&self) -> usize {
        self.diagnostics.missing.len() + self.discrepancies().len()
    }
}
