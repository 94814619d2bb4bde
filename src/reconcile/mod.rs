//! Season-level reconciliation: canonical team names, override tables,
//! round-robin repair and validation against the published final table.

mod fixtures;
mod inference;
mod names;
mod pipeline;
mod table;

pub use fixtures::{expected_fixtures, repair_duplicates, Repair};
pub use inference::{infer_missing_games, InferredGames};
pub use names::{apply_aliases, AliasMap, TeamNameResolver, ALIAS_THRESHOLD};
pub use pipeline::{
    Diagnostics, DropoutsRemoved, DuplicatesRepaired, Loaded, NamesResolved, SeasonOutcome,
    Stage, StandingsComputed, Verdict, VoidsRemoved,
};
pub use table::{compare_tables, compute_table};

use tracing::{info, instrument};

use crate::config::SeasonOverrides;
use crate::error::Result;
use crate::model::{clean_team_name, GameRecord, StandingsSnapshot};
use crate::similarity::Similarity;

/// One season's reference data: its published final table and overrides.
#[derive(Debug, Clone)]
pub struct Season {
    pub name: String,
    pub final_table: StandingsSnapshot,
    /// Canonical team names, in final-table order.
    pub teams: Vec<String>,
    pub overrides: SeasonOverrides,
}

impl Season {
    pub fn new(name: &str, final_table: StandingsSnapshot, overrides: SeasonOverrides) -> Self {
        let mut final_table = final_table;
        for row in &mut final_table.rows {
            row.team = clean_team_name(&row.team);
        }
        let teams = final_table.teams();
        Self {
            name: name.to_string(),
            final_table,
            teams,
            overrides,
        }
    }

    /// Start the pipeline with this season's league games from `games`.
    pub fn load(&self, games: Vec<GameRecord>) -> Stage<'_, Loaded> {
        Stage::new(self, games)
    }

    /// Run every reconciliation step.
    #[instrument(skip_all, fields(season = %self.name))]
    pub fn reconcile<S: Similarity>(
        &self,
        games: Vec<GameRecord>,
        similarity: S,
    ) -> Result<SeasonOutcome> {
        let outcome = self
            .load(games)
            .resolve_names(similarity)?
            .drop_dropouts()
            .remove_void_games()
            .repair_duplicates()
            .compute_standings()
            .validate();
        info!(
            games = outcome.games.len(),
            missing = outcome.diagnostics.missing.len(),
            discrepancies = outcome.discrepancies().len(),
            validated = outcome.is_validated(),
            "reconciled season"
        );
        Ok(outcome)
    }
}
