use std::collections::HashMap;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{ArchiveError, Result};
use crate::model::{clean_team_name, StandingsRow, StandingsSnapshot};

static SHEET_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"docs\.google\.com/spreadsheets/d/(?P<published>e/)?(?P<id>[A-Za-z0-9_-]+)")
        .expect("valid sheet id regex")
});
static SHEET_GID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&#]gid=(?P<gid>\d+)").expect("valid sheet gid regex"));

/// Where a post's standings snapshot lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Parsed from a table embedded in the post.
    Table(StandingsSnapshot),
    /// CSV export URL of an embedded spreadsheet, still to be loaded.
    Sheet(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Rank,
    Team,
    Played,
    Won,
    Drawn,
    Lost,
    For,
    Against,
    Difference,
    Points,
}

fn column_for(header: &str) -> Option<Column> {
    let header = header.trim().trim_end_matches('.').to_lowercase();
    let column = match header.as_str() {
        "rank" | "pos" | "position" | "#" => Column::Rank,
        "team" | "club" => Column::Team,
        "p" | "pl" | "pld" | "played" | "gp" | "games" => Column::Played,
        "w" | "won" | "win" | "wins" => Column::Won,
        "d" | "drawn" | "draw" | "draws" => Column::Drawn,
        "l" | "lost" | "loss" | "losses" => Column::Lost,
        "f" | "gf" | "for" | "goals for" => Column::For,
        "a" | "ga" | "against" | "goals against" => Column::Against,
        "gd" | "goal difference" | "diff" | "+/-" => Column::Difference,
        "pts" | "points" | "pt" => Column::Points,
        _ => return None,
    };
    Some(column)
}

/// Find the post's standings: the last embedded table, else an embedded
/// spreadsheet reference. `None` when the post has neither.
pub fn parse_snapshot(html: &str) -> Result<Option<SnapshotSource>> {
    let fragment = Html::parse_fragment(html);
    let table_selector = Selector::parse("table")?;
    if let Some(table) = fragment.select(&table_selector).last() {
        let rows = table_rows(&table)?;
        return rows_to_snapshot(rows).map(|s| Some(SnapshotSource::Table(s)));
    }

    let embed_selector = Selector::parse("iframe[src], a[href]")?;
    let sheet = fragment
        .select(&embed_selector)
        .filter_map(|e| e.value().attr("src").or_else(|| e.value().attr("href")))
        .find_map(resolve_sheet_url);
    Ok(sheet.map(SnapshotSource::Sheet))
}

/// Map a spreadsheet link or embed to its CSV export endpoint.
pub fn resolve_sheet_url(reference: &str) -> Option<String> {
    let caps = SHEET_ID_RE.captures(reference)?;
    let id = &caps["id"];
    let gid = SHEET_GID_RE.captures(reference).map(|c| c["gid"].to_string());
    let url = if caps.name("published").is_some() {
        let mut url = format!("https://docs.google.com/spreadsheets/d/e/{id}/pub?output=csv");
        if let Some(gid) = gid {
            url.push_str(&format!("&gid={gid}"));
        }
        url
    } else {
        let mut url = format!("https://docs.google.com/spreadsheets/d/{id}/export?format=csv");
        if let Some(gid) = gid {
            url.push_str(&format!("&gid={gid}"));
        }
        url
    };
    Some(url)
}

fn table_rows(table: &ElementRef) -> Result<Vec<Vec<String>>> {
    let row_selector = Selector::parse("tr")?;
    let cell_selector = Selector::parse("th, td")?;
    Ok(table
        .select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().split_whitespace().join(" "))
                .collect()
        })
        .collect())
}

/// Build a snapshot from raw table rows.
///
/// Fully empty columns are dropped and repeated rows (a header printed twice)
/// collapse to their first occurrence; the first remaining row is the header.
pub fn rows_to_snapshot(rows: Vec<Vec<String>>) -> Result<StandingsSnapshot> {
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
        .unique()
        .collect();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let keep: Vec<usize> = (0..width)
        .filter(|&i| rows.iter().any(|r| r.get(i).is_some_and(|c| !c.trim().is_empty())))
        .collect();
    let mut rows = rows.into_iter().map(|r| {
        keep.iter()
            .map(|&i| r.get(i).cloned().unwrap_or_default())
            .collect::<Vec<_>>()
    });

    let header = rows.next().unwrap_or_default();
    let columns: HashMap<Column, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(i, h)| column_for(h).map(|c| (c, i)))
        .collect();
    for (column, name) in [
        (Column::Team, "Team"),
        (Column::Played, "P"),
        (Column::Won, "W"),
        (Column::Drawn, "D"),
        (Column::Lost, "L"),
        (Column::For, "F"),
        (Column::Against, "A"),
    ] {
        if !columns.contains_key(&column) {
            return Err(ArchiveError::MissingColumn { column: name });
        }
    }

    let mut parsed = vec![];
    for row in rows {
        match parse_row(&row, &columns) {
            Ok(Some(r)) => parsed.push(r),
            Ok(None) => {}
            Err(e) => debug!(error = %e, ?row, "skipping standings row"),
        }
    }
    Ok(StandingsSnapshot::new(parsed))
}

fn parse_row(row: &[String], columns: &HashMap<Column, usize>) -> Result<Option<StandingsRow>> {
    let cell = |column: Column| {
        columns
            .get(&column)
            .and_then(|&i| row.get(i))
            .map(|c| c.trim().replace('\u{2212}', "-"))
            .unwrap_or_default()
    };
    let number = |column: Column| -> Result<u32> { Ok(cell(column).parse()?) };

    let team = clean_team_name(&cell(Column::Team));
    if team.is_empty() {
        return Ok(None);
    }
    let played = number(Column::Played)?;
    let won = number(Column::Won)?;
    let drawn = number(Column::Drawn)?;
    let lost = number(Column::Lost)?;
    let goals_for = number(Column::For)?;
    let goals_against = number(Column::Against)?;
    let goal_difference = match cell(Column::Difference) {
        gd if gd.is_empty() => goals_for as i32 - goals_against as i32,
        gd => gd.parse()?,
    };
    let points = match cell(Column::Points) {
        pts if pts.is_empty() => 3 * won + drawn,
        pts => pts.parse()?,
    };
    let rank = cell(Column::Rank).trim_end_matches('.').parse().ok();

    Ok(Some(StandingsRow {
        rank,
        team,
        played,
        won,
        drawn,
        lost,
        goals_for,
        goals_against,
        goal_difference,
        points,
    }))
}
