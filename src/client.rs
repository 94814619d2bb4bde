use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::error::{ArchiveError, Result};
use crate::extract::{resolve_sheet_url, rows_to_snapshot, PostExtraction, SnapshotSource};
use crate::model::StandingsSnapshot;

/// Loads standings published as embedded spreadsheets.
///
/// `SheetClient` wraps a [`reqwest::Client`] and turns a spreadsheet link or
/// embed into a [`StandingsSnapshot`] via the sheet's CSV export.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> hifl_history::Result<()> {
/// use chrono::NaiveDate;
/// use hifl_history::SheetClient;
///
/// let client = SheetClient::new();
/// let table = client
///     .load_snapshot(
///         "https://docs.google.com/spreadsheets/d/1AbC/pubhtml?gid=0",
///         NaiveDate::from_ymd_opt(2016, 3, 5).unwrap(),
///     )
///     .await?;
/// println!("{} teams", table.rows.len());
/// # Ok(())
/// # }
/// ```
pub struct SheetClient {
    http: reqwest::Client,
}

impl SheetClient {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Create a new client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure timeouts, proxies, headers, etc.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { http: client }
    }

    /// Fetch a spreadsheet's CSV export and parse it as a standings table
    /// dated `date`. Non-sheet URLs are fetched as given.
    #[instrument(skip(self))]
    pub async fn load_snapshot(&self, reference: &str, date: NaiveDate) -> Result<StandingsSnapshot> {
        let url = resolve_sheet_url(reference).unwrap_or_else(|| reference.to_string());
        let rows = self.export_rows(&url).await?;
        Ok(rows_to_snapshot(rows)?.dated(date, url))
    }

    /// Raw rows of a CSV export; the header is left in place.
    async fn export_rows(&self, url: &str) -> Result<Vec<Vec<String>>> {
        let response = self.http.get(url).send().await.map_err(|source| ArchiveError::Http {
            url: url.to_owned(),
            source,
        })?;
        let body = match response.status() {
            status if status.is_success() => {
                response.bytes().await.map_err(|source| ArchiveError::ResponseBody {
                    url: url.to_owned(),
                    source,
                })?
            }
            status => {
                return Err(ArchiveError::UnexpectedStatus {
                    url: url.to_owned(),
                    status,
                })
            }
        };
        debug!(url, bytes = body.len(), "downloaded spreadsheet export");
        csv_rows(&body)
    }

    /// The snapshot of an extracted post, loading it if the post only links a sheet.
    pub async fn snapshot_for(&self, extraction: &PostExtraction) -> Result<Option<StandingsSnapshot>> {
        match &extraction.snapshot {
            Some(SnapshotSource::Table(table)) => Ok(Some(table.clone())),
            Some(SnapshotSource::Sheet(url)) => self
                .load_snapshot(url, extraction.post.date)
                .await
                .map(Some),
            None => Ok(None),
        }
    }
}

impl Default for SheetClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a CSV export into a standings table. The header row is found the
/// same way as for embedded tables.
pub fn parse_csv_snapshot(body: &str) -> Result<StandingsSnapshot> {
    rows_to_snapshot(csv_rows(body.as_bytes())?)
}

fn csv_rows(body: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);
    reader
        .records()
        .map(|record| Ok(record?.iter().map(str::to_string).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;

    const EXPORT: &str = "\
,,,,,,,,,
Pos,Team,P,W,D,L,F,A,GD,Pts
1,Hanoi Drink Team,2,2,0,0,6,1,5,6
2,Roots,2,0,0,2,1,6,-5,0
";

    #[test]
    fn csv_export_parses_to_snapshot() {
        let snapshot = parse_csv_snapshot(EXPORT).unwrap();
        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.rows[0].team, "Hanoi Drink Team");
        assert_eq!(snapshot.rows[1].goal_difference, -5);
        assert_eq!(snapshot.total_played(), 4);
    }

    #[test]
    fn csv_rows_keep_quoted_commas_and_ragged_lines() {
        let rows = csv_rows(b"Team,P\n\"Hanoi, Drink Team\",3\nRoots\n").unwrap();
        assert_eq!(rows[1], vec!["Hanoi, Drink Team", "3"]);
        assert_eq!(rows[2], vec!["Roots"]);
    }

    #[tokio::test]
    async fn embedded_table_needs_no_request() {
        let date = NaiveDate::from_ymd_opt(2016, 3, 5).unwrap();
        let table = parse_csv_snapshot(EXPORT).unwrap().dated(date, "http://hifl.blogspot.com/t");
        let extraction = PostExtraction {
            post: Post::new("http://hifl.blogspot.com/t", "page1.html", "", date, "2015/16"),
            games: vec![],
            mismatches: vec![],
            snapshot: Some(SnapshotSource::Table(table.clone())),
        };
        let loaded = SheetClient::default().snapshot_for(&extraction).await.unwrap();
        assert_eq!(loaded, Some(table));
    }
}
