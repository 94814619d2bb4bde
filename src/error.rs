use ::scraper::error::SelectorErrorKind;
use std::num::ParseIntError;

/// All errors that can occur while extracting or reconciling the archive.
#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// Failed to parse an integer from post text or a table cell.
    #[error("failed to parse integer: {0}")]
    IntParse(#[from] ParseIntError),

    /// Failed to parse a date.
    #[error("failed to parse date: {0}")]
    DateParse(#[from] chrono::ParseError),

    /// An override table or spreadsheet export was not valid CSV.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// An override map was not valid YAML.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A standings table is missing a column every snapshot needs.
    #[error("standings table has no {column} column")]
    MissingColumn { column: &'static str },

    /// Team strings that match no canonical team and are not declared dropouts.
    #[error("season {season}: unassigned team strings {aliases:?}")]
    UnassignedAliases { season: String, aliases: Vec<String> },

    /// A post whose section layout cannot be split into cup and league text.
    #[error("unsupported post layout in {title:?}: {reason}")]
    UnsupportedLayout { title: String, reason: String },
}

impl<'a> From<SelectorErrorKind<'a>> for ArchiveError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        ArchiveError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
