use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// The competition a game belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Competition {
    League,
    Cup,
}

/// A single blog post as handed over by the fetch/convert layer.
///
/// `content` is the converted markup (links as `[text](url)`, bold as `**`).
/// `html` is the raw post body when available; tables, spreadsheet embeds and
/// underlined section headings are only visible there.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub url: String,
    pub filepath: String,
    pub content: String,
    pub html: Option<String>,
    pub date: NaiveDate,
    pub season: String,
    pub title: String,
    pub week: Option<u32>,
    pub is_unneeded: bool,
}

impl Post {
    pub fn new(
        url: impl Into<String>,
        filepath: impl Into<String>,
        content: impl Into<String>,
        date: NaiveDate,
        season: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            filepath: filepath.into(),
            content: content.into(),
            html: None,
            date,
            season: season.into(),
            title: String::new(),
            week: None,
            is_unneeded: false,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Reference carried by every record extracted from this post.
    pub fn source(&self) -> PostRef {
        PostRef {
            url: self.url.clone(),
            filepath: self.filepath.clone(),
            title: self.title.clone(),
        }
    }
}

/// Back-reference from an extracted record to the post it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostRef {
    pub url: String,
    pub filepath: String,
    pub title: String,
}
