use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::config::ExtractConfig;
use crate::error::{ArchiveError, Result};
use crate::model::{Competition, Post};

use super::normalize::normalize_text;

static LEAGUE_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bday\s*\d+").expect("valid league heading regex"));
static WEEK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bweek\s+(\d{1,2}\b|[a-z]+(?:[\s-]+[a-z]+)?)").expect("valid week regex")
});

const UNITS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];
const TENS: &[(&str, u32)] = &[("twenty", 20), ("thirty", 30)];

/// Derives titles and competitions for posts.
#[derive(Debug, Clone, Default)]
pub struct PostClassifier {
    config: ExtractConfig,
}

impl PostClassifier {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Fill in the derived fields of `post`.
    pub fn classify(&self, post: Post) -> Post {
        self.classify_text(post).0
    }

    /// Like [`classify`](Self::classify), also handing back the normalized text.
    pub fn classify_text(&self, mut post: Post) -> (Post, String) {
        let text = normalize_text(&post.content);
        post.title = title(&text);
        post.week = week_number(&post.title).or_else(|| week_number(&text));
        post.is_unneeded = self.is_unneeded(&post.title);
        (post, text)
    }

    pub fn is_unneeded(&self, title: &str) -> bool {
        self.config.unneeded_titles.iter().any(|t| t == title)
    }

    /// Split normalized post text into per-competition sections.
    ///
    /// Posts whose title does not mention a cup are league-only. Otherwise the
    /// underlined `Day N` and cup headings in the post HTML delimit the two
    /// sections; if either is absent the whole post is cup text.
    pub fn split_cup_and_league(
        &self,
        post: &Post,
        text: &str,
    ) -> Result<Vec<(Competition, String)>> {
        if !post.title.to_lowercase().contains("cup") {
            return Ok(vec![(Competition::League, text.to_string())]);
        }

        let headings = match &post.html {
            Some(html) => underlined_headings(html)?,
            None => vec![],
        };
        let (cup, league): (Vec<_>, Vec<_>) = headings
            .into_iter()
            .filter(|h| h.to_lowercase().contains("cup") || LEAGUE_HEADING_RE.is_match(h))
            .partition(|h| h.to_lowercase().contains("cup"));

        if cup.len() > 1 || league.len() > 1 {
            return Err(ArchiveError::UnsupportedLayout {
                title: post.title.clone(),
                reason: format!(
                    "{} cup and {} league headings, expected at most one of each",
                    cup.len(),
                    league.len()
                ),
            });
        }
        let (Some(cup_heading), Some(league_heading)) = (cup.first(), league.first()) else {
            debug!(title = %post.title, "no cup/league heading pair, treating as cup-only");
            return Ok(vec![(Competition::Cup, text.to_string())]);
        };

        let lines: Vec<&str> = text.lines().collect();
        // Headings sit below the title line, which often repeats them.
        let body_start = lines
            .iter()
            .position(|line| line.chars().any(char::is_alphabetic))
            .map_or(0, |i| i + 1);
        let find = |heading: &str| {
            (body_start..lines.len())
                .find(|&i| collapse_ws(lines[i]) == heading)
                .ok_or_else(|| ArchiveError::UnsupportedLayout {
                    title: post.title.clone(),
                    reason: format!("heading {heading:?} not found in post text"),
                })
        };
        let league_at = find(league_heading)?;
        let cup_at = find(cup_heading)?;

        let section = |from: usize, to: usize| {
            lines
                .get(from + 1..to)
                .map(|s| s.join("\n"))
                .unwrap_or_default()
        };
        let (league_text, cup_text) = if league_at < cup_at {
            (section(league_at, cup_at), section(cup_at, lines.len()))
        } else {
            (section(league_at, lines.len()), section(cup_at, league_at))
        };
        Ok(vec![
            (Competition::League, league_text),
            (Competition::Cup, cup_text),
        ])
    }
}

/// First line of normalized text that contains a letter.
pub fn title(text: &str) -> String {
    text.lines()
        .find(|line| line.chars().any(char::is_alphabetic))
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}

/// Week number from `Week 13` or `Week Thirteen` style phrases.
pub fn week_number(text: &str) -> Option<u32> {
    WEEK_RE.captures_iter(text).find_map(|c| {
        let raw = &c[1];
        raw.trim().parse().ok().or_else(|| words_to_number(raw))
    })
}

fn words_to_number(words: &str) -> Option<u32> {
    let mut total = None;
    for word in words.split(|c: char| c.is_whitespace() || c == '-') {
        let word = word.to_lowercase();
        if let Some((_, tens)) = TENS.iter().find(|(w, _)| *w == word) {
            if total.is_some() {
                break;
            }
            total = Some(*tens);
        } else if let Some(unit) = UNITS.iter().position(|w| *w == word) {
            total = Some(total.unwrap_or(0) + unit as u32);
            break;
        } else {
            break;
        }
    }
    total
}

fn underlined_headings(html: &str) -> Result<Vec<String>> {
    let fragment = Html::parse_fragment(html);
    let selector = Selector::parse("u")?;
    Ok(fragment
        .select(&selector)
        .map(|u| collapse_ws(&u.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect())
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
