use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::model::RawGame;

/// Numbering, list marker or a team name that may contain digits.
const HOME: &str = r"^\s*(?P<home>[^\n]*?\p{L}[^\n]*?)[ \t]*";
/// Away team and trailing text, split apart by [`split_away`]. Must open with
/// a letter or a delimiter so that dates like `12-10-2014` do not match.
const TAIL: &str = r"[ \t]*(?P<tail>(?:\p{L}|[.,:;(\[–—])[^\n]*)?$";

/// One entry of the score-line cascade.
pub struct ScorePattern {
    pub name: &'static str,
    regex: Regex,
}

impl ScorePattern {
    fn new(name: &'static str, score: &str) -> Self {
        let regex = Regex::new(&format!("{HOME}{score}{TAIL}")).expect("valid score pattern");
        Self { name, regex }
    }

    pub fn captures<'t>(&self, line: &'t str) -> Option<Captures<'t>> {
        self.regex.captures(line)
    }
}

/// Score separators in priority order, most specific first.
pub static SCORE_PATTERNS: LazyLock<Vec<ScorePattern>> = LazyLock::new(|| {
    vec![
        ScorePattern::new(
            "aggregate",
            r"(?P<hs>\d{1,2})\s*[-–—]\s*(?P<as>\d{1,2})\s*\((?i:agg)[^)]*\)",
        ),
        ScorePattern::new("spaced_dash", r"(?P<hs>\d{1,2})\s+[-–—]\s+(?P<as>\d{1,2})"),
        ScorePattern::new("tight_dash", r"(?P<hs>\d{1,2})[-–—](?P<as>\d{1,2})"),
        ScorePattern::new("loose_dash", r"(?P<hs>\d{1,2})\s*[-–—]\s*(?P<as>\d{1,2})"),
        ScorePattern::new("double_space", r"(?P<hs>\d{1,2})[ \t]{2,}(?P<as>\d{1,2})"),
    ]
});

static AGGREGATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(\s*agg[^)]*\)").expect("valid aggregate regex"));
static HOME_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d{1,2}\s*[.)]\s*|[-*•]\s*|(?:week\s+)?results?\s*[-–:]\s*)+")
        .expect("valid home prefix regex")
});

/// Home-team fields that show the line was not a result.
const FALSE_POSITIVE_MARKERS: &[&str] = &["Match Day", "Match abandoned", "Agg", "With it"];

/// Recurring transcription gaps: (home team, away team to assume when blank).
const KNOWN_AWAY_GAPS: &[(&str, &str)] = &[("FPT", "Red Star")];

/// Scan a block of text for result lines.
///
/// Patterns run in priority order; a line claimed by one pattern is not
/// offered to later ones. Results come back in line order.
pub fn find_games_in_text(text: &str) -> Vec<RawGame> {
    let lines: Vec<&str> = text.lines().collect();
    let mut claimed = vec![false; lines.len()];
    let mut found = vec![];

    for pattern in SCORE_PATTERNS.iter() {
        for (idx, line) in lines.iter().enumerate() {
            if claimed[idx] {
                continue;
            }
            let Some(caps) = pattern.captures(line) else {
                continue;
            };
            claimed[idx] = true;
            match build_game(line, &caps) {
                Some(game) => found.push((idx, game)),
                None => debug!(pattern = pattern.name, line, "discarded false positive"),
            }
        }
    }

    found.sort_by_key(|(idx, _)| *idx);
    found.into_iter().map(|(_, game)| game).collect()
}

fn build_game(line: &str, caps: &Captures) -> Option<RawGame> {
    let group = |name| caps.name(name).map(|m| m.as_str()).unwrap_or_default();

    let home_team = clean_home(group("home"));
    if home_team.is_empty() || is_false_positive(&home_team) {
        return None;
    }
    let (away, rest) = split_away(group("tail"));
    let mut away_team = away.to_string();
    if away_team.is_empty() {
        if let Some((_, default)) = KNOWN_AWAY_GAPS.iter().find(|(home, _)| *home == home_team) {
            away_team = default.to_string();
        }
    }

    Some(RawGame {
        line: strip_aggregate(line).trim().to_string(),
        home_team,
        home_score: group("hs").to_string(),
        away_score: group("as").to_string(),
        away_team,
        trailing: clean_trailing(rest),
    })
}

/// Split the text after the score into the away team and the rest.
///
/// The name runs until a bracket, comma, colon, semicolon or long dash. A
/// period only ends it at the end of the line or before a scorer list, so
/// `St. Pauli` and `A.F.C. Hanoi` stay whole.
fn split_away(tail: &str) -> (&str, &str) {
    let end = tail
        .char_indices()
        .find(|&(i, c)| match c {
            '(' | '[' | ',' | ':' | ';' | '–' | '—' => true,
            '.' => ends_name(&tail[i + 1..]),
            _ => false,
        })
        .map_or(tail.len(), |(i, _)| i);
    (tail[..end].trim(), &tail[end..])
}

fn ends_name(after: &str) -> bool {
    let after = after.trim_start().to_lowercase();
    after.is_empty() || after.starts_with("goal") || after.starts_with("scorer")
}

fn clean_home(raw: &str) -> String {
    HOME_PREFIX_RE
        .replace(raw.trim(), "")
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ':' | ',' | '-' | '–'))
        .trim()
        .to_string()
}

fn is_false_positive(home: &str) -> bool {
    FALSE_POSITIVE_MARKERS.iter().any(|m| home.contains(m))
}

fn strip_aggregate(s: &str) -> String {
    AGGREGATE_RE.replace_all(s, "").into_owned()
}

fn clean_trailing(raw: &str) -> String {
    let rest = strip_aggregate(raw);
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ':' | ';' | '–' | '—'));
    let rest = rest.trim();
    let unwrapped = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .or_else(|| rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')))
        .unwrap_or(rest);
    unwrapped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuples(text: &str) -> Vec<(String, String, String, String, String, String)> {
        find_games_in_text(text)
            .iter()
            .map(|g| {
                let (a, b, c, d, e, f) = g.as_tuple();
                (a.into(), b.into(), c.into(), d.into(), e.into(), f.into())
            })
            .collect()
    }

    fn t(a: &str, b: &str, c: &str, d: &str, e: &str, f: &str) -> (String, String, String, String, String, String) {
        (a.into(), b.into(), c.into(), d.into(), e.into(), f.into())
    }

    #[test]
    fn score_without_spaces() {
        assert_eq!(
            tuples("Drink 4-1 Roots"),
            vec![t("Drink 4-1 Roots", "Drink", "4", "1", "Roots", "")]
        );
    }

    #[test]
    fn scorers_in_brackets_become_trailing_text() {
        let line = "Drink 4-1 Roots (Ben 40' Son 45' Thang 55' Thomas 75'; Baptiste 5')";
        assert_eq!(
            tuples(line),
            vec![t(
                line,
                "Drink",
                "4",
                "1",
                "Roots",
                "Ben 40' Son 45' Thang 55' Thomas 75'; Baptiste 5'"
            )]
        );
    }

    #[test]
    fn separator_styles() {
        let text = "1. Hanoi Capitals 2 – 2 FC Thong Nhat\n\
                    2) Minsk  3  0  X-Men.\n\
                    Brothers 10 -0 Red Star. Goals: Brothers: Tom x 10";
        assert_eq!(
            tuples(text),
            vec![
                t("1. Hanoi Capitals 2 – 2 FC Thong Nhat", "Hanoi Capitals", "2", "2", "FC Thong Nhat", ""),
                t("2) Minsk  3  0  X-Men.", "Minsk", "3", "0", "X-Men", ""),
                t(
                    "Brothers 10 -0 Red Star. Goals: Brothers: Tom x 10",
                    "Brothers",
                    "10",
                    "0",
                    "Red Star",
                    "Goals: Brothers: Tom x 10"
                ),
            ]
        );
    }

    #[test]
    fn aggregate_scores_are_stripped() {
        assert_eq!(
            tuples("Roots 2-1 (agg 3-3) Drink\nMinsk 1-0 Capitals (Agg. 2-1)"),
            vec![
                t("Roots 2-1 Drink", "Roots", "2", "1", "Drink", ""),
                t("Minsk 1-0 Capitals", "Minsk", "1", "0", "Capitals", ""),
            ]
        );
    }

    #[test]
    fn false_positives_are_discarded() {
        let text = "Match Day 3: Drink 4-1 Roots\nAgg 3-2 to Minsk\nSaturday 12-10-2014";
        assert!(find_games_in_text(text).is_empty());
    }

    #[test]
    fn fpt_without_opponent_defaults_to_red_star() {
        assert_eq!(tuples("FPT 3-0"), vec![t("FPT 3-0", "FPT", "3", "0", "Red Star", "")]);
    }

    #[test]
    fn results_prefix_is_trimmed() {
        assert_eq!(
            tuples("Week Result - Roots 1-1 Capitals"),
            vec![t("Week Result - Roots 1-1 Capitals", "Roots", "1", "1", "Capitals", "")]
        );
    }

    #[test]
    fn away_names_with_digits_and_periods() {
        assert_eq!(
            tuples("Drink 4-1 Hanoi 2000"),
            vec![t("Drink 4-1 Hanoi 2000", "Drink", "4", "1", "Hanoi 2000", "")]
        );
        assert_eq!(
            tuples("Drink 4-1 St. Pauli"),
            vec![t("Drink 4-1 St. Pauli", "Drink", "4", "1", "St. Pauli", "")]
        );
        assert_eq!(
            tuples("Drink 4-1 A.F.C. Hanoi. Goals: Drink: Tom x 4"),
            vec![t(
                "Drink 4-1 A.F.C. Hanoi. Goals: Drink: Tom x 4",
                "Drink",
                "4",
                "1",
                "A.F.C. Hanoi",
                "Goals: Drink: Tom x 4"
            )]
        );
    }

    #[test]
    fn unmatched_lines_produce_nothing() {
        assert!(find_games_in_text("Great weekend of football\nRoots v Drink postponed").is_empty());
    }

    #[test]
    fn earlier_pattern_claims_line() {
        let caps = SCORE_PATTERNS[1].captures("Roots 2 - 1 Drink").unwrap();
        assert_eq!(&caps["hs"], "2");
        assert!(SCORE_PATTERNS[2].captures("Roots 2 - 1 Drink").is_none());
        assert_eq!(find_games_in_text("Roots 2 - 1 Drink").len(), 1);
    }
}
