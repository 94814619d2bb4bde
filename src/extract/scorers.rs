use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::model::{GameRecord, ScorerEntry, ScorerMismatch, Side, TeamIdentity};
use crate::similarity::{team_key, Similarity};

/// Minimum score for a scorer-list label to count as one of the two teams.
pub const SCORER_TEAM_THRESHOLD: u8 = 90;

static GOALS_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*?\b[Gg]oals\b[ \t]*[:\-–]?[ \t]*").expect("valid goals prefix regex")
});
static MULTI_GOAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)\s+[xX]\s*(?P<n>\d+)$").expect("valid multi goal regex")
});
static GOAL_TIMES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^(\[]+?)\s*[(\[](?P<times>[^)\]]*)[)\]]$").expect("valid goal times regex")
});
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid digits regex"));

/// Known phrasings of a scorer list, tried in order. `t1`/`s1` and
/// `t2`/`s2` are label/list pairs; a pattern without `t1` has no labels.
static SCORER_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "semicolon_pair",
            r"^(?P<t1>[^:;,]+?)\s*:\s*(?P<s1>[^;]*?)\s*;\s*(?P<t2>[^:;,]+?)\s*:\s*(?P<s2>.*?)$",
        ),
        (
            "period_pair",
            r"^(?P<t1>[^:;,.]+?)\s*:\s*(?P<s1>[^.;]*?)\.\s+(?P<t2>[^:;,.]+?)\s*:\s*(?P<s2>.*?)$",
        ),
        (
            "comma_pair",
            r"^(?P<t1>[^:;,]+?)\s*:\s*(?P<s1>.*?)\s*,\s*(?P<t2>[^:;,]+?)\s*:\s*(?P<s2>.*?)$",
        ),
        ("single", r"^(?P<t1>[^:;,]+?)\s*:\s*(?P<s1>.*?)$"),
        ("unlabelled", r"^(?P<s1>.+?)$"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid scorer pattern")))
    .collect()
});

/// One side's scorer list as written, before token parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SideText {
    side: Option<Side>,
    list: String,
}

/// Result of attributing a scorer string to a game's two teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub scorers: Vec<ScorerEntry>,
    pub home_text: Option<String>,
    pub away_text: Option<String>,
}

impl Attribution {
    /// Compare attributed goals with the recorded score per side.
    ///
    /// A side whose list is the unknown marker `?` is not checked. A side
    /// with no list at all is only checked when the other side was labelled.
    pub fn mismatches(&self, game: &GameRecord) -> Vec<ScorerMismatch> {
        let labelled = self.home_text.is_some() || self.away_text.is_some();
        [
            (Side::Home, &game.home_team, game.home_score, &self.home_text),
            (Side::Away, &game.away_team, game.away_score, &self.away_text),
        ]
        .into_iter()
        .filter_map(|(side, team, recorded, text)| {
            match text {
                Some(text) if is_unknown_marker(text) => return None,
                None if !labelled => return None,
                _ => {}
            }
            let attributed: u32 = self
                .scorers
                .iter()
                .filter(|s| s.team.as_deref() == Some(team.as_str()))
                .map(|s| s.goals)
                .sum();
            (attributed != recorded).then(|| ScorerMismatch {
                home_team: game.home_team.clone(),
                away_team: game.away_team.clone(),
                date: game.date,
                side,
                recorded,
                attributed,
            })
        })
        .collect()
    }
}

/// Assigns scorer lists to the home or away team.
#[derive(Debug, Clone, Default)]
pub struct ScorerAttributor<S> {
    similarity: S,
}

impl<S: Similarity> ScorerAttributor<S> {
    pub fn new(similarity: S) -> Self {
        Self { similarity }
    }

    /// Attribute `text` to `home`/`away`. `None` when the text names no goals.
    pub fn attribute(&self, text: Option<&str>, home: &str, away: &str) -> Option<Attribution> {
        let text = text.filter(|t| t.contains("Goals") || t.contains("goals"))?;
        let body = GOALS_PREFIX_RE.replace(text.trim(), "");
        let body = body.trim();

        let (pattern, sides) = self.split_sides(body, home, away);
        debug!(pattern, sides = sides.len(), "matched scorer phrasing");

        let mut attribution = Attribution {
            scorers: vec![],
            home_text: None,
            away_text: None,
        };
        for side_text in sides {
            let team = match side_text.side {
                Some(Side::Home) => {
                    attribution.home_text = Some(side_text.list.clone());
                    Some(home.to_string())
                }
                Some(Side::Away) => {
                    attribution.away_text = Some(side_text.list.clone());
                    Some(away.to_string())
                }
                None => None,
            };
            attribution.scorers.extend(
                split_scorers(&side_text.list)
                    .into_iter()
                    .filter_map(|token| parse_scorer(&token))
                    .map(|(player, goals)| ScorerEntry {
                        player,
                        goals,
                        team: team.clone(),
                    }),
            );
        }
        Some(attribution)
    }

    /// Attribute a game's own scorer text and log any goal-count mismatch.
    pub fn attribute_game(&self, game: &mut GameRecord) -> Vec<ScorerMismatch> {
        let Some(attribution) =
            self.attribute(game.scorer_text.as_deref(), &game.home_team, &game.away_team)
        else {
            return vec![];
        };
        let mismatches = attribution.mismatches(game);
        for m in &mismatches {
            warn!(
                home = %m.home_team,
                away = %m.away_team,
                side = %m.side,
                recorded = m.recorded,
                attributed = m.attributed,
                "scorer goals do not match score"
            );
        }
        game.scorers = attribution.scorers;
        mismatches
    }

    fn split_sides(&self, body: &str, home: &str, away: &str) -> (&'static str, Vec<SideText>) {
        for (name, regex) in SCORER_PATTERNS.iter() {
            let Some(caps) = regex.captures(body) else {
                continue;
            };
            let mut sides = vec![];
            for (label, list) in [("t1", "s1"), ("t2", "s2")] {
                let Some(list) = caps.name(list) else {
                    continue;
                };
                let side = caps.name(label).and_then(|l| self.resolve_label(l.as_str(), home, away));
                sides.push(SideText {
                    side,
                    list: list.as_str().trim().to_string(),
                });
            }
            return (*name, anchor_split(sides, home, away));
        }
        ("none", vec![])
    }

    fn resolve_label(&self, label: &str, home: &str, away: &str) -> Option<Side> {
        let label = team_key(label);
        let home_score = self.similarity.score(&label, &team_key(home));
        let away_score = self.similarity.score(&label, &team_key(away));
        let (side, best) = match home_score.cmp(&away_score) {
            std::cmp::Ordering::Greater => (Side::Home, home_score),
            std::cmp::Ordering::Less => (Side::Away, away_score),
            std::cmp::Ordering::Equal => return None,
        };
        (best >= SCORER_TEAM_THRESHOLD).then_some(side)
    }
}

/// When only one side is labelled, the other team's name may still appear
/// inside its list without a colon ("Renato, Roots Mai"); split there.
fn anchor_split(sides: Vec<SideText>, home: &str, away: &str) -> Vec<SideText> {
    if sides.len() != 1 {
        return sides;
    }
    let Some(side) = sides[0].side else {
        return sides;
    };
    let (other_side, other_team) = match side {
        Side::Home => (Side::Away, away),
        Side::Away => (Side::Home, home),
    };
    let list = &sides[0].list;
    let Some((start, end)) = TeamIdentity::new(other_team).find_in(list) else {
        return sides;
    };
    let own = list[..start].trim().to_string();
    let other = list[end..]
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-'))
        .trim()
        .to_string();
    vec![
        SideText {
            side: Some(side),
            list: own,
        },
        SideText {
            side: Some(other_side),
            list: other,
        },
    ]
}

/// Split on commas that are not inside parentheses or brackets.
fn split_scorers(list: &str) -> Vec<String> {
    let mut tokens = vec![];
    let mut depth = 0usize;
    let mut current = String::new();
    for c in list.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                tokens.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    tokens.push(current);
    tokens
}

fn trim_token(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '.' | ';'))
}

/// Name and goal count from one scorer token, or `None` for placeholders.
fn parse_scorer(token: &str) -> Option<(String, u32)> {
    let token = trim_token(token);
    if !token.chars().any(char::is_alphabetic) {
        return None;
    }
    let (name, goals) = if let Some(c) = MULTI_GOAL_RE.captures(token) {
        (c["name"].to_string(), c["n"].parse().ok()?)
    } else if let Some(c) = GOAL_TIMES_RE.captures(token) {
        let times = DIGITS_RE.find_iter(&c["times"]).count() as u32;
        (c["name"].to_string(), times.max(1))
    } else {
        (token.to_string(), 1)
    };
    let name = trim_token(&name).to_string();
    name.chars().any(char::is_alphabetic).then_some((name, goals))
}

fn is_unknown_marker(list: &str) -> bool {
    trim_token(list) == "?"
}
