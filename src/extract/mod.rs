//! Per-post extraction: text normalization, classification, result lines,
//! scorers and standings snapshots.

mod classify;
mod games;
mod normalize;
mod scorers;
mod standings;

pub use classify::{title, week_number, PostClassifier};
pub use games::{find_games_in_text, ScorePattern, SCORE_PATTERNS};
pub use normalize::{find_hyperlinks, normalize_text};
pub use scorers::{Attribution, ScorerAttributor, SCORER_TEAM_THRESHOLD};
pub use standings::{parse_snapshot, resolve_sheet_url, rows_to_snapshot, SnapshotSource};

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::config::ExtractConfig;
use crate::error::Result;
use crate::model::{Competition, GameRecord, Post, RawGame, ScorerMismatch};
use crate::similarity::PartialRatio;

/// Everything extracted from one post.
#[derive(Debug, Clone)]
pub struct PostExtraction {
    pub post: Post,
    pub games: Vec<GameRecord>,
    pub mismatches: Vec<ScorerMismatch>,
    pub snapshot: Option<SnapshotSource>,
}

/// Classify `post` and pull out its games, scorers and standings.
///
/// Unneeded posts come back classified but with no games or snapshot.
#[instrument(skip_all, fields(url = %post.url))]
pub fn extract_post(post: Post, config: &ExtractConfig) -> Result<PostExtraction> {
    let classifier = PostClassifier::new(config.clone());
    let (post, text) = classifier.classify_text(post);
    if post.is_unneeded {
        debug!(title = %post.title, "skipping unneeded post");
        return Ok(PostExtraction {
            post,
            games: vec![],
            mismatches: vec![],
            snapshot: None,
        });
    }

    let attributor = ScorerAttributor::new(PartialRatio);
    let mut games = vec![];
    let mut mismatches = vec![];
    for (competition, section) in classifier.split_cup_and_league(&post, &text)? {
        for raw in find_games_in_text(&section) {
            let Some(mut game) = to_record(&post, competition, raw)? else {
                continue;
            };
            mismatches.extend(attributor.attribute_game(&mut game));
            games.push(game);
        }
    }

    let snapshot = post.html.as_deref().and_then(|html| match parse_snapshot(html) {
        Ok(source) => source.map(|source| match source {
            SnapshotSource::Table(table) => {
                SnapshotSource::Table(table.dated(post.date, post.url.clone()))
            }
            sheet => sheet,
        }),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable standings table");
            None
        }
    });

    debug!(
        title = %post.title,
        games = games.len(),
        has_snapshot = snapshot.is_some(),
        "extracted post"
    );
    Ok(PostExtraction {
        post,
        games,
        mismatches,
        snapshot,
    })
}

/// Extract every post in parallel; results keep the input order.
pub fn extract_posts(posts: Vec<Post>, config: &ExtractConfig) -> Vec<Result<PostExtraction>> {
    posts
        .into_par_iter()
        .map(|post| extract_post(post, config))
        .collect()
}

fn to_record(post: &Post, competition: Competition, raw: RawGame) -> Result<Option<GameRecord>> {
    if raw.away_team.is_empty() {
        warn!(line = %raw.line, "result line has no away team");
        return Ok(None);
    }
    Ok(Some(GameRecord {
        source: post.source(),
        competition,
        home_team: raw.home_team,
        home_score: raw.home_score.parse()?,
        away_team: raw.away_team,
        away_score: raw.away_score.parse()?,
        scorer_text: Some(raw.trailing).filter(|t| !t.is_empty()),
        scorers: vec![],
        date: post.date,
        season: post.season.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(content: &str) -> Post {
        Post::new(
            "http://hifl.blogspot.com/2016/03/week-13.html",
            "data/webpages/page10.html",
            content,
            NaiveDate::from_ymd_opt(2016, 3, 5).unwrap(),
            "2015/16",
        )
    }

    #[test]
    fn league_post_yields_typed_games() {
        let content = "**[Week Thirteen Results](http://hifl.blogspot.com/2016/03/week-13.html)**\n\n\
                       Minsk 5-1 Drink. Goals: Minsk: Jo x 2, Frazier, Joey, Adam; Drink: ?\n\n\
                       Roots 3-0 Capitals (Goals: Roots: David x 2, Nico.)\n";
        let extraction = extract_post(post(content), &ExtractConfig::default()).unwrap();
        assert_eq!(extraction.post.title, "Week Thirteen Results");
        assert_eq!(extraction.post.week, Some(13));
        assert_eq!(extraction.games.len(), 2);

        let minsk = &extraction.games[0];
        assert_eq!(minsk.competition, Competition::League);
        assert_eq!((minsk.home_score, minsk.away_score), (5, 1));
        assert_eq!(minsk.source.title, "Week Thirteen Results");
        assert_eq!(minsk.scorers.len(), 4);

        let roots = &extraction.games[1];
        assert_eq!(roots.away_team, "Capitals");
        assert_eq!(roots.scorers.iter().map(|s| s.goals).sum::<u32>(), 3);
        assert!(extraction.mismatches.is_empty());
        assert!(extraction.snapshot.is_none());
    }

    #[test]
    fn unneeded_post_has_no_games() {
        let content = "Welcome to HIFL 2012/13\nLast season: Drink 4-1 Roots";
        let extraction = extract_post(post(content), &ExtractConfig::default()).unwrap();
        assert!(extraction.post.is_unneeded);
        assert!(extraction.games.is_empty());
    }

    #[test]
    fn embedded_table_is_dated_with_post() {
        let html = "<table><tr><th>Team</th><th>P</th><th>W</th><th>D</th><th>L</th><th>F</th><th>A</th></tr>\
                    <tr><td>Roots</td><td>1</td><td>1</td><td>0</td><td>0</td><td>3</td><td>0</td></tr></table>";
        let extraction =
            extract_post(post("Week 1\nRoots 3-0 Capitals").with_html(html), &ExtractConfig::default())
                .unwrap();
        let Some(SnapshotSource::Table(table)) = extraction.snapshot else {
            panic!("expected table snapshot");
        };
        assert_eq!(table.date, NaiveDate::from_ymd_opt(2016, 3, 5));
        assert_eq!(table.rows[0].points, 3);
    }

    #[test]
    fn non_standings_table_keeps_games() {
        let html = "<table><tr><th>Kick-off</th><th>Pitch</th></tr>\
                    <tr><td>14:00</td><td>2</td></tr></table>";
        let extraction =
            extract_post(post("Week 3\nDrink 4-1 Roots").with_html(html), &ExtractConfig::default())
                .unwrap();
        assert_eq!(extraction.games.len(), 1);
        assert_eq!(extraction.games[0].home_team, "Drink");
        assert!(extraction.snapshot.is_none());
    }

    #[test]
    fn parallel_extraction_keeps_order() {
        let posts = vec![post("Week 1\nRoots 3-0 Capitals"), post("Week 2\nDrink 1-1 Minsk")];
        let results = extract_posts(posts, &ExtractConfig::default());
        let homes: Vec<_> = results
            .into_iter()
            .map(|r| r.unwrap().games[0].home_team.clone())
            .collect();
        assert_eq!(homes, vec!["Roots", "Drink"]);
    }
}
