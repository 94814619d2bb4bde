//! Fuzzy string scoring used for alias resolution and scorer attribution.
//!
//! Scores are on a 0..=100 scale. Callers own their thresholds; see
//! [`crate::reconcile::ALIAS_THRESHOLD`] and [`crate::extract::SCORER_TEAM_THRESHOLD`].

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A pluggable similarity score between two strings.
pub trait Similarity {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Bigram overlap (Dice coefficient) of the two strings, via [`strsim`].
///
/// Word order matters little, so `fcbrothers` and `brothersfc` score 89.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ratio;

impl Similarity for Ratio {
    fn score(&self, a: &str, b: &str) -> u8 {
        percent(strsim::sorensen_dice(a, b))
    }
}

/// Best [`Ratio`] of the shorter string against every same-length window of
/// the longer one, so `drink` scores 100 against `hanoidrinkteam`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialRatio;

impl Similarity for PartialRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        let (short, long) = if a.chars().count() <= b.chars().count() { (a, b) } else { (b, a) };
        let width = short.chars().count();
        if width == 0 {
            return 0;
        }
        let bounds: Vec<usize> = long
            .char_indices()
            .map(|(i, _)| i)
            .chain([long.len()])
            .collect();
        let mut best = 0;
        for start in 0..bounds.len() - width {
            best = best.max(Ratio.score(short, &long[bounds[start]..bounds[start + width]]));
            if best == 100 {
                break;
            }
        }
        best
    }
}

/// Matching key for team strings: lower-cased, diacritics stripped, spaces,
/// hyphens and colons removed.
pub fn team_key(s: &str) -> String {
    s.to_lowercase()
        .replace([':', '-', ' '], "")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

fn percent(similarity: f64) -> u8 {
    (similarity * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_counts_shared_bigrams() {
        assert_eq!(Ratio.score("fcbrothers", "brothersfc"), 89);
        assert_eq!(Ratio.score("roots", "roots"), 100);
        assert_eq!(Ratio.score("abc", "xyz"), 0);
    }

    #[test]
    fn partial_ratio_finds_substring() {
        assert_eq!(PartialRatio.score("drink", "hanoidrinkteam"), 100);
        assert_eq!(PartialRatio.score("hanoidrinkteam", "drink"), 100);
        assert!(PartialRatio.score("capitals", "hanoidrinkteam") < 80);
    }

    #[test]
    fn partial_ratio_windows_respect_multibyte_chars() {
        assert_eq!(PartialRatio.score("thông", "fcthôngnhat"), 100);
        assert_eq!(PartialRatio.score("fcbrothers", "brothersfc"), 89);
    }

    #[test]
    fn partial_ratio_of_empty_is_zero() {
        assert_eq!(PartialRatio.score("", "roots"), 0);
    }

    #[test]
    fn team_key_strips_diacritics_and_separators() {
        assert_eq!(team_key("FC Thông Nhât"), "fcthongnhat");
        assert_eq!(team_key("X-Men"), "xmen");
        assert_eq!(team_key("Brother:"), "brother");
    }
}
