use serde::Serialize;

/// A team name plus the shorter names obtained by dropping trailing words.
///
/// `Hanoi Drink Team` yields `["Hanoi Drink Team", "Hanoi Drink", "Hanoi"]`.
/// Variants are ordered longest first so that anchoring inside free text
/// prefers the most specific spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamIdentity {
    pub name: String,
    pub variants: Vec<String>,
}

impl TeamIdentity {
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        let words: Vec<&str> = name.split_whitespace().collect();
        let variants = (1..=words.len()).rev().map(|n| words[..n].join(" ")).collect();
        Self { name, variants }
    }

    /// Locate the longest variant occurring as a whole word in `haystack`.
    ///
    /// Returns the byte range of the occurrence.
    pub fn find_in(&self, haystack: &str) -> Option<(usize, usize)> {
        self.variants.iter().find_map(|variant| {
            haystack
                .match_indices(variant.as_str())
                .find(|(start, _)| is_word_bounded(haystack, *start, *start + variant.len()))
                .map(|(start, _)| (start, start + variant.len()))
        })
    }
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
