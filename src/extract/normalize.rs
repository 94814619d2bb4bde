use std::sync::LazyLock;

use regex::Regex;

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\[\]]*)\]\([^()]*\)").expect("valid image regex"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]\(([^()]*)\)").expect("valid link regex"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").expect("valid heading regex"));

/// Every innermost `[text](target)` in `markup`, in order of appearance.
pub fn find_hyperlinks(markup: &str) -> Vec<(String, String)> {
    LINK_RE
        .captures_iter(markup)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect()
}

/// Turn converted post markup into plain text lines.
///
/// Links and images collapse to their visible text (nested ones from the
/// inside out), bold and heading markers go, and blank or purely decorative
/// lines are dropped. Runs of spaces inside a line are kept because a double
/// space can separate two scores.
pub fn normalize_text(markup: &str) -> String {
    let mut text = markup.replace('\u{a0}', " ").replace(['\u{200b}', '\u{feff}'], "");
    loop {
        let collapsed = IMAGE_RE.replace_all(&text, "${1}");
        let collapsed = LINK_RE.replace_all(&collapsed, "${1}").into_owned();
        if collapsed == text {
            break;
        }
        text = collapsed;
    }
    let text = text.replace("**", "");
    let text = HEADING_RE.replace_all(&text, "");

    text.lines()
        .map(str::trim_end)
        .filter(|line| !is_decorative(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_decorative(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || matches!(c, '|' | '-' | '=' | '_' | '*' | '~' | '+'))
}
