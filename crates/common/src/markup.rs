//! Helpers for the angle-bracket markup dialect used in message templates.
//!
//! The rendering layer deserializes markup itself; herald only ever needs to
//! *remove* it, for webhook embeds and for the plain-text typing effect.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static markup pattern")
}

static GRADIENT_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"</?gradient[^>]*>"));
static INTERACTION_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"</?(?:click|hover)[^>]*>"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"<[^>]+>"));

/// Strip all markup tags from `text`, leaving plain content.
///
/// Gradient and click/hover tags are removed first so that malformed
/// remainders still fall to the catch-all tag pattern.
#[must_use]
pub fn strip_tags(text: &str) -> String {
    let stripped = GRADIENT_RE.replace_all(text, "");
    let stripped = INTERACTION_RE.replace_all(&stripped, "");
    TAG_RE.replace_all(&stripped, "").into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn strips_color_tags() {
        assert_eq!(strip_tags("<red>hello</red> world"), "hello world");
    }

    #[test]
    fn strips_gradient_tags() {
        assert_eq!(
            strip_tags("<gradient:#FF0000:#00FF00>wow</gradient>"),
            "wow"
        );
    }

    #[test]
    fn strips_click_and_hover() {
        assert_eq!(
            strip_tags("<click:open_url:'https://example.com'>link</click>"),
            "link"
        );
        assert_eq!(strip_tags("<hover:show_text:'hi'>text</hover>"), "text");
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(strip_tags("no markup here"), "no markup here");
    }

    #[test]
    fn hex_color_tags() {
        assert_eq!(strip_tags("<#FF0000>red</#FF0000>"), "red");
    }
}
