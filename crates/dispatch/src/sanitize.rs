//! Placeholder substitution and input sanitization.

/// Characters stripped from untrusted placeholder values before they reach
/// a markup string.
const BLOCKED: &[char] = &['<', '>', '{', '}', '[', ']', '=', ';'];

#[must_use]
pub fn sanitize(input: &str) -> String {
    input.chars().filter(|c| !BLOCKED.contains(c)).collect()
}

/// Replace every `{key}` occurrence. Values are sanitized first when
/// `sanitize_values` is set; placeholder keys never are.
#[must_use]
pub fn apply_placeholders(
    message: &str,
    placeholders: &[(&str, &str)],
    sanitize_values: bool,
) -> String {
    let mut out = message.to_owned();
    for (key, value) in placeholders {
        let value = if sanitize_values {
            sanitize(value)
        } else {
            (*value).to_owned()
        };
        out = out.replace(&format!("{{{key}}}"), &value);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_markup_and_structural_chars() {
        assert_eq!(sanitize("<script>alert</script>"), "scriptalert/script");
        assert_eq!(sanitize("a{b}[c]=d;e"), "abcde");
        assert_eq!(sanitize("plain text"), "plain text");
    }

    #[test]
    fn placeholder_values_cannot_inject_tags() {
        let out = apply_placeholders(
            "<red>Hello {name}</red>",
            &[("name", "<bold>evil</bold>")],
            true,
        );
        assert_eq!(out, "<red>Hello boldevil/bold</red>");
    }

    #[test]
    fn sanitization_can_be_disabled() {
        let out = apply_placeholders("hi {name}", &[("name", "<wave>")], false);
        assert_eq!(out, "hi <wave>");
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        assert_eq!(apply_placeholders("{x} {y}", &[("x", "1")], true), "1 {y}");
    }
}
