//! User-visible message catalog (`messages.yaml`).
//!
//! Messages are addressed by dotted path (`general.no-permission`). A lookup
//! miss yields a visible placeholder rather than an error, matching the
//! degrade-to-default policy of the rest of the config layer.

use serde_yaml::Value;

#[derive(Debug, Clone, Default)]
pub struct Messages {
    root: Value,
}

impl Messages {
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Raw lookup by dotted path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<String> {
        let mut current = &self.root;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        match current {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Chat prefix prepended to every command response.
    #[must_use]
    pub fn prefix(&self) -> String {
        self.get("prefix").unwrap_or_default()
    }

    /// Prefixed message text; a missing path is called out in-line so broken
    /// message files are visible to operators instead of silently blank.
    #[must_use]
    pub fn text(&self, path: &str) -> String {
        let body = self
            .get(path)
            .unwrap_or_else(|| format!("<red>Message not found: {path}</red>"));
        format!("{}{body}", self.prefix())
    }

    /// `text(path)` with `{key}` placeholders substituted.
    #[must_use]
    pub fn text_with(&self, path: &str, placeholders: &[(&str, &str)]) -> String {
        let mut body = self.text(path);
        for (key, value) in placeholders {
            body = body.replace(&format!("{{{key}}}"), value);
        }
        body
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> Messages {
        let root: Value = serde_yaml::from_str(
            r"
prefix: '<gray>[herald]</gray> '
general:
  no-permission: '<red>You do not have permission.</red>'
announcements:
  enabled: '<green>Announcement {id} enabled on {server}.</green>'
",
        )
        .unwrap();
        Messages::new(root)
    }

    #[test]
    fn dotted_lookup() {
        let m = sample();
        assert_eq!(
            m.get("general.no-permission").unwrap(),
            "<red>You do not have permission.</red>"
        );
        assert!(m.get("general.missing").is_none());
    }

    #[test]
    fn text_prepends_prefix() {
        let m = sample();
        assert!(m.text("general.no-permission").starts_with("<gray>[herald]"));
    }

    #[test]
    fn missing_path_is_visible() {
        let m = sample();
        assert!(m.text("nope.nothing").contains("Message not found: nope.nothing"));
    }

    #[test]
    fn placeholders_substituted() {
        let m = sample();
        let out = m.text_with("announcements.enabled", &[("id", "motd"), ("server", "lobby")]);
        assert!(out.contains("Announcement motd enabled on lobby."));
    }
}
