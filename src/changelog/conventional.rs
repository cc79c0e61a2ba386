use std::sync::LazyLock;

use regex::Regex;

/// Built-in commit types in the order their sections are emitted
pub const CATEGORIES: &[(&str, &str)] = &[
    ("feat", "Features"),
    ("fix", "Bug Fixes"),
    ("perf", "Performance"),
    ("refactor", "Refactoring"),
    ("docs", "Documentation"),
    ("test", "Tests"),
    ("build", "Build System"),
    ("ci", "Continuous Integration"),
    ("chore", "Chores"),
    ("revert", "Reverts"),
];

pub const OTHER: &str = "Other";

static SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^()]*)\))?(?P<bang>!)?:\s*(?P<desc>.*)$").expect("static regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    /// Lowercased type, or `None` for subjects outside the grammar
    pub kind: Option<String>,
    pub scope: Option<String>,
    pub description: String,
    pub breaking: bool,
}

/// Parse `type(scope)!: description`
pub fn parse_conventional(subject: &str) -> ConventionalCommit {
    let subject = subject.trim();

    let Some(caps) = SUBJECT.captures(subject) else {
        return ConventionalCommit {
            kind: None,
            scope: None,
            breaking: has_breaking_token(subject),
            description: subject.to_string(),
        };
    };

    let description = caps["desc"].trim().to_string();
    ConventionalCommit {
        kind: Some(caps["type"].to_lowercase()),
        scope: caps
            .name("scope")
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty()),
        breaking: caps.name("bang").is_some() || has_breaking_token(&description),
        description,
    }
}

fn has_breaking_token(text: &str) -> bool {
    text.contains("BREAKING CHANGE") || text.contains("BREAKING-CHANGE")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_type() {
        let c = parse_conventional("feat: add CSV export");
        assert_eq!(c.kind.as_deref(), Some("feat"));
        assert_eq!(c.scope, None);
        assert_eq!(c.description, "add CSV export");
        assert!(!c.breaking);
    }

    #[test]
    fn test_parse_scope_and_bang() {
        let c = parse_conventional("Fix(api)!: drop v1 endpoints");
        assert_eq!(c.kind.as_deref(), Some("fix"));
        assert_eq!(c.scope.as_deref(), Some("api"));
        assert!(c.breaking);
    }

    #[test]
    fn test_breaking_token_in_description() {
        let c = parse_conventional("refactor(auth): BREAKING CHANGE tokens rotate daily");
        assert!(c.breaking);
    }

    #[test]
    fn test_non_conventional() {
        let c = parse_conventional("Update readme");
        assert_eq!(c.kind, None);
        assert_eq!(c.description, "Update readme");
        let c = parse_conventional("feat add thing");
        assert_eq!(c.kind, None);
    }
}
