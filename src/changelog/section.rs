use chrono::NaiveDate;
use regex::Regex;

use super::conventional::{parse_conventional, ConventionalCommit, CATEGORIES, OTHER};
use crate::config::LinkStyle;
use crate::git::commit_url;
use crate::models::CommitInfo;
use crate::version::Bump;

#[derive(Debug, Clone)]
pub struct Entry {
    pub hash: String,
    pub short_hash: String,
    pub subject: String,
    pub commit: ConventionalCommit,
}

impl Entry {
    pub fn from_commit(commit: &CommitInfo) -> Self {
        Self {
            hash: commit.id.to_string(),
            short_hash: commit.short_id.clone(),
            subject: commit.subject.clone(),
            commit: parse_conventional(&commit.subject),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionOptions<'a> {
    pub version: &'a str,
    pub date: NaiveDate,
    pub link_style: LinkStyle,
    pub repo_url: Option<&'a str>,
    /// Keyword/label pairs; `None` disables the highlights block
    pub highlights: Option<&'a [(String, String)]>,
    /// Configured type/label pairs beyond the built-in vocabulary
    pub extra_types: &'a [(String, String)],
}

/// Entries grouped by section label, in emission order
pub fn categorize<'e>(entries: &'e [Entry], extra_types: &[(String, String)]) -> Vec<(String, Vec<&'e Entry>)> {
    let mut order: Vec<(String, String)> = CATEGORIES
        .iter()
        .map(|(k, l)| (k.to_string(), l.to_string()))
        .collect();

    // Commit types are lowercased when parsed
    let mut extras: Vec<(String, String)> = extra_types
        .iter()
        .map(|(k, l)| (k.to_lowercase(), l.clone()))
        .filter(|(k, _)| !CATEGORIES.iter().any(|(c, _)| *c == k.as_str()))
        .collect();
    extras.sort_by(|a, b| a.0.cmp(&b.0));
    extras.dedup_by(|a, b| a.0 == b.0);
    order.extend(extras);

    let mut sections: Vec<(String, Vec<&Entry>)> = order
        .iter()
        .map(|(kind, label)| {
            let items: Vec<&Entry> = entries
                .iter()
                .filter(|e| e.commit.kind.as_deref() == Some(kind.as_str()))
                .collect();
            (label.clone(), items)
        })
        .filter(|(_, items)| !items.is_empty())
        .collect();

    let other: Vec<&Entry> = entries
        .iter()
        .filter(|e| match &e.commit.kind {
            Some(kind) => !order.iter().any(|(k, _)| k == kind),
            None => true,
        })
        .collect();
    if !other.is_empty() {
        sections.push((OTHER.to_string(), other));
    }

    sections
}

/// Labels whose keyword starts a word in any subject, each once, in configured
/// order. `ui` matches "UI" and "ui:" but not "build"; `dependenc` matches
/// "dependencies".
pub fn highlights(entries: &[Entry], keywords: &[(String, String)]) -> Vec<String> {
    let text = entries
        .iter()
        .map(|e| e.subject.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut labels: Vec<String> = Vec::new();
    for (keyword, label) in keywords {
        let pattern = format!(r"(?i)(?:^|[^\w]){}", regex::escape(keyword));
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        if re.is_match(&text) && !labels.contains(label) {
            labels.push(label.clone());
        }
    }
    labels
}

/// Conventional bump implied by a set of entries
pub fn bump_for(entries: &[Entry]) -> Bump {
    if entries.iter().any(|e| e.commit.breaking) {
        Bump::Major
    } else if entries.iter().any(|e| e.commit.kind.as_deref() == Some("feat")) {
        Bump::Minor
    } else {
        Bump::Patch
    }
}

fn entry_line(entry: &Entry, opts: &SectionOptions) -> String {
    let c = &entry.commit;
    let mut line = String::from("- ");
    if let Some(scope) = &c.scope {
        line.push_str(&format!("**{}:** ", scope));
    }
    if c.kind.is_some() {
        line.push_str(&c.description);
    } else {
        line.push_str(&entry.subject);
    }

    match (opts.link_style, opts.repo_url) {
        (LinkStyle::Full, Some(url)) => {
            line.push_str(&format!(" ([{}]({}))", entry.short_hash, commit_url(url, &entry.hash)));
        }
        (LinkStyle::Full, None) | (LinkStyle::Short, _) => {
            line.push_str(&format!(" (`{}`)", entry.short_hash));
        }
        (LinkStyle::None, _) => {}
    }

    line
}

pub fn render_section(entries: &[Entry], opts: &SectionOptions) -> String {
    let mut out = format!("## [{}] - {}\n", opts.version, opts.date.format("%Y-%m-%d"));

    if let Some(keywords) = opts.highlights {
        let labels = highlights(entries, keywords);
        if !labels.is_empty() {
            out.push_str("\n### Key Highlights\n\n");
            for label in labels {
                out.push_str(&format!("- {}\n", label));
            }
        }
    }

    let breaking: Vec<&Entry> = entries.iter().filter(|e| e.commit.breaking).collect();
    if !breaking.is_empty() {
        out.push_str("\n### Breaking Changes\n\n");
        for entry in breaking {
            out.push_str(&entry_line(entry, opts));
            out.push('\n');
        }
    }

    for (label, items) in categorize(entries, opts.extra_types) {
        out.push_str(&format!("\n### {}\n\n", label));
        for entry in items {
            out.push_str(&entry_line(entry, opts));
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(subject: &str, n: usize) -> Entry {
        let hash = format!("{:0>40}", n);
        Entry {
            short_hash: hash[..7].to_string(),
            hash,
            subject: subject.to_string(),
            commit: parse_conventional(subject),
        }
    }

    fn opts<'a>(link_style: LinkStyle, repo_url: Option<&'a str>) -> SectionOptions<'a> {
        SectionOptions {
            version: "1.2.0",
            date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            link_style,
            repo_url,
            highlights: None,
            extra_types: &[],
        }
    }

    #[test]
    fn test_categories_in_priority_order() {
        let entries = vec![
            entry("chore: bump Z", 1),
            entry("fix: correct Y", 2),
            entry("feat: add X", 3),
        ];
        let sections = categorize(&entries, &[]);
        let labels: Vec<&str> = sections.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Features", "Bug Fixes", "Chores"]);

        let text = render_section(&entries, &opts(LinkStyle::None, None));
        let feat = text.find("### Features").unwrap();
        let fix = text.find("### Bug Fixes").unwrap();
        let chore = text.find("### Chores").unwrap();
        assert!(feat < fix && fix < chore);
        assert!(text.contains("- add X\n"));
        assert!(text.starts_with("## [1.2.0] - 2026-10-18\n"));
    }

    #[test]
    fn test_extra_and_unknown_types() {
        let entries = vec![
            entry("style: tabs", 1),
            entry("wip: half done", 2),
            entry("Tweak footer", 3),
            entry("feat: thing", 4),
        ];
        let extra = vec![("style".to_string(), "Styles".to_string())];
        let sections = categorize(&entries, &extra);
        let labels: Vec<&str> = sections.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Features", "Styles", "Other"]);
        assert_eq!(sections[2].1.len(), 2);
    }

    #[test]
    fn test_link_styles() {
        let entries = vec![entry("fix(ui): align buttons", 7)];
        let full = render_section(&entries, &opts(LinkStyle::Full, Some("https://github.com/o/r")));
        assert!(full.contains(
            "- **ui:** align buttons ([0000000](https://github.com/o/r/commit/0000000000000000000000000000000000000007))"
        ));

        let short = render_section(&entries, &opts(LinkStyle::Short, None));
        assert!(short.contains("- **ui:** align buttons (`0000000`)"));

        let none = render_section(&entries, &opts(LinkStyle::None, Some("https://github.com/o/r")));
        assert!(none.contains("- **ui:** align buttons\n"));
    }

    #[test]
    fn test_breaking_and_highlights() {
        let entries = vec![
            entry("feat(api)!: remove v1 routes", 1),
            entry("fix: patch security hole in login", 2),
        ];
        let keywords = vec![
            ("security".to_string(), "Security improvements".to_string()),
            ("api".to_string(), "API changes".to_string()),
            ("perf".to_string(), "Faster".to_string()),
        ];
        let mut o = opts(LinkStyle::None, None);
        o.highlights = Some(keywords.as_slice());
        let text = render_section(&entries, &o);

        assert!(text.contains("### Key Highlights\n\n- Security improvements\n- API changes\n"));
        assert!(!text.contains("Faster"));
        let breaking = text.find("### Breaking Changes").unwrap();
        let features = text.find("### Features").unwrap();
        assert!(breaking < features);
        assert_eq!(bump_for(&entries), Bump::Major);
    }

    #[test]
    fn test_highlights_match_word_starts() {
        let keywords = vec![
            ("ui".to_string(), "User interface updates".to_string()),
            ("api".to_string(), "API changes".to_string()),
            ("dependenc".to_string(), "Dependency updates".to_string()),
        ];
        let quiet = vec![
            entry("build: guide for rapid setup", 1),
            entry("docs: therapist notes", 2),
        ];
        assert!(highlights(&quiet, &keywords).is_empty());

        let loud = vec![
            entry("feat(ui): new sidebar", 3),
            entry("chore: bump dependencies", 4),
            entry("fix: API pagination", 5),
        ];
        assert_eq!(
            highlights(&loud, &keywords),
            vec!["User interface updates", "API changes", "Dependency updates"]
        );
    }

    #[test]
    fn test_extra_type_keys_ignore_case() {
        let entries = vec![entry("style: tabs", 1), entry("Style: spaces", 2)];
        let extra = vec![("Style".to_string(), "Styles".to_string())];
        let sections = categorize(&entries, &extra);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "Styles");
        assert_eq!(sections[0].1.len(), 2);
    }

    #[test]
    fn test_bump_for() {
        assert_eq!(bump_for(&[entry("feat: x", 1), entry("fix: y", 2)]), Bump::Minor);
        assert_eq!(bump_for(&[entry("fix: y", 2)]), Bump::Patch);
    }
}
