pub const DEFAULT_HEADER: &str = "# Changelog\n\nAll notable changes to this project will be documented in this file.\n";

/// Where a new section went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    AfterUnreleased,
    BeforeLatest,
    AfterHeader,
    Appended,
    NewDocument,
}

/// Insert `section` into an existing changelog. Preference order: after an
/// `## [Unreleased]` heading, before the first `## [` version heading, after
/// the top-level `# ` header, else at the end.
pub fn insert_section(document: Option<&str>, section: &str) -> (String, Placement) {
    let Some(document) = document.filter(|d| !d.trim().is_empty()) else {
        return (format!("{}\n{}", DEFAULT_HEADER, section), Placement::NewDocument);
    };

    let section = section.trim_end();
    let lines: Vec<&str> = document.lines().collect();

    let unreleased = lines.iter().position(|l| {
        let l = l.trim().to_lowercase();
        l.starts_with("## [unreleased]") || l == "## unreleased"
    });
    if let Some(idx) = unreleased {
        return (splice(&lines, idx + 1, section, document), Placement::AfterUnreleased);
    }

    if let Some(idx) = lines.iter().position(|l| l.starts_with("## [")) {
        return (splice(&lines, idx, section, document), Placement::BeforeLatest);
    }

    if let Some(idx) = lines.iter().position(|l| l.starts_with("# ")) {
        // Keep the intro paragraph under the header together
        let mut end = idx + 1;
        while end < lines.len() && !lines[end].starts_with('#') {
            end += 1;
        }
        while end > idx + 1 && lines[end - 1].trim().is_empty() {
            end -= 1;
        }
        return (splice(&lines, end, section, document), Placement::AfterHeader);
    }

    let mut out = document.trim_end().to_string();
    out.push_str("\n\n");
    out.push_str(section);
    out.push('\n');
    (out, Placement::Appended)
}

/// Put `section` before line `at`, separated by blank lines
fn splice(lines: &[&str], at: usize, section: &str, original: &str) -> String {
    let head = lines[..at].join("\n");
    let tail = lines[at..].join("\n");
    let head = head.trim_end();
    let tail = tail.trim_start();

    let mut out = String::with_capacity(original.len() + section.len() + 4);
    out.push_str(head);
    out.push_str("\n\n");
    out.push_str(section);
    out.push('\n');
    if !tail.trim().is_empty() {
        out.push('\n');
        out.push_str(tail);
        if original.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
