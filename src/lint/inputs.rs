use std::ops::Range;
use std::path::Path;

use anyhow::Result;
use regex::Regex;
use serde::Serialize;

use super::{build_globset, matching_files};
use crate::config::InputsConfig;
use crate::source::{line_of, read_lossy};

/// A native form element that should be a design-system component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputFinding {
    pub path: String,
    pub line: usize,
    pub element: String,
    pub component: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InputsReport {
    pub findings: Vec<InputFinding>,
    pub files_checked: usize,
}

impl InputsReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

pub fn check_native_inputs(base: &Path, config: &InputsConfig) -> Result<InputsReport> {
    let include = build_globset(&config.include)?;
    let exclude = build_globset(&config.exclude)?;
    let skip = ["vendor".to_string(), "node_modules".to_string(), ".git".to_string()];

    let mut report = InputsReport::default();
    for (path, rel) in matching_files(base, &include, Some(&exclude), &skip) {
        let Some(content) = read_lossy(&path) else {
            continue;
        };
        report.files_checked += 1;

        let rel = rel.to_string_lossy().replace('\\', "/");
        report.findings.extend(scan_template(&rel, &content, config));
    }

    Ok(report)
}

/// Native elements in one template, skipping comments, hidden inputs and
/// lines marked with the ignore marker (on the element line or the one above).
pub fn scan_template(path: &str, content: &str, config: &InputsConfig) -> Vec<InputFinding> {
    if config.components.is_empty() {
        return Vec::new();
    }

    let names: Vec<String> = config.components.iter().map(|(e, _)| regex::escape(e)).collect();
    let pattern = format!(r"(?i)<({})(?:[\s/>]|$)", names.join("|"));
    let Ok(element_re) = Regex::new(&pattern) else {
        return Vec::new();
    };
    let hidden = Regex::new(r#"(?i)\btype\s*=\s*["']?hidden\b"#).expect("static regex");

    let comments = comment_ranges(content);
    let lines: Vec<&str> = content.lines().collect();

    let mut findings = Vec::new();
    for caps in element_re.captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if comments.iter().any(|r| r.contains(&whole.start())) {
            continue;
        }

        let element = name.as_str().to_lowercase();
        let tag_end = content[whole.start()..]
            .find('>')
            .map(|n| whole.start() + n)
            .unwrap_or(content.len());
        let tag = &content[whole.start()..tag_end];
        if element == "input" && hidden.is_match(tag) {
            continue;
        }

        let line = line_of(content, whole.start());
        let marked = |n: usize| {
            n >= 1
                && lines
                    .get(n - 1)
                    .map(|l| l.contains(&config.ignore_marker))
                    .unwrap_or(false)
        };
        if marked(line) || marked(line - 1) {
            continue;
        }

        let component = config
            .components
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(&element))
            .map(|(_, c)| c.clone())
            .unwrap_or_default();

        findings.push(InputFinding {
            path: path.to_string(),
            line,
            element,
            component,
        });
    }

    findings
}

/// Byte ranges of Blade `{{-- --}}` and HTML `<!-- -->` comments
fn comment_ranges(content: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    for (open, close) in [("{{--", "--}}"), ("<!--", "-->")] {
        let mut from = 0;
        while let Some(start) = content[from..].find(open).map(|n| from + n) {
            let end = content[start + open.len()..]
                .find(close)
                .map(|n| start + open.len() + n + close.len())
                .unwrap_or(content.len());
            ranges.push(start..end);
            from = end;
        }
    }
    ranges
}
