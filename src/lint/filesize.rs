use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use super::{build_globset, matching_files};
use crate::config::FileSizeConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OversizedFile {
    pub path: String,
    pub lines: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileSizeReport {
    pub max_lines: usize,
    /// Largest first
    pub oversized: Vec<OversizedFile>,
    pub files_checked: usize,
}

impl FileSizeReport {
    pub fn is_clean(&self) -> bool {
        self.oversized.is_empty()
    }
}

pub fn check_file_sizes(base: &Path, config: &FileSizeConfig, max_lines: Option<usize>) -> Result<FileSizeReport> {
    let include = build_globset(&config.include)?;
    let max_lines = max_lines.unwrap_or(config.max_lines);

    let mut report = FileSizeReport {
        max_lines,
        ..Default::default()
    };

    for (path, rel) in matching_files(base, &include, None, &config.skip_dirs) {
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        report.files_checked += 1;

        let lines = count_lines(&bytes);
        if lines > max_lines {
            report.oversized.push(OversizedFile {
                path: rel.to_string_lossy().replace('\\', "/"),
                lines,
            });
        }
    }

    report
        .oversized
        .sort_by(|a, b| b.lines.cmp(&a.lines).then_with(|| a.path.cmp(&b.path)));
    Ok(report)
}

/// Newline count, plus one for a final line without a trailing newline
pub fn count_lines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|b| **b == b'\n').count();
    match bytes.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(b""), 0);
        assert_eq!(count_lines(b"a"), 1);
        assert_eq!(count_lines(b"a\nb\n"), 2);
        assert_eq!(count_lines(b"a\nb"), 2);
    }

    #[test]
    fn test_oversized_sorted_largest_first() {
        let dir = tempdir().unwrap();
        let write = |rel: &str, lines: usize| {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x\n".repeat(lines)).unwrap();
        };
        write("app/Small.php", 10);
        write("app/Big.php", 40);
        write("lib/huge.dart", 80);
        write("node_modules/pkg/index.js", 500);
        write("notes/readme.md", 900);

        let report = check_file_sizes(dir.path(), &FileSizeConfig::default(), Some(20)).unwrap();
        let paths: Vec<(&str, usize)> = report
            .oversized
            .iter()
            .map(|f| (f.path.as_str(), f.lines))
            .collect();
        assert_eq!(paths, vec![("lib/huge.dart", 80), ("app/Big.php", 40)]);
        assert_eq!(report.files_checked, 3);
        assert!(!report.is_clean());
    }
}
