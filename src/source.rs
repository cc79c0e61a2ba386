//! Small helpers for scanning PHP-ish source text without a real parser.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use walkdir::WalkDir;

/// Given the byte offset of an opening delimiter, return the text between it
/// and its matching closer. Quoted strings are skipped so delimiters inside
/// them do not count. Unbalanced input yields everything after the opener.
pub fn delimited_body(text: &str, open_idx: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let open = *bytes.get(open_idx)?;
    let close = match open {
        b'{' => b'}',
        b'[' => b']',
        b'(' => b')',
        _ => return None,
    };

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open_idx;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
        } else if b == b'\'' || b == b'"' {
            quote = Some(b);
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[open_idx + 1..i]);
            }
        }
        i += 1;
    }

    Some(&text[open_idx + 1..])
}

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"'([^'\\]*)'|"([^"\\]*)""#).expect("static regex"));

/// Body of the first `[` ... `]` array following the match of `pattern`.
pub fn array_after<'a>(text: &'a str, pattern: &Regex) -> Option<&'a str> {
    let m = pattern.find(text)?;
    let rest = &text[m.end()..];
    let offset = rest.find('[')?;
    delimited_body(text, m.end() + offset)
}

/// All single- or double-quoted string literals, in order.
pub fn quoted_strings(text: &str) -> Vec<String> {
    QUOTED
        .captures_iter(text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Remove `//` and `#` line comments and `/* */` block comments, keeping
/// string literals and line structure intact.
pub fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<u8> = None;
    let mut i = 0;
    let mut start = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'\'' | b'"' => {
                quote = Some(b);
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                out.push_str(&text[start..i]);
                i = text[i..].find('\n').map(|n| i + n).unwrap_or(bytes.len());
                start = i;
            }
            b'#' if bytes.get(i + 1) != Some(&b'[') => {
                out.push_str(&text[start..i]);
                i = text[i..].find('\n').map(|n| i + n).unwrap_or(bytes.len());
                start = i;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&text[start..i]);
                let end = text[i + 2..]
                    .find("*/")
                    .map(|n| i + 2 + n + 2)
                    .unwrap_or(bytes.len());
                out.extend(text[i..end].chars().filter(|c| *c == '\n'));
                i = end;
                start = i;
            }
            _ => i += 1,
        }
    }

    out.push_str(&text[start.min(bytes.len())..]);
    out
}

/// Files under `dir` with the given extension, sorted by file name.
pub fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|x| x.to_str()) == Some(extension))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}

/// Read a file, logging and returning `None` when it cannot be read.
pub fn read_lossy(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("skipping {}: {}", path.display(), e);
            None
        }
    }
}

/// 1-based line number of a byte offset.
pub fn line_of(text: &str, offset: usize) -> usize {
    text[..offset.min(text.len())].matches('\n').count() + 1
}
