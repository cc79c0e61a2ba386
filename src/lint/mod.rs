pub mod filesize;
pub mod inputs;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;
use walkdir::WalkDir;

pub use filesize::{check_file_sizes, FileSizeReport};
pub use inputs::{check_native_inputs, InputsReport};

pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build glob set")
}

/// Files under `base` matching `include` and not `exclude`, with paths
/// relative to `base`. Directories named in `skip_dirs` are not entered.
pub fn matching_files(
    base: &Path,
    include: &GlobSet,
    exclude: Option<&GlobSet>,
    skip_dirs: &[String],
) -> Vec<(PathBuf, PathBuf)> {
    let mut files: Vec<(PathBuf, PathBuf)> = WalkDir::new(base)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !skip_dirs.iter().any(|d| e.file_name().to_str() == Some(d.as_str()))
        })
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let rel = e.path().strip_prefix(base).ok()?.to_path_buf();
            if !include.is_match(&rel) {
                return None;
            }
            if exclude.map(|x| x.is_match(&rel)).unwrap_or(false) {
                return None;
            }
            Some((e.into_path(), rel))
        })
        .collect();

    files.sort_by(|a, b| a.1.cmp(&b.1));
    files
}
