pub mod bump;
pub mod detect;
pub mod targets;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use semver::Version;
use tracing::{debug, warn};

use crate::config::Config;
use crate::git::{create_tag, latest_version_tag, open_repo};
pub use bump::{bump_version, is_major_change, parse_version, Bump};
pub use detect::{detect_project_type, ProjectType};
use targets::{builtin_targets, current_version, rewrite, Rewrite, VersionTarget};

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    pub dry_run: bool,
    pub tag: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Updated,
    Unchanged,
    /// File exists but none of its patterns matched
    NoMatch,
    /// Only rewritten on major-version changes
    SkippedMinor,
}

#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: String,
    pub from: Option<String>,
    pub status: FileStatus,
}

#[derive(Debug, Clone)]
pub struct VersionReport {
    pub version: Version,
    pub previous: Option<Version>,
    pub project: Option<ProjectType>,
    pub changes: Vec<FileChange>,
    pub dry_run: bool,
    pub tag: Option<String>,
}

impl VersionReport {
    pub fn updated(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.status == FileStatus::Updated)
            .count()
    }
}

/// All targets, built-in first, then the configured ones
pub fn all_targets(config: &Config) -> Vec<VersionTarget> {
    let mut targets = builtin_targets();
    targets.extend(config.version.files.iter().map(VersionTarget::from));
    targets
}

/// Version currently declared by the project: the first manifest exposing
/// one, else the highest version tag.
pub fn detect_current_version(base: &Path, targets: &[VersionTarget]) -> Option<Version> {
    for target in targets {
        let path = base.join(&target.path);
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        if let Some(found) = current_version(&content, target) {
            if let Ok(version) = parse_version(&found) {
                debug!("current version {} from {}", version, target.path);
                return Some(version);
            }
        }
    }

    let repo = open_repo(base).ok()?;
    let tag = latest_version_tag(&repo).ok()??;
    Some(tag.version)
}

pub fn update_versions(base: &Path, config: &Config, version: &str, opts: UpdateOptions) -> Result<VersionReport> {
    if opts.dry_run && opts.tag {
        bail!("--tag cannot be combined with --dry-run");
    }

    let version = parse_version(version)?;
    let new_version = version.to_string();
    let targets = all_targets(config);
    let previous = detect_current_version(base, &targets);

    // Targets sharing a file are applied in sequence and written once
    let mut paths: Vec<&str> = Vec::new();
    for target in &targets {
        if !paths.contains(&target.path.as_str()) {
            paths.push(&target.path);
        }
    }

    let mut changes = Vec::new();
    for rel in paths {
        let path = base.join(rel);
        if !path.is_file() {
            debug!("{} not present, skipping", rel);
            continue;
        }

        let original = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", rel))?;
        let mut content = original.clone();
        let mut from = None;
        let mut matched = false;
        let mut skipped_minor = false;

        for target in targets.iter().filter(|t| t.path == rel) {
            if target.major_only {
                match &previous {
                    Some(prev) if is_major_change(prev, &version) => {}
                    Some(_) => {
                        skipped_minor = true;
                        continue;
                    }
                    None => {
                        warn!("{}: current version unknown, skipping major-only pattern", rel);
                        skipped_minor = true;
                        continue;
                    }
                }
            }

            match rewrite(&content, target, &new_version)? {
                Rewrite::NoMatch => {}
                Rewrite::Unchanged { current } => {
                    matched = true;
                    from = from.or(current);
                }
                Rewrite::Changed { current, content: updated } => {
                    matched = true;
                    from = from.or(current);
                    content = updated;
                }
            }
        }

        let status = if content != original {
            if !opts.dry_run {
                fs::write(&path, &content).with_context(|| format!("Failed to write {}", rel))?;
            }
            FileStatus::Updated
        } else if matched {
            FileStatus::Unchanged
        } else if skipped_minor {
            FileStatus::SkippedMinor
        } else {
            FileStatus::NoMatch
        };

        changes.push(FileChange {
            path: rel.to_string(),
            from,
            status,
        });
    }

    if changes.is_empty() {
        bail!("No version files found in {}", base.display());
    }

    let tag = if opts.tag {
        let repo = open_repo(base)?;
        let name = format!("v{}", new_version);
        create_tag(&repo, &name, &format!("Release {}", name))?;
        Some(name)
    } else {
        None
    };

    Ok(VersionReport {
        version,
        previous,
        project: detect_project_type(base),
        changes,
        dry_run: opts.dry_run,
        tag,
    })
}
