pub mod conventional;
pub mod document;
pub mod section;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::config::Config;
use crate::git::{commits_since, latest_version_tag, open_repo, origin_web_url};
use crate::models::CommitInfo;
use crate::version::{bump_version, parse_version};
pub use document::{insert_section, Placement};
use section::{bump_for, render_section, Entry, SectionOptions};

#[derive(Debug, Clone, Default)]
pub struct ChangelogOptions {
    /// Explicit version; computed from the last tag when absent
    pub version: Option<String>,
    pub dry_run: bool,
    /// Overrides `changelog.path`
    pub output: Option<PathBuf>,
    /// Section date; today when absent
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ChangelogResult {
    pub version: String,
    pub previous_tag: Option<String>,
    /// Rendered section; `None` when there was nothing to release
    pub section: Option<String>,
    pub placement: Option<Placement>,
    pub path: PathBuf,
    pub included: usize,
    pub excluded: usize,
}

/// Drop merge commits and automation noise
pub fn eligible_commits<'a>(commits: &'a [CommitInfo], noise: &[String]) -> Vec<&'a CommitInfo> {
    let noise: Vec<String> = noise.iter().map(|n| n.to_lowercase()).collect();
    commits
        .iter()
        .filter(|c| !c.is_merge())
        .filter(|c| {
            let subject = c.subject.to_lowercase();
            !noise.iter().any(|n| subject.contains(n.as_str()))
        })
        .collect()
}

pub fn generate_changelog(base: &Path, config: &Config, opts: &ChangelogOptions) -> Result<ChangelogResult> {
    let cfg = &config.changelog;
    let repo = open_repo(base)?;
    let last_tag = latest_version_tag(&repo)?;

    let commits = commits_since(&repo, last_tag.as_ref().map(|t| t.target))?;
    let eligible = eligible_commits(&commits, &cfg.noise);
    let entries: Vec<Entry> = eligible.iter().map(|c| Entry::from_commit(c)).collect();
    debug!(
        "{} commits since {}, {} eligible",
        commits.len(),
        last_tag.as_ref().map(|t| t.name.as_str()).unwrap_or("the first commit"),
        entries.len()
    );

    let version = match &opts.version {
        Some(v) => parse_version(v)?.to_string(),
        None => match &last_tag {
            Some(tag) => bump_version(&tag.version, bump_for(&entries)).to_string(),
            None => "0.1.0".to_string(),
        },
    };

    let path = opts
        .output
        .clone()
        .unwrap_or_else(|| base.join(&cfg.path));

    let mut result = ChangelogResult {
        version: version.clone(),
        previous_tag: last_tag.as_ref().map(|t| t.name.clone()),
        section: None,
        placement: None,
        path: path.clone(),
        included: entries.len(),
        excluded: commits.len() - entries.len(),
    };

    if entries.is_empty() {
        return Ok(result);
    }

    let repo_url = cfg.repository_url.clone().or_else(|| origin_web_url(&repo));
    let section_opts = SectionOptions {
        version: &version,
        date: opts.date.unwrap_or_else(|| Local::now().date_naive()),
        link_style: cfg.link_style,
        repo_url: repo_url.as_deref(),
        highlights: cfg.highlights.then_some(cfg.keywords.as_slice()),
        extra_types: &cfg.types,
    };
    let section = render_section(&entries, &section_opts);

    let existing = if path.exists() {
        Some(fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?)
    } else {
        None
    };
    let (document, placement) = insert_section(existing.as_deref(), &section);

    if !opts.dry_run {
        fs::write(&path, document).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    result.section = Some(section);
    result.placement = Some(placement);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use git2::{Oid, Repository, Signature};
    use tempfile::tempdir;

    fn info(subject: &str, parents: usize) -> CommitInfo {
        CommitInfo {
            id: Oid::zero(),
            short_id: "0000000".to_string(),
            subject: subject.to_string(),
            author: "Dev".to_string(),
            time: Local.timestamp_opt(0, 0).unwrap(),
            parents: vec![Oid::zero(); parents],
        }
    }

    fn commit(repo: &Repository, message: &str) -> Oid {
        let sig = Signature::now("Dev", "dev@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_eligible_commits_filters_noise() {
        let commits = vec![
            info("feat: real work", 1),
            info("Merge branch 'main' into dev", 1),
            info("fix: merge two lists", 2),
            info("docs: update CHANGELOG [skip ci]", 1),
            info("chore(release): 1.2.0", 1),
        ];
        let noise = Config::default().changelog.noise;
        let kept: Vec<&str> = eligible_commits(&commits, &noise)
            .iter()
            .map(|c| c.subject.as_str())
            .collect();
        assert_eq!(kept, vec!["feat: real work"]);
    }

    #[test]
    fn test_generate_since_last_tag() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let tagged = commit(&repo, "feat: first release");
        let obj = repo.find_object(tagged, None).unwrap();
        repo.tag_lightweight("v1.0.0", &obj, false).unwrap();
        commit(&repo, "chore: bump Z");
        commit(&repo, "fix: correct Y");
        commit(&repo, "feat: add X");

        let opts = ChangelogOptions {
            date: NaiveDate::from_ymd_opt(2026, 10, 18),
            ..Default::default()
        };
        let result = generate_changelog(dir.path(), &Config::default(), &opts).unwrap();

        assert_eq!(result.version, "1.1.0");
        assert_eq!(result.previous_tag.as_deref(), Some("v1.0.0"));
        assert_eq!(result.included, 3);
        assert_eq!(result.placement, Some(Placement::NewDocument));

        let written = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
        assert!(written.starts_with("# Changelog"));
        assert!(written.contains("## [1.1.0] - 2026-10-18"));
        assert!(!written.contains("first release"));
        let feat = written.find("### Features").unwrap();
        let fix = written.find("### Bug Fixes").unwrap();
        let chore = written.find("### Chores").unwrap();
        assert!(feat < fix && fix < chore);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit(&repo, "feat: initial");

        let opts = ChangelogOptions {
            version: Some("v0.2.0".to_string()),
            dry_run: true,
            ..Default::default()
        };
        let result = generate_changelog(dir.path(), &Config::default(), &opts).unwrap();
        assert_eq!(result.version, "0.2.0");
        assert!(result.section.unwrap().contains("- initial"));
        assert!(!dir.path().join("CHANGELOG.md").exists());
    }

    #[test]
    fn test_nothing_to_release() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let head = commit(&repo, "feat: shipped");
        let obj = repo.find_object(head, None).unwrap();
        repo.tag_lightweight("v2.0.0", &obj, false).unwrap();

        let result = generate_changelog(dir.path(), &Config::default(), &ChangelogOptions::default()).unwrap();
        assert!(result.section.is_none());
        assert_eq!(result.included, 0);
        assert!(!dir.path().join("CHANGELOG.md").exists());
    }
}
