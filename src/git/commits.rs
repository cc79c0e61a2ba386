use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use git2::{Oid, Repository};

use crate::models::CommitInfo;

/// Commits reachable from HEAD but not from `since`, newest first.
/// An unborn HEAD yields no commits.
pub fn commits_since(repo: &Repository, since: Option<Oid>) -> Result<Vec<CommitInfo>> {
    let mut commits = Vec::new();

    if repo.head().is_err() {
        return Ok(commits);
    }

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
    revwalk.push_head().context("Failed to walk from HEAD")?;
    if let Some(oid) = since {
        revwalk.hide(oid)?;
    }

    for oid_result in revwalk {
        let oid = oid_result?;
        let commit = repo.find_commit(oid)?;

        let time = commit.time();
        let dt = Local
            .timestamp_opt(time.seconds(), 0)
            .single()
            .unwrap_or_else(Local::now);

        let parents: Vec<_> = commit.parent_ids().collect();

        commits.push(CommitInfo {
            id: oid,
            short_id: oid.to_string()[..7].to_string(),
            subject: commit.summary().unwrap_or("").to_string(),
            author: commit.author().name().unwrap_or("").to_string(),
            time: dt,
            parents,
        });
    }

    Ok(commits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::tempdir;

    fn commit(repo: &Repository, message: &str) -> Oid {
        let sig = Signature::now("Dev Person", "dev@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_commits_since() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let base = commit(&repo, "chore: init");
        commit(&repo, "feat: add export\n\nLonger body");
        commit(&repo, "fix: handle empty rows");

        let all = commits_since(&repo, None).unwrap();
        assert_eq!(all.len(), 3);

        let recent = commits_since(&repo, Some(base)).unwrap();
        let subjects: Vec<&str> = recent.iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(subjects, vec!["fix: handle empty rows", "feat: add export"]);
        assert_eq!(recent[0].author, "Dev Person");
        assert_eq!(recent[0].short_id.len(), 7);
    }

    #[test]
    fn test_empty_repository() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        assert!(commits_since(&repo, None).unwrap().is_empty());
    }
}
