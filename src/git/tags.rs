use anyhow::{bail, Context, Result};
use git2::{Oid, Repository};
use semver::Version;

use crate::version::parse_version;

#[derive(Debug, Clone)]
pub struct VersionTag {
    pub name: String,
    pub version: Version,
    /// Commit the tag points at
    pub target: Oid,
}

/// Highest semver tag (`v1.2.3` or `1.2.3`) reachable from HEAD; other tags,
/// and version tags on unmerged branches, are ignored
pub fn latest_version_tag(repo: &Repository) -> Result<Option<VersionTag>> {
    let Some(head) = repo.head().ok().and_then(|h| h.target()) else {
        return Ok(None);
    };
    let names = repo.tag_names(None).context("Failed to list tags")?;

    let mut best: Option<VersionTag> = None;
    for name in names.iter().flatten() {
        let Ok(version) = parse_version(name) else {
            continue;
        };
        if best.as_ref().map(|b| version <= b.version).unwrap_or(false) {
            continue;
        }

        let target = repo
            .revparse_single(&format!("refs/tags/{}", name))
            .and_then(|obj| obj.peel_to_commit())
            .map(|c| c.id());
        let Ok(target) = target else {
            continue;
        };
        let reachable = target == head || repo.graph_descendant_of(head, target).unwrap_or(false);
        if reachable {
            best = Some(VersionTag {
                name: name.to_string(),
                version,
                target,
            });
        }
    }

    Ok(best)
}

/// Create an annotated tag on HEAD
pub fn create_tag(repo: &Repository, name: &str, message: &str) -> Result<Oid> {
    if repo.revparse_single(&format!("refs/tags/{}", name)).is_ok() {
        bail!("Tag {} already exists", name);
    }

    let head = repo
        .head()
        .context("No HEAD")?
        .peel(git2::ObjectType::Commit)
        .context("HEAD does not point at a commit")?;
    let signature = repo
        .signature()
        .context("No git identity configured (user.name / user.email)")?;

    repo.tag(name, &head, &signature, message, false)
        .with_context(|| format!("Failed to create tag {}", name))
}
