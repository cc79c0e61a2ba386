use anyhow::{Context, Result};
use git2::Repository;
use std::path::Path;

/// Repository containing `base`, searching parent directories
pub fn open_repo(base: &Path) -> Result<Repository> {
    Repository::discover(base)
        .with_context(|| format!("Not a git repository (or any parent): {}", base.display()))
}
