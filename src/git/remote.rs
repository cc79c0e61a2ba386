use git2::Repository;

/// Web URL of the `origin` remote, e.g. `https://github.com/owner/repo`
pub fn origin_web_url(repo: &Repository) -> Option<String> {
    let remote = repo.find_remote("origin").ok()?;
    let url = remote.url()?;
    parse_remote_url(url)
}

/// Normalise SSH and HTTPS remotes to an `https://host/path` URL
pub fn parse_remote_url(url: &str) -> Option<String> {
    let url = url.trim();

    // Handle SSH: git@github.com:owner/repo.git
    let (host, path) = if let Some(rest) = url.strip_prefix("git@") {
        rest.split_once(':')?
    } else if let Some(rest) = url.strip_prefix("ssh://") {
        let rest = rest.split_once('@').map(|(_, r)| r).unwrap_or(rest);
        rest.split_once('/')?
    } else {
        // Handle HTTPS: https://github.com/owner/repo.git
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))?;
        let rest = rest.split_once('@').map(|(_, r)| r).unwrap_or(rest);
        rest.split_once('/')?
    };

    let host = host.split(':').next().unwrap_or(host);
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    if host.is_empty() || !path.contains('/') {
        return None;
    }

    Some(format!("https://{}/{}", host, path))
}

/// Link to a single commit; GitLab uses the `/-/commit/` route
pub fn commit_url(repo_url: &str, hash: &str) -> String {
    let base = repo_url.trim_end_matches('/');
    if base.contains("gitlab") {
        format!("{}/-/commit/{}", base, hash)
    } else {
        format!("{}/commit/{}", base, hash)
    }
}
