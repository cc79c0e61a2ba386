use anyhow::{anyhow, Result};
use semver::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bump {
    Patch,
    Minor,
    Major,
}

/// Parse a version string (with or without 'v' prefix)
pub fn parse_version(version_str: &str) -> Result<Version> {
    let cleaned = version_str.trim().trim_start_matches('v');
    Version::parse(cleaned).map_err(|e| anyhow!("Invalid version '{}': {}", version_str, e))
}

/// Next release version; pre-release and build metadata are dropped
pub fn bump_version(current: &Version, bump: Bump) -> Version {
    match bump {
        Bump::Major => Version::new(current.major + 1, 0, 0),
        Bump::Minor => Version::new(current.major, current.minor + 1, 0),
        Bump::Patch => Version::new(current.major, current.minor, current.patch + 1),
    }
}

pub fn is_major_change(previous: &Version, next: &Version) -> bool {
    previous.major != next.major
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert!(parse_version("1.0.0").is_ok());
        assert!(parse_version("v1.0.0").is_ok());
        assert!(parse_version("2.1.0+42").is_ok());
        assert!(parse_version("invalid").is_err());
        assert!(parse_version("1.2").is_err());
    }

    #[test]
    fn test_bump_version() {
        let v = parse_version("1.4.2-beta.1").unwrap();
        assert_eq!(bump_version(&v, Bump::Major).to_string(), "2.0.0");
        assert_eq!(bump_version(&v, Bump::Minor).to_string(), "1.5.0");
        assert_eq!(bump_version(&v, Bump::Patch).to_string(), "1.4.3");
    }

    #[test]
    fn test_is_major_change() {
        let a = parse_version("1.9.9").unwrap();
        assert!(is_major_change(&a, &parse_version("2.0.0").unwrap()));
        assert!(!is_major_change(&a, &parse_version("1.10.0").unwrap()));
    }
}
