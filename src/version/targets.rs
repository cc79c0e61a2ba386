use anyhow::{Context, Result};
use regex::Regex;

use crate::config::VersionFileConfig;

/// A version field in one file: a regex locating it and the replacement
/// template, where `{version}` stands for the new version.
#[derive(Debug, Clone)]
pub struct VersionTarget {
    pub path: String,
    pub pattern: String,
    pub replacement: String,
    pub major_only: bool,
    /// `${post}` carries a `+build` suffix that a versioned build number replaces
    pub build_suffix: bool,
}

impl VersionTarget {
    fn builtin(path: &str, pattern: &str) -> Self {
        Self {
            path: path.to_string(),
            pattern: pattern.to_string(),
            replacement: "${pre}{version}${post}".to_string(),
            major_only: false,
            build_suffix: false,
        }
    }

    fn with_build_suffix(mut self) -> Self {
        self.build_suffix = true;
        self
    }

    fn with_replacement(mut self, replacement: &str) -> Self {
        self.replacement = replacement.to_string();
        self
    }

    pub fn regex(&self) -> Result<Regex> {
        Regex::new(&self.pattern)
            .with_context(|| format!("Invalid version pattern for {}: {}", self.path, self.pattern))
    }
}

impl From<&VersionFileConfig> for VersionTarget {
    fn from(file: &VersionFileConfig) -> Self {
        Self {
            path: file.path.clone(),
            pattern: file.pattern.clone(),
            replacement: file.replacement.clone(),
            major_only: file.major_only,
            build_suffix: false,
        }
    }
}

/// First `"version": "..."` pair; manifests keep it near the top
const JSON_VERSION: &str = r#"(?P<pre>"version"\s*:\s*")(?P<v>[^"]*)(?P<post>")"#;
const GO_VERSION: &str = r#"(?P<pre>\bVersion\s*(?:string\s*)?=\s*")(?P<v>[^"]*)(?P<post>")"#;

/// Well-known manifests of the supported ecosystems, in lookup order
pub fn builtin_targets() -> Vec<VersionTarget> {
    vec![
        VersionTarget::builtin("package.json", JSON_VERSION),
        VersionTarget::builtin("composer.json", JSON_VERSION),
        VersionTarget::builtin(
            "pubspec.yaml",
            r"(?m)^(?P<pre>version:[ \t]*)(?P<v>[0-9A-Za-z.\-]+)(?P<post>\+[0-9A-Za-z.\-]+)?",
        )
        .with_build_suffix(),
        VersionTarget::builtin(
            "config/app.php",
            r"(?P<pre>'version'\s*=>\s*')(?P<v>[^']*)(?P<post>')",
        ),
        VersionTarget::builtin(
            "config/app.php",
            r"(?P<pre>env\(\s*'APP_VERSION'\s*,\s*')(?P<v>[^']*)(?P<post>')",
        ),
        VersionTarget::builtin(
            ".env.example",
            r#"(?m)^(?P<pre>APP_VERSION=["']?)(?P<v>[^"'\s]*)(?P<post>["']?)"#,
        ),
        VersionTarget::builtin("version.go", GO_VERSION),
        VersionTarget::builtin("internal/version/version.go", GO_VERSION),
        VersionTarget::builtin("VERSION", r"\A(?P<pre>\s*)(?P<v>\S+)").with_replacement("${pre}{version}"),
    ]
}

/// Substitute `{version}` and turn bare `$1` / `$name` group references into
/// `${1}` / `${name}` so a version starting with a digit cannot extend them.
pub fn expand_template(template: &str, version: &str) -> String {
    let mut normalized = String::with_capacity(template.len() + 8);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            normalized.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') | Some('{') => {
                normalized.push(c);
                if let Some(next) = chars.next() {
                    normalized.push(next);
                }
            }
            Some(n) if n.is_ascii_alphanumeric() || *n == '_' => {
                normalized.push_str("${");
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '_' {
                        normalized.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                normalized.push('}');
            }
            _ => normalized.push(c),
        }
    }

    normalized.replace("{version}", version)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    NoMatch,
    /// Matched, and the field already holds the target version
    Unchanged { current: Option<String> },
    Changed { current: Option<String>, content: String },
}

/// Rewrite the first match of `target` in `content`
pub fn rewrite(content: &str, target: &VersionTarget, version: &str) -> Result<Rewrite> {
    let re = target.regex()?;
    let Some(caps) = re.captures(content) else {
        return Ok(Rewrite::NoMatch);
    };
    let current = caps.name("v").map(|m| m.as_str().to_string());

    let template = if target.build_suffix && version.contains('+') {
        target.replacement.replace("${post}", "")
    } else {
        target.replacement.clone()
    };
    let replacement = expand_template(&template, version);
    let updated = re.replacen(content, 1, replacement.as_str()).into_owned();

    if updated == content {
        Ok(Rewrite::Unchanged { current })
    } else {
        Ok(Rewrite::Changed {
            current,
            content: updated,
        })
    }
}

/// Version currently held by `content` according to `target`, if it has a `v` group
pub fn current_version(content: &str, target: &VersionTarget) -> Option<String> {
    let re = target.regex().ok()?;
    re.captures(content)?
        .name("v")
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(path: &str) -> VersionTarget {
        builtin_targets()
            .into_iter()
            .find(|t| t.path == path)
            .unwrap()
    }

    #[test]
    fn test_package_json_only_version_field_changes() {
        let content = r#"{
  "name": "shop",
  "version": "2.0.9",
  "dependencies": {
    "left-pad": "1.3.0"
  }
}
"#;
        let result = rewrite(content, &target("package.json"), "2.1.0").unwrap();
        let Rewrite::Changed { current, content: updated } = result else {
            panic!("expected a change");
        };
        assert_eq!(current.as_deref(), Some("2.0.9"));
        assert_eq!(updated, content.replace("\"2.0.9\"", "\"2.1.0\""));
    }

    #[test]
    fn test_single_line_manifest() {
        let content = r#"{"name": "web", "version": "2.0.9", "private": true}"#;
        for path in ["package.json", "composer.json"] {
            let Rewrite::Changed { current, content: updated } = rewrite(content, &target(path), "2.1.0").unwrap() else {
                panic!("expected a change in {}", path);
            };
            assert_eq!(current.as_deref(), Some("2.0.9"));
            assert_eq!(updated, r#"{"name": "web", "version": "2.1.0", "private": true}"#);
        }
    }

    #[test]
    fn test_pubspec_keeps_build_number() {
        let content = "name: app\nversion: 1.2.3+45\nenvironment:\n  sdk: '>=3.0.0'\n";
        let Rewrite::Changed { content: updated, .. } = rewrite(content, &target("pubspec.yaml"), "1.3.0").unwrap() else {
            panic!("expected a change");
        };
        assert!(updated.contains("version: 1.3.0+45\n"));

        let Rewrite::Changed { content: updated, .. } = rewrite(content, &target("pubspec.yaml"), "1.3.0+50").unwrap() else {
            panic!("expected a change");
        };
        assert!(updated.contains("version: 1.3.0+50\n"));
    }

    #[test]
    fn test_laravel_env_default() {
        let content = "return [\n    'name' => env('APP_NAME', 'Shop'),\n    'version' => env('APP_VERSION', '1.0.0'),\n];";
        let targets: Vec<VersionTarget> = builtin_targets()
            .into_iter()
            .filter(|t| t.path == "config/app.php")
            .collect();
        assert_eq!(rewrite(content, &targets[0], "1.1.0").unwrap(), Rewrite::NoMatch);
        let Rewrite::Changed { content: updated, .. } = rewrite(content, &targets[1], "1.1.0").unwrap() else {
            panic!("expected a change");
        };
        assert!(updated.contains("env('APP_VERSION', '1.1.0')"));
        assert!(updated.contains("env('APP_NAME', 'Shop')"));
    }

    #[test]
    fn test_go_and_version_file() {
        let go = "package version\n\nvar Version = \"0.4.1\"\n";
        let Rewrite::Changed { content, .. } = rewrite(go, &target("version.go"), "0.5.0").unwrap() else {
            panic!("expected a change");
        };
        assert!(content.contains("var Version = \"0.5.0\""));

        let Rewrite::Changed { content, .. } = rewrite("0.4.1\n", &target("VERSION"), "0.5.0").unwrap() else {
            panic!("expected a change");
        };
        assert_eq!(content, "0.5.0\n");
    }

    #[test]
    fn test_unchanged_when_already_current() {
        let content = r#"{"version": "3.0.0"}"#;
        let json = VersionTarget::builtin("x.json", r#"(?P<pre>"version"\s*:\s*")(?P<v>[^"]*)(?P<post>")"#);
        assert_eq!(
            rewrite(content, &json, "3.0.0").unwrap(),
            Rewrite::Unchanged {
                current: Some("3.0.0".to_string())
            }
        );
    }

    #[test]
    fn test_expand_template() {
        assert_eq!(expand_template("$1{version}$2", "2.0.0"), "${1}2.0.0${2}");
        assert_eq!(expand_template("${pre}{version}", "1.0.0"), "${pre}1.0.0");
        assert_eq!(expand_template("$$ $name", "1"), "$$ ${name}");
    }

    #[test]
    fn test_custom_numbered_groups() {
        let custom = VersionTarget::from(&VersionFileConfig {
            path: "android/app/build.gradle".to_string(),
            pattern: r#"(versionName ")[^"]*(")"#.to_string(),
            replacement: "$1{version}$2".to_string(),
            major_only: false,
        });
        let content = "defaultConfig {\n    versionCode 7\n    versionName \"1.0.0\"\n}";
        let Rewrite::Changed { current, content } = rewrite(content, &custom, "2.0.0").unwrap() else {
            panic!("expected a change");
        };
        assert!(current.is_none());
        assert!(content.contains("versionName \"2.0.0\""));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let bad = VersionTarget::builtin("x", "(unclosed");
        assert!(rewrite("", &bad, "1.0.0").is_err());
    }
}
