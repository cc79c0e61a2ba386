use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".relkit.yml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub columns: ColumnsConfig,

    #[serde(default)]
    pub relations: RelationsConfig,

    #[serde(default)]
    pub inputs: InputsConfig,

    #[serde(default)]
    pub filesize: FileSizeConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub version: VersionConfig,
}

impl Config {
    /// Load `path`, or `.relkit.yml` under `base` when no explicit path is given.
    /// A missing default file yields the built-in defaults.
    pub fn load(base: &Path, path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path(base),
        };

        if !config_path.exists() {
            if path.is_some() {
                anyhow::bail!("Config file not found: {}", config_path.display());
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn config_path(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub migrations_dir: String,
    pub models_dir: String,
    /// Columns never expected in `$fillable`
    pub ignored_columns: Vec<String>,
    /// Columns added implicitly by timestamp/soft-delete helpers
    pub implicit_columns: Vec<String>,
    /// Above this many missing fillable columns a table is reported as high severity
    pub high_severity_threshold: usize,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            migrations_dir: "database/migrations".to_string(),
            models_dir: "app/Models".to_string(),
            ignored_columns: strings(&[
                "id",
                "uuid",
                "password",
                "remember_token",
                "email_verified_at",
                "two_factor_secret",
                "two_factor_recovery_codes",
                "two_factor_confirmed_at",
            ]),
            implicit_columns: strings(&["created_at", "updated_at", "deleted_at"]),
            high_severity_threshold: 3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RelationsConfig {
    pub relationship_types: Vec<String>,
    pub skip_methods: Vec<String>,
}

impl Default for RelationsConfig {
    fn default() -> Self {
        Self {
            relationship_types: strings(&[
                "HasOne",
                "HasMany",
                "BelongsTo",
                "BelongsToMany",
                "HasOneThrough",
                "HasManyThrough",
                "MorphTo",
                "MorphOne",
                "MorphMany",
                "MorphToMany",
                "MorphedByMany",
            ]),
            skip_methods: strings(&[
                "boot",
                "booted",
                "casts",
                "newFactory",
                "getRouteKeyName",
                "toArray",
                "toSearchableArray",
            ]),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Native element name mapped to the design-system component replacing it
    #[serde(with = "ordered_map")]
    pub components: Vec<(String, String)>,
    pub ignore_marker: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            include: strings(&["resources/views/**/*.blade.php"]),
            exclude: strings(&["resources/views/components/**", "resources/views/vendor/**"]),
            components: pairs(&[
                ("input", "x-input"),
                ("select", "x-select"),
                ("textarea", "x-textarea"),
                ("button", "x-button"),
            ]),
            ignore_marker: "relkit-ignore".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FileSizeConfig {
    pub max_lines: usize,
    pub include: Vec<String>,
    pub skip_dirs: Vec<String>,
}

impl Default for FileSizeConfig {
    fn default() -> Self {
        Self {
            max_lines: 500,
            include: strings(&[
                "**/*.php",
                "**/*.dart",
                "**/*.go",
                "**/*.{ts,tsx,js,jsx,vue}",
            ]),
            skip_dirs: strings(&[
                "vendor",
                "node_modules",
                ".git",
                "build",
                ".dart_tool",
                "storage",
                "dist",
            ]),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkStyle {
    #[default]
    Full,
    Short,
    None,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    pub path: String,
    pub link_style: LinkStyle,
    /// Overrides the URL derived from the `origin` remote
    pub repository_url: Option<String>,
    pub highlights: bool,
    #[serde(with = "ordered_map")]
    pub keywords: Vec<(String, String)>,
    /// Subjects containing any of these are left out
    pub noise: Vec<String>,
    /// Additional commit type labels, appended after the built-in categories
    #[serde(with = "ordered_map")]
    pub types: Vec<(String, String)>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            path: "CHANGELOG.md".to_string(),
            link_style: LinkStyle::default(),
            repository_url: None,
            highlights: true,
            keywords: pairs(&[
                ("security", "Security improvements"),
                ("performance", "Performance improvements"),
                ("api", "API changes"),
                ("migration", "Database changes"),
                ("ui", "User interface updates"),
                ("dependenc", "Dependency updates"),
            ]),
            noise: strings(&["[skip ci]", "chore(release)"]),
            types: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VersionConfig {
    pub files: Vec<VersionFileConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionFileConfig {
    pub path: String,
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub major_only: bool,
}

/// YAML mappings deserialized as ordered key/value pairs
mod ordered_map {
    use serde::de::{MapAccess, Visitor};
    use serde::Deserializer;
    use std::fmt;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairVisitor;

        impl<'de> Visitor<'de> for PairVisitor {
            type Value = Vec<(String, String)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::new();
                while let Some((k, v)) = map.next_entry::<String, String>()? {
                    out.push((k, v));
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(PairVisitor)
    }
}
