use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;
use serde::Serialize;

use super::naming::class_basename;
use crate::source::{array_after, delimited_body, files_with_extension, quoted_strings, read_lossy, strip_comments};

/// Attributes declared on one Eloquent model
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelInfo {
    pub class_name: String,
    #[serde(skip)]
    pub path: PathBuf,
    /// Explicit `protected $table`
    pub table: Option<String>,
    pub fillable: Vec<String>,
    pub guarded: Vec<String>,
    pub casts: Vec<String>,
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub method: String,
    /// Relationship type, e.g. `BelongsTo`
    pub kind: String,
}

impl ModelInfo {
    pub fn parse(path: &Path, source: &str, relationship_types: &[String], skip_methods: &[String]) -> Self {
        let source = strip_comments(source);
        let class_name = class_name(&source).unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        });

        Self {
            class_name,
            path: path.to_path_buf(),
            table: table_override(&source),
            fillable: fillable(&source),
            guarded: guarded(&source),
            casts: casts(&source),
            relationships: relationship_methods(&source, relationship_types, skip_methods),
        }
    }

    pub fn has_relationship(&self, method: &str) -> bool {
        self.relationships.iter().any(|r| r.method == method)
    }
}

/// Directory holding the models: the configured one, else `app/`
pub fn resolve_models_dir(base: &Path, configured: &str) -> Result<PathBuf> {
    let primary = base.join(configured);
    if primary.is_dir() {
        return Ok(primary);
    }

    let fallback = base.join("app");
    if fallback.is_dir() {
        return Ok(fallback);
    }

    bail!("Models directory not found: {}", primary.display())
}

pub fn load_models(dir: &Path, relationship_types: &[String], skip_methods: &[String]) -> Vec<ModelInfo> {
    files_with_extension(dir, "php")
        .into_iter()
        .filter_map(|path| {
            let source = read_lossy(&path)?;
            if class_name(&source).is_none() {
                return None;
            }
            Some(ModelInfo::parse(&path, &source, relationship_types, skip_methods))
        })
        .collect()
}

static CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|[\s;])(?:(?:final|abstract|readonly)\s+)*class\s+(\w+)").expect("static regex")
});

static TABLE_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"protected\s+\$table\s*=\s*['"]([^'"]+)['"]"#).expect("static regex")
});

static ARRAY_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]\s*=>"#).expect("static regex"));
static CASTS_PROPERTY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$casts\s*=").expect("static regex"));
static CASTS_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"function\s+casts\s*\(\s*\)[^{]*").expect("static regex"));
static RETURN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"return\s*").expect("static regex"));

static PUBLIC_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+function\s+(\w+)\s*\(\s*\)\s*(?::\s*\??([\w\\]+))?\s*").expect("static regex")
});
static RELATION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"return\s+\$this\s*->\s*(\w+)\s*\(").expect("static regex"));

pub fn class_name(source: &str) -> Option<String> {
    CLASS.captures(source).map(|c| c[1].to_string())
}

pub fn table_override(source: &str) -> Option<String> {
    TABLE_PROPERTY.captures(source).map(|c| c[1].to_string())
}

fn property_list(source: &str, property: &str) -> Vec<String> {
    let pattern = format!(r"\${}\s*=", property);
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    array_after(source, &re).map(quoted_strings).unwrap_or_default()
}

pub fn fillable(source: &str) -> Vec<String> {
    property_list(source, "fillable")
}

pub fn guarded(source: &str) -> Vec<String> {
    property_list(source, "guarded")
}

/// Keys of `$casts` and of a `casts()` method, merged in declaration order
pub fn casts(source: &str) -> Vec<String> {
    let mut bodies: Vec<&str> = Vec::new();
    if let Some(body) = array_after(source, &CASTS_PROPERTY) {
        bodies.push(body);
    }
    if let Some(m) = CASTS_METHOD.find(source) {
        if let Some(body) = delimited_body(source, m.end()) {
            if let Some(array) = array_after(body, &RETURN) {
                bodies.push(array);
            }
        }
    }

    let mut keys: Vec<String> = Vec::new();
    for body in bodies {
        for caps in ARRAY_KEY.captures_iter(body) {
            let name = caps[1].to_string();
            if !keys.contains(&name) {
                keys.push(name);
            }
        }
    }
    keys
}

/// Public methods that return a relationship, by declared return type or by
/// a `return $this->hasMany(...)`-style body.
pub fn relationship_methods(source: &str, relationship_types: &[String], skip_methods: &[String]) -> Vec<Relationship> {
    let mut found = Vec::new();
    for caps in PUBLIC_METHOD.captures_iter(source) {
        let name = caps[1].to_string();
        if skip_methods.contains(&name) || found.iter().any(|r: &Relationship| r.method == name) {
            continue;
        }

        let declared = caps
            .get(2)
            .map(|m| class_basename(m.as_str()).to_string())
            .filter(|t| relationship_types.contains(t));

        let kind = declared.or_else(|| {
            let end = caps.get(0)?.end();
            if source.as_bytes().get(end) != Some(&b'{') {
                return None;
            }
            let body = delimited_body(source, end)?;
            RELATION_CALL
                .captures_iter(body)
                .map(|c| upper_first(&c[1]))
                .find(|t| relationship_types.contains(t))
        });

        if let Some(kind) = kind {
            found.push(Relationship { method: name, kind });
        }
    }
    found
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
