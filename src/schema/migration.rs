use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::naming::{class_basename, snake};
use crate::source::{delimited_body, files_with_extension, quoted_strings, read_lossy, strip_comments};

/// Column-type declaration calls on a Blueprint that add a named column
const COLUMN_TYPES: &[&str] = &[
    "bigIncrements", "bigInteger", "binary", "boolean", "char", "date", "dateTime",
    "dateTimeTz", "decimal", "double", "enum", "float", "foreignId", "foreignUlid",
    "foreignUuid", "geography", "geometry", "increments", "integer", "ipAddress", "json",
    "jsonb", "lineString", "longText", "macAddress", "mediumIncrements", "mediumInteger",
    "mediumText", "multiLineString", "multiPoint", "multiPolygon", "point", "polygon", "set",
    "smallIncrements", "smallInteger", "string", "text", "time", "timeTz", "timestamp",
    "timestampTz", "tinyIncrements", "tinyInteger", "tinyText", "ulid", "unsignedBigInteger",
    "unsignedDecimal", "unsignedInteger", "unsignedMediumInteger", "unsignedSmallInteger",
    "unsignedTinyInteger", "uuid", "vector", "year",
];

const MORPHS: &[&str] = &[
    "morphs",
    "nullableMorphs",
    "uuidMorphs",
    "nullableUuidMorphs",
    "ulidMorphs",
    "nullableUlidMorphs",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOp {
    Add(String),
    Rename { from: String, to: String },
    Drop(String),
}

#[derive(Debug, Clone)]
pub struct MigrationFile {
    pub path: PathBuf,
    pub name: String,
    /// Source with comments removed
    pub source: String,
}

impl MigrationFile {
    pub fn new(name: impl Into<String>, source: &str) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            source: strip_comments(source),
        }
    }
}

/// Final column set of one table after replaying its migrations
#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: BTreeSet<String>,
    /// Implicit timestamp/soft-delete columns that were present, kept apart
    pub implicit: BTreeSet<String>,
    pub migrations: Vec<String>,
}

impl TableSchema {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column) || self.implicit.contains(column)
    }
}

pub fn load_migrations(dir: &Path) -> Result<Vec<MigrationFile>> {
    if !dir.is_dir() {
        bail!("Migrations directory not found: {}", dir.display());
    }

    let files = files_with_extension(dir, "php")
        .into_iter()
        .filter_map(|path| {
            let source = read_lossy(&path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            Some(MigrationFile {
                source: strip_comments(&source),
                path,
                name,
            })
        })
        .collect();

    Ok(files)
}

static UP_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"function\s+up\s*\([^)]*\)[^{]*").expect("static regex"));

static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Schema::(?:connection\([^)]*\)->)?create\(\s*['"]([^'"]+)['"]"#).expect("static regex")
});

static DROP_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Schema::(?:connection\([^)]*\)->)?drop(?:IfExists)?\(\s*['"]([^'"]+)['"]"#)
        .expect("static regex")
});

/// `$table->method(`; the argument list is taken by delimiter matching
static BLUEPRINT_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\w+\s*->\s*(\w+)\s*\(").expect("static regex"));

static CLASS_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([\w\\]+)::class").expect("static regex"));

/// Body of the `up()` method, or the whole source when there is none.
/// `down()` is never part of the result.
pub fn up_body(source: &str) -> &str {
    match UP_FUNCTION.find(source) {
        Some(m) => delimited_body(source, m.end()).unwrap_or(""),
        None => source,
    }
}

pub fn created_tables(source: &str) -> Vec<String> {
    CREATE_TABLE
        .captures_iter(up_body(source))
        .map(|c| c[1].to_string())
        .collect()
}

fn dropped_tables(body: &str) -> Vec<String> {
    DROP_TABLE.captures_iter(body).map(|c| c[1].to_string()).collect()
}

/// Plain string-literal containment, the heuristic used to pick candidate files
pub fn references_table(source: &str, table: &str) -> bool {
    source.contains(&format!("'{}'", table)) || source.contains(&format!("\"{}\"", table))
}

fn schema_block_regex(table: &str) -> Option<Regex> {
    let pattern = format!(
        r#"Schema::(?:connection\([^)]*\)->)?(?:create|table)\s*(\()\s*['"]{}['"]"#,
        regex::escape(table)
    );
    Regex::new(&pattern).ok()
}

fn blocks_matching<'a>(body: &'a str, re: &Regex) -> Vec<&'a str> {
    re.captures_iter(body)
        .filter_map(|c| c.get(1))
        .filter_map(|open| delimited_body(body, open.start()))
        .collect()
}

/// Argument lists of `Schema::create/table('<table>', ...)` calls in `body`
pub fn schema_blocks<'a>(body: &'a str, table: &str) -> Vec<&'a str> {
    match schema_block_regex(table) {
        Some(re) => blocks_matching(body, &re),
        None => Vec::new(),
    }
}

/// Column operations in a schema block, in source order
pub fn parse_operations(block: &str) -> Vec<ColumnOp> {
    let mut ops = Vec::new();

    for caps in BLUEPRINT_CALL.captures_iter(block) {
        let (Some(whole), Some(method)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(args) = delimited_body(block, whole.end() - 1) else {
            continue;
        };
        let method = method.as_str();
        let strings = quoted_strings(args);
        let first = strings.first().cloned();

        match method {
            "id" => ops.push(ColumnOp::Add(first.unwrap_or_else(|| "id".to_string()))),
            "timestamps" | "timestampsTz" | "nullableTimestamps" => {
                ops.push(ColumnOp::Add("created_at".to_string()));
                ops.push(ColumnOp::Add("updated_at".to_string()));
            }
            "softDeletes" | "softDeletesTz" => {
                ops.push(ColumnOp::Add(first.unwrap_or_else(|| "deleted_at".to_string())))
            }
            "rememberToken" => ops.push(ColumnOp::Add("remember_token".to_string())),
            m if MORPHS.contains(&m) => {
                if let Some(name) = first {
                    ops.push(ColumnOp::Add(format!("{}_id", name)));
                    ops.push(ColumnOp::Add(format!("{}_type", name)));
                }
            }
            "foreignIdFor" => {
                let column = strings.first().cloned().or_else(|| {
                    CLASS_REF
                        .captures(args)
                        .map(|c| format!("{}_id", snake(class_basename(&c[1]))))
                });
                if let Some(column) = column {
                    ops.push(ColumnOp::Add(column));
                }
            }
            m if COLUMN_TYPES.contains(&m) => {
                if let Some(name) = first {
                    ops.push(ColumnOp::Add(name));
                }
            }
            "renameColumn" => {
                if let [from, to, ..] = strings.as_slice() {
                    ops.push(ColumnOp::Rename {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
            }
            "dropColumn" | "dropColumns" | "dropConstrainedForeignId" => {
                ops.extend(strings.into_iter().map(ColumnOp::Drop));
            }
            "dropConstrainedForeignIdFor" => {
                if let Some(c) = CLASS_REF.captures(args) {
                    ops.push(ColumnOp::Drop(format!("{}_id", snake(class_basename(&c[1])))));
                }
            }
            "dropMorphs" => {
                if let Some(name) = first {
                    ops.push(ColumnOp::Drop(format!("{}_id", name)));
                    ops.push(ColumnOp::Drop(format!("{}_type", name)));
                }
            }
            "dropTimestamps" | "dropTimestampsTz" => {
                ops.push(ColumnOp::Drop("created_at".to_string()));
                ops.push(ColumnOp::Drop("updated_at".to_string()));
            }
            "dropSoftDeletes" | "dropSoftDeletesTz" => {
                ops.push(ColumnOp::Drop(first.unwrap_or_else(|| "deleted_at".to_string())))
            }
            "dropRememberToken" => ops.push(ColumnOp::Drop("remember_token".to_string())),
            _ => {}
        }
    }

    ops
}

pub fn apply_operations(columns: &mut BTreeSet<String>, ops: &[ColumnOp]) {
    for op in ops {
        match op {
            ColumnOp::Add(name) => {
                columns.insert(name.clone());
            }
            ColumnOp::Rename { from, to } => {
                columns.remove(from);
                columns.insert(to.clone());
            }
            ColumnOp::Drop(name) => {
                columns.remove(name);
            }
        }
    }
}

/// A migration with its `up()` body and table-level statements extracted once
struct ScannedMigration<'a> {
    file: &'a MigrationFile,
    up: &'a str,
    created: Vec<String>,
    dropped: Vec<String>,
}

fn scan(files: &[MigrationFile]) -> Vec<ScannedMigration<'_>> {
    files
        .iter()
        .map(|file| {
            let up = up_body(&file.source);
            ScannedMigration {
                file,
                up,
                created: CREATE_TABLE.captures_iter(up).map(|c| c[1].to_string()).collect(),
                dropped: dropped_tables(up),
            }
        })
        .collect()
}

/// Replay every migration touching `table` in file-name order.
/// Returns `None` when no migration creates the table, or a later one drops it.
pub fn table_columns(files: &[MigrationFile], table: &str, implicit: &[String]) -> Option<TableSchema> {
    replay(&scan(files), table, implicit)
}

fn replay(scanned: &[ScannedMigration], table: &str, implicit: &[String]) -> Option<TableSchema> {
    let create_idx = scanned
        .iter()
        .position(|m| m.created.iter().any(|t| t == table))?;
    let block_re = schema_block_regex(table)?;

    let mut columns = BTreeSet::new();
    let mut applied = Vec::new();

    for (idx, migration) in scanned.iter().enumerate().skip(create_idx) {
        let file = migration.file;
        if idx != create_idx && !references_table(&file.source, table) {
            continue;
        }

        if idx > create_idx && migration.dropped.iter().any(|t| t == table) {
            if !migration.created.iter().any(|t| t == table) {
                debug!("{} dropped in {}", table, file.name);
                return None;
            }
            columns.clear();
        }

        let blocks = blocks_matching(migration.up, &block_re);
        if blocks.is_empty() {
            debug!("{} mentions '{}' outside any schema block", file.name, table);
            continue;
        }

        for block in blocks {
            apply_operations(&mut columns, &parse_operations(block));
        }
        applied.push(file.name.clone());
    }

    let mut stripped = BTreeSet::new();
    for name in implicit {
        if columns.remove(name) {
            stripped.insert(name.clone());
        }
    }

    Some(TableSchema {
        table: table.to_string(),
        columns,
        implicit: stripped,
        migrations: applied,
    })
}

/// Final schema for every table that has a create migration
pub fn collect_schemas(files: &[MigrationFile], implicit: &[String]) -> Vec<TableSchema> {
    let scanned = scan(files);

    let mut tables: Vec<&str> = Vec::new();
    for migration in &scanned {
        for table in &migration.created {
            if !tables.contains(&table.as_str()) {
                tables.push(table);
            }
        }
    }

    tables
        .iter()
        .filter_map(|table| replay(&scanned, table, implicit))
        .collect()
}
