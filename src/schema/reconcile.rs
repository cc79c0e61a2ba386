use std::collections::BTreeSet;

use serde::Serialize;

use super::migration::TableSchema;
use super::model::ModelInfo;
use crate::config::ColumnsConfig;
use crate::models::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchCategory {
    /// Column exists in the schema but is not mass assignable
    MissingFromModel,
    /// Fillable attribute with no column; fails at runtime
    MissingFromSchema,
    /// Cast declared for a column that does not exist
    CastNotInSchema,
}

impl MismatchCategory {
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingFromModel => "In schema, not in $fillable",
            Self::MissingFromSchema => "In $fillable, not in schema",
            Self::CastNotInSchema => "In $casts, not in schema",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub table: String,
    pub model: String,
    pub column: String,
    pub category: MismatchCategory,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnsReport {
    pub mismatches: Vec<Mismatch>,
    /// Tables with a create migration but no matching model
    pub unmatched_tables: Vec<String>,
    /// Models skipped because they declare no `$fillable`
    pub skipped_models: Vec<String>,
    pub tables_checked: usize,
}

impl ColumnsReport {
    pub fn has_blocking(&self) -> bool {
        self.mismatches.iter().any(|m| m.severity.is_blocking())
    }

    pub fn of_category(&self, category: MismatchCategory) -> impl Iterator<Item = &Mismatch> {
        self.mismatches.iter().filter(move |m| m.category == category)
    }
}

/// Compare one table's final columns against the model declaring it.
/// Returns `None` when the model declares no `$fillable`.
pub fn reconcile(schema: &TableSchema, model: &ModelInfo, config: &ColumnsConfig) -> Option<Vec<Mismatch>> {
    if model.fillable.is_empty() {
        return None;
    }

    let fillable: BTreeSet<&str> = model.fillable.iter().map(String::as_str).collect();
    let entry = |column: &str, category, severity| Mismatch {
        table: schema.table.clone(),
        model: model.class_name.clone(),
        column: column.to_string(),
        category,
        severity,
    };

    let missing_from_model: Vec<&String> = schema
        .columns
        .iter()
        .filter(|c| !fillable.contains(c.as_str()))
        .filter(|c| !config.ignored_columns.contains(*c))
        .filter(|c| !is_related_foreign_key(c, model))
        .collect();

    let model_severity = if missing_from_model.len() > config.high_severity_threshold {
        Severity::High
    } else {
        Severity::Medium
    };

    let mut out: Vec<Mismatch> = missing_from_model
        .into_iter()
        .map(|c| entry(c.as_str(), MismatchCategory::MissingFromModel, model_severity))
        .collect();

    out.extend(
        model
            .fillable
            .iter()
            .filter(|c| !schema.has_column(c))
            .map(|c| entry(c.as_str(), MismatchCategory::MissingFromSchema, Severity::High)),
    );

    out.extend(
        model
            .casts
            .iter()
            .filter(|c| !schema.has_column(c))
            .map(|c| entry(c.as_str(), MismatchCategory::CastNotInSchema, Severity::Low)),
    );

    Some(out)
}

/// `author_id` is covered when the model exposes an `author()` relationship
fn is_related_foreign_key(column: &str, model: &ModelInfo) -> bool {
    let Some(base) = column.strip_suffix("_id") else {
        return false;
    };
    let camel = camel(base);
    model.has_relationship(base) || model.has_relationship(&camel)
}

fn camel(snake: &str) -> String {
    let studly = super::naming::studly(snake);
    let mut chars = studly.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::Relationship;

    fn schema(columns: &[&str]) -> TableSchema {
        TableSchema {
            table: "users".to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            implicit: ["created_at", "updated_at"].iter().map(|c| c.to_string()).collect(),
            migrations: vec![],
        }
    }

    fn model(fillable: &[&str], casts: &[&str]) -> ModelInfo {
        ModelInfo {
            class_name: "User".to_string(),
            fillable: fillable.iter().map(|c| c.to_string()).collect(),
            casts: casts.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_age_reported_once() {
        let config = ColumnsConfig::default();
        let result = reconcile(&schema(&["name", "email", "age"]), &model(&["name", "email"], &[]), &config)
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].column, "age");
        assert_eq!(result[0].category, MismatchCategory::MissingFromModel);
        assert_eq!(result[0].severity, Severity::Medium);
        assert!(!result.iter().any(|m| m.category == MismatchCategory::MissingFromSchema));
    }

    #[test]
    fn test_empty_fillable_skips() {
        let config = ColumnsConfig::default();
        assert!(reconcile(&schema(&["name"]), &model(&[], &["name"]), &config).is_none());
    }

    #[test]
    fn test_fillable_not_in_schema_is_high() {
        let config = ColumnsConfig::default();
        let result = reconcile(&schema(&["name"]), &model(&["name", "nickname"], &[]), &config).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].column, "nickname");
        assert_eq!(result[0].severity, Severity::High);
    }

    #[test]
    fn test_many_missing_columns_escalate() {
        let config = ColumnsConfig::default();
        let result = reconcile(
            &schema(&["name", "a", "b", "c", "d"]),
            &model(&["name"], &[]),
            &config,
        )
        .unwrap();
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|m| m.severity == Severity::High));
    }

    #[test]
    fn test_casts_and_whitelist() {
        let config = ColumnsConfig::default();
        let result = reconcile(
            &schema(&["id", "name", "password", "remember_token"]),
            &model(&["name"], &["created_at", "settings"]),
            &config,
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].column, "settings");
        assert_eq!(result[0].category, MismatchCategory::CastNotInSchema);
        assert_eq!(result[0].severity, Severity::Low);
    }

    #[test]
    fn test_foreign_key_covered_by_relationship() {
        let config = ColumnsConfig::default();
        let mut m = model(&["title"], &[]);
        m.relationships.push(Relationship {
            method: "blogAuthor".to_string(),
            kind: "BelongsTo".to_string(),
        });
        let result = reconcile(&schema(&["title", "blog_author_id", "team_id"]), &m, &config).unwrap();
        let columns: Vec<&str> = result.iter().map(|m| m.column.as_str()).collect();
        assert_eq!(columns, vec!["team_id"]);
    }

    #[test]
    fn test_report_blocking() {
        let mut report = ColumnsReport::default();
        assert!(!report.has_blocking());
        report.mismatches.push(Mismatch {
            table: "users".to_string(),
            model: "User".to_string(),
            column: "x".to_string(),
            category: MismatchCategory::MissingFromSchema,
            severity: Severity::High,
        });
        assert!(report.has_blocking());
        assert_eq!(report.of_category(MismatchCategory::MissingFromSchema).count(), 1);
    }
}
