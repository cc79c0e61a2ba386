pub mod migration;
pub mod model;
pub mod naming;
pub mod reconcile;
pub mod relations;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::debug;

use crate::config::Config;
use crate::source::read_lossy;
use migration::{collect_schemas, load_migrations};
use model::{load_models, resolve_models_dir, ModelInfo};
use naming::model_for_table;
use reconcile::{reconcile, ColumnsReport};
use relations::{detect_conflicts, ConflictReport};

/// Replay all migrations under `base` and reconcile each table with its model
pub fn check_columns(base: &Path, config: &Config) -> Result<ColumnsReport> {
    let columns = &config.columns;
    let migrations = load_migrations(&base.join(&columns.migrations_dir))?;
    let models_dir = resolve_models_dir(base, &columns.models_dir)?;
    let models = load_models(
        &models_dir,
        &config.relations.relationship_types,
        &config.relations.skip_methods,
    );

    debug!(
        "loaded {} migrations and {} models",
        migrations.len(),
        models.len()
    );

    let mut report = ColumnsReport::default();
    for schema in collect_schemas(&migrations, &columns.implicit_columns) {
        let Some(model) = find_model(&models, &schema.table) else {
            report.unmatched_tables.push(schema.table.clone());
            continue;
        };

        match reconcile(&schema, model, columns) {
            Some(mismatches) => {
                report.tables_checked += 1;
                report.mismatches.extend(mismatches);
            }
            None => report.skipped_models.push(model.class_name.clone()),
        }
    }

    Ok(report)
}

/// Model for a table: an explicit `$table` wins over the naming convention
pub fn find_model<'a>(models: &'a [ModelInfo], table: &str) -> Option<&'a ModelInfo> {
    if let Some(model) = models.iter().find(|m| m.table.as_deref() == Some(table)) {
        return Some(model);
    }

    let expected = model_for_table(table);
    models
        .iter()
        .find(|m| m.table.is_none() && m.class_name == expected)
}

/// Check the given model files, or every model when `files` is empty
pub fn check_relations(base: &Path, files: &[PathBuf], config: &Config) -> Result<ConflictReport> {
    let rel = &config.relations;
    let models: Vec<ModelInfo> = if files.is_empty() {
        let dir = resolve_models_dir(base, &config.columns.models_dir)?;
        load_models(&dir, &rel.relationship_types, &rel.skip_methods)
    } else {
        let mut models = Vec::new();
        for path in files {
            if !path.is_file() {
                bail!("Model file not found: {}", path.display());
            }
            if let Some(source) = read_lossy(path) {
                models.push(ModelInfo::parse(path, &source, &rel.relationship_types, &rel.skip_methods));
            }
        }
        models
    };

    let mut report = ConflictReport::default();
    for model in &models {
        report.extend(detect_conflicts(model));
    }
    Ok(report)
}
