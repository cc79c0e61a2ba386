use serde::Serialize;

use super::model::ModelInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSource {
    Fillable,
    Casts,
    Guarded,
}

impl ConflictSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fillable => "$fillable",
            Self::Casts => "$casts",
            Self::Guarded => "$guarded",
        }
    }
}

/// A relationship accessor whose name is also declared as an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub model: String,
    pub method: String,
    pub relationship: String,
    pub source: ConflictSource,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConflictReport {
    pub errors: Vec<Conflict>,
    pub warnings: Vec<Conflict>,
    pub models_checked: usize,
}

impl ConflictReport {
    pub fn has_blocking(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn extend(&mut self, other: ConflictReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.models_checked += other.models_checked;
    }
}

/// Attribute access and relationship access share `$model->name`; a fillable
/// or cast attribute with the same name shadows the relationship.
pub fn detect_conflicts(model: &ModelInfo) -> ConflictReport {
    let mut report = ConflictReport {
        models_checked: 1,
        ..Default::default()
    };

    for rel in &model.relationships {
        let conflict = |source| Conflict {
            model: model.class_name.clone(),
            method: rel.method.clone(),
            relationship: rel.kind.clone(),
            source,
        };

        if model.fillable.contains(&rel.method) {
            report.errors.push(conflict(ConflictSource::Fillable));
        } else if model.casts.contains(&rel.method) {
            report.errors.push(conflict(ConflictSource::Casts));
        } else if model.guarded.contains(&rel.method) {
            report.warnings.push(conflict(ConflictSource::Guarded));
        }
    }

    report
}
