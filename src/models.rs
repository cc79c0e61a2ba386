use chrono::{DateTime, Local};
use git2::Oid;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn is_blocking(&self) -> bool {
        *self == Self::High
    }
}

/// Result of a single command run, mapped to the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    Issues,
}

impl Outcome {
    pub fn from_blocking(blocking: bool) -> Self {
        if blocking {
            Self::Issues
        } else {
            Self::Clean
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::Issues => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: Oid,
    pub short_id: String,
    pub subject: String,
    pub author: String,
    pub time: DateTime<Local>,
    pub parents: Vec<Oid>,
}

impl CommitInfo {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1 || self.subject.starts_with("Merge ")
    }
}
