pub mod changelog;
pub mod config;
pub mod git;
pub mod lint;
pub mod models;
pub mod render;
pub mod schema;
pub mod source;
pub mod version;

pub use changelog::{generate_changelog, ChangelogOptions};
pub use config::Config;
pub use lint::{check_file_sizes, check_native_inputs};
pub use models::{Outcome, OutputFormat, Severity};
pub use schema::{check_columns, check_relations};
pub use version::{update_versions, UpdateOptions};
