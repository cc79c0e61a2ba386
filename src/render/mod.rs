pub mod checks;
pub mod release;

use anyhow::{Context, Result};
use serde::Serialize;

pub use checks::{render_columns, render_file_sizes, render_inputs, render_relations};
pub use release::{render_changelog, render_version};

/// Machine-readable report for `--format json`
pub fn print_json<T: Serialize>(report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

fn plural(n: usize, word: &str) -> String {
    format!("{} {}{}", n, word, if n == 1 { "" } else { "s" })
}
