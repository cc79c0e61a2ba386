use colored::Colorize;

use super::plural;
use crate::changelog::ChangelogResult;
use crate::version::{FileStatus, VersionReport};

pub fn render_changelog(result: &ChangelogResult, dry_run: bool) {
    let since = result.previous_tag.as_deref().unwrap_or("the first commit");

    let Some(section) = &result.section else {
        println!("{} No changes since {}, nothing to add", "✓".green(), since);
        return;
    };

    if dry_run {
        println!("{}", section.trim_end());
        println!();
        println!(
            "{} {}",
            "Dry run:".yellow(),
            format!("{} not written", result.path.display()).dimmed()
        );
        return;
    }

    println!(
        "{} Added {} to {} ({} since {})",
        "✓".green(),
        result.version.green().bold(),
        result.path.display(),
        plural(result.included, "commit"),
        since
    );
    if result.excluded > 0 {
        println!("   {}", format!("{} skipped (merges, release noise)", result.excluded).dimmed());
    }
}

pub fn render_version(report: &VersionReport) {
    let project = report.project.map(|p| p.name()).unwrap_or("generic");
    let previous = report
        .previous
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!(
        "{} {} → {} {}",
        "VERSION".bold(),
        previous.dimmed(),
        report.version.to_string().green().bold(),
        format!("({})", project).dimmed()
    );

    let new_version = report.version.to_string();
    for change in &report.changes {
        let from = change.from.as_deref().unwrap_or("?");
        match change.status {
            FileStatus::Updated => println!(
                "   {} {}: {} → {}",
                "✓".green(),
                change.path,
                from.dimmed(),
                new_version.green()
            ),
            FileStatus::Unchanged => println!(
                "   {} {}: {}",
                "=".dimmed(),
                change.path,
                "already up to date".dimmed()
            ),
            FileStatus::SkippedMinor => println!(
                "   {} {}: {}",
                "-".dimmed(),
                change.path,
                "major-only, skipped".dimmed()
            ),
            FileStatus::NoMatch => println!(
                "   {} {}: {}",
                "!".yellow(),
                change.path,
                "no version pattern matched".yellow()
            ),
        }
    }

    println!();
    if report.dry_run {
        println!(
            "{} {}",
            "Dry run:".yellow(),
            format!("{} would change, nothing written", plural(report.updated(), "file")).dimmed()
        );
    } else {
        println!("{} Updated {}", "✓".green(), plural(report.updated(), "file"));
    }

    if let Some(tag) = &report.tag {
        println!("{} Created tag {}", "✓".green(), tag.cyan());
    }
}
