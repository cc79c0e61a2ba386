use colored::{ColoredString, Colorize};

use super::plural;
use crate::lint::{FileSizeReport, InputsReport};
use crate::models::Severity;
use crate::schema::reconcile::{ColumnsReport, Mismatch, MismatchCategory};
use crate::schema::relations::ConflictReport;

fn severity_tag(severity: Severity) -> ColoredString {
    let tag = format!("[{}]", severity.label());
    match severity {
        Severity::High => tag.red().bold(),
        Severity::Medium => tag.yellow(),
        Severity::Low => tag.dimmed(),
    }
}

pub fn render_columns(report: &ColumnsReport) {
    println!("{} ({} checked)", "COLUMNS".bold(), plural(report.tables_checked, "table"));

    for category in [
        MismatchCategory::MissingFromSchema,
        MismatchCategory::MissingFromModel,
        MismatchCategory::CastNotInSchema,
    ] {
        let items: Vec<&Mismatch> = report.of_category(category).collect();
        if items.is_empty() {
            continue;
        }

        println!();
        println!("{}", category.title().bold());

        // One line per table, columns joined
        let mut i = 0;
        while i < items.len() {
            let table = &items[i].table;
            let group: Vec<&Mismatch> = items[i..].iter().take_while(|m| &m.table == table).copied().collect();
            let columns: Vec<&str> = group.iter().map(|m| m.column.as_str()).collect();
            let marker = if group[0].severity.is_blocking() {
                "✗".red()
            } else {
                "!".yellow()
            };
            println!(
                "   {} {} {}: {} {}",
                marker,
                table.cyan(),
                format!("({})", group[0].model).dimmed(),
                columns.join(", "),
                severity_tag(group[0].severity)
            );
            i += group.len();
        }
    }

    if !report.unmatched_tables.is_empty() {
        println!();
        println!("{}", "No matching model".bold());
        println!("   {}", report.unmatched_tables.join(", ").dimmed());
    }

    if !report.skipped_models.is_empty() {
        println!();
        println!("{}", "Skipped (no $fillable)".bold());
        println!("   {}", report.skipped_models.join(", ").dimmed());
    }

    println!();
    if report.mismatches.is_empty() {
        println!("{} Models and migrations agree", "✓".green());
    } else {
        let high = report.mismatches.iter().filter(|m| m.severity == Severity::High).count();
        let marker = if high > 0 { "✗".red() } else { "!".yellow() };
        let n = report.mismatches.len();
        println!(
            "{} {} {} ({} high)",
            marker,
            n,
            if n == 1 { "mismatch" } else { "mismatches" },
            high
        );
    }
}

pub fn render_relations(report: &ConflictReport) {
    println!("{} ({} checked)", "RELATIONS".bold(), plural(report.models_checked, "model"));

    for conflict in &report.errors {
        println!(
            "   {} {}::{}() {} is also in {}",
            "✗".red(),
            conflict.model.cyan(),
            conflict.method,
            format!("[{}]", conflict.relationship).dimmed(),
            conflict.source.label()
        );
    }

    for conflict in &report.warnings {
        println!(
            "   {} {}::{}() {} is also in {}",
            "!".yellow(),
            conflict.model.cyan(),
            conflict.method,
            format!("[{}]", conflict.relationship).dimmed(),
            conflict.source.label()
        );
    }

    if !report.errors.is_empty() {
        println!(
            "   {}",
            "Attribute access shadows the relationship; rename one of them".dimmed()
        );
    }

    println!();
    match (report.errors.len(), report.warnings.len()) {
        (0, 0) => println!("{} No relationship conflicts", "✓".green()),
        (0, w) => println!("{} {}", "!".yellow(), plural(w, "warning")),
        (e, w) => println!("{} {}, {}", "✗".red(), plural(e, "conflict"), plural(w, "warning")),
    }
}

pub fn render_inputs(report: &InputsReport, warn_only: bool) {
    println!("{} ({} checked)", "NATIVE INPUTS".bold(), plural(report.files_checked, "view"));

    let marker = if warn_only { "!".yellow() } else { "✗".red() };
    for finding in &report.findings {
        println!(
            "   {} {}:{} <{}> → {}",
            marker,
            finding.path,
            finding.line.to_string().dimmed(),
            finding.element,
            format!("<{}>", finding.component).green()
        );
    }

    println!();
    if report.is_clean() {
        println!("{} No native form elements", "✓".green());
    } else {
        println!("{} {}", marker, plural(report.findings.len(), "native element"));
    }
}

pub fn render_file_sizes(report: &FileSizeReport, warn_only: bool) {
    println!(
        "{} ({} checked, limit {} lines)",
        "FILE SIZE".bold(),
        plural(report.files_checked, "file"),
        report.max_lines
    );

    let marker = if warn_only { "!".yellow() } else { "✗".red() };
    for file in &report.oversized {
        println!(
            "   {} {:>6} {}",
            marker,
            file.lines.to_string().yellow(),
            file.path
        );
    }

    println!();
    if report.is_clean() {
        println!("{} All files within {} lines", "✓".green(), report.max_lines);
    } else {
        println!("{} {} over the limit", marker, plural(report.oversized.len(), "file"));
    }
}
