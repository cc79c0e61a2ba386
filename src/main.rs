use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use relkit::changelog::{generate_changelog, ChangelogOptions};
use relkit::config::Config;
use relkit::lint::{check_file_sizes, check_native_inputs};
use relkit::models::{Outcome, OutputFormat};
use relkit::render;
use relkit::schema::{check_columns, check_relations};
use relkit::version::{update_versions, UpdateOptions};

#[derive(Parser, Debug)]
#[command(name = "relkit", version)]
#[command(about = "Release and consistency checks for Laravel, Flutter, Node and Go projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Show debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (defaults to .relkit.yml in the project)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Project root (defaults to current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR", default_value = ".")]
    path: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare migration columns with model $fillable and $casts
    Columns {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Find relationship methods shadowed by model attributes
    Relations {
        /// Model files to check (defaults to every model)
        files: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Flag native form elements in Blade views
    Inputs {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Report findings without failing
        #[arg(long)]
        warn_only: bool,
    },

    /// Flag source files over the line limit
    Filesize {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Line limit (overrides config)
        #[arg(long)]
        max_lines: Option<usize>,

        /// Report findings without failing
        #[arg(long)]
        warn_only: bool,
    },

    /// Prepend a release section built from conventional commits
    Changelog {
        /// Release version (computed from the last tag if omitted)
        version: Option<String>,

        /// Print the section without writing
        #[arg(long)]
        dry_run: bool,

        /// Changelog file (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a version into every manifest of the project
    Version {
        /// New version (e.g., 1.4.0 or v1.4.0)
        version: String,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Create an annotated v<version> tag afterwards
        #[arg(long, conflicts_with = "dry_run")]
        tag: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("{} {:#}", "✗".red(), e);
    }

    let code = match run(cli) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            1
        }
    };

    std::process::exit(code);
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("RELKIT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize logging: {error}"))?;

    Ok(())
}

fn run(cli: Cli) -> Result<Outcome> {
    let base = cli.path.as_path();
    let config = Config::load(base, cli.config.as_deref())?;

    match cli.command {
        Command::Columns { format } => run_columns_command(base, &config, format),
        Command::Relations { files, format } => run_relations_command(base, &files, &config, format),
        Command::Inputs { format, warn_only } => run_inputs_command(base, &config, format, warn_only),
        Command::Filesize {
            format,
            max_lines,
            warn_only,
        } => run_filesize_command(base, &config, format, max_lines, warn_only),
        Command::Changelog {
            version,
            dry_run,
            output,
        } => run_changelog_command(base, &config, version, dry_run, output),
        Command::Version { version, dry_run, tag } => {
            run_version_command(base, &config, &version, UpdateOptions { dry_run, tag })
        }
    }
}

fn run_columns_command(base: &Path, config: &Config, format: OutputFormat) -> Result<Outcome> {
    let report = check_columns(base, config)?;
    match format {
        OutputFormat::Text => render::render_columns(&report),
        OutputFormat::Json => render::print_json(&report)?,
    }
    Ok(Outcome::from_blocking(report.has_blocking()))
}

fn run_relations_command(base: &Path, files: &[PathBuf], config: &Config, format: OutputFormat) -> Result<Outcome> {
    let report = check_relations(base, files, config)?;
    match format {
        OutputFormat::Text => render::render_relations(&report),
        OutputFormat::Json => render::print_json(&report)?,
    }
    Ok(Outcome::from_blocking(report.has_blocking()))
}

fn run_inputs_command(base: &Path, config: &Config, format: OutputFormat, warn_only: bool) -> Result<Outcome> {
    let report = check_native_inputs(base, &config.inputs)?;
    match format {
        OutputFormat::Text => render::render_inputs(&report, warn_only),
        OutputFormat::Json => render::print_json(&report)?,
    }
    Ok(Outcome::from_blocking(!warn_only && !report.is_clean()))
}

fn run_filesize_command(
    base: &Path,
    config: &Config,
    format: OutputFormat,
    max_lines: Option<usize>,
    warn_only: bool,
) -> Result<Outcome> {
    let report = check_file_sizes(base, &config.filesize, max_lines)?;
    match format {
        OutputFormat::Text => render::render_file_sizes(&report, warn_only),
        OutputFormat::Json => render::print_json(&report)?,
    }
    Ok(Outcome::from_blocking(!warn_only && !report.is_clean()))
}

fn run_changelog_command(
    base: &Path,
    config: &Config,
    version: Option<String>,
    dry_run: bool,
    output: Option<PathBuf>,
) -> Result<Outcome> {
    let opts = ChangelogOptions {
        version,
        dry_run,
        output,
        date: None,
    };
    let result = generate_changelog(base, config, &opts)?;
    render::render_changelog(&result, dry_run);
    Ok(Outcome::Clean)
}

fn run_version_command(base: &Path, config: &Config, version: &str, opts: UpdateOptions) -> Result<Outcome> {
    let report = update_versions(base, config, version, opts)?;
    render::render_version(&report);
    Ok(Outcome::Clean)
}
