mod collate;
mod config;
mod extract;

use clap::Parser;
use collate::{OutputFormat, ReportCollator};
use config::CollateConfig;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Collate a folder of sort benchmark reports into one CSV summary:
/// one row of size, threshold, loops, key comparisons, average time and
/// standard deviation per report.
#[derive(Parser, Debug)]
#[command(name = "collate-results", version, about)]
pub struct Cli {
    /// Folder containing the benchmark report files
    #[arg(value_name = "FOLDER")]
    folder: Option<PathBuf>,

    /// Output settings file (TOML); without it the built-in defaults apply
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Process entries sorted by file name (overrides config)
    #[arg(long)]
    sort: bool,

    /// Only process entries whose file name matches this glob (overrides config)
    #[arg(long, value_name = "GLOB")]
    include: Option<String>,

    /// Warn about and skip unreadable or malformed reports instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Output format (overrides config)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    tracing::debug!(?cli, "parsed CLI arguments");

    let Some(folder) = cli.folder.as_deref() else {
        println!("No folder specified.");
        std::process::exit(1);
    };

    if let Err(e) = run(&cli, folder) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, folder: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => CollateConfig::load(path)?,
        None => CollateConfig::default(),
    };
    apply_cli_overrides(&mut config, cli);
    let collator = ReportCollator::new(config.options()?);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = collator.run(folder, &mut out);
    out.flush()?;
    let summary = result?;

    if !summary.skipped.is_empty() {
        tracing::warn!(
            written = summary.written,
            skipped = summary.skipped.len(),
            "some reports were skipped"
        );
    }
    tracing::debug!(written = summary.written, "collation complete");
    Ok(())
}

fn apply_cli_overrides(config: &mut CollateConfig, cli: &Cli) {
    if cli.sort {
        config.output.sort = true;
    }
    if let Some(include) = &cli.include {
        config.output.include = Some(include.clone());
    }
    if cli.skip_invalid {
        config.output.skip_invalid = true;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
}
