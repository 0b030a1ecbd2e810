mod config;
mod costs;
mod error;
mod heuristics;
mod ledger;
mod pdf_extract;
mod processor;
mod report;
#[cfg(test)]
mod sample_pdf;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "remisiones.toml";

/// Profit report for a folder of remision PDFs.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// TOML file with `data_dir`, `output_dir` and `output_file`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Folder holding the remision PDFs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Folder the workbook is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Workbook file name
    #[arg(long)]
    output_file: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show page text and parsed items of a single PDF
    Inspect { pdf: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Some(Command::Inspect { pdf }) = &cli.command {
        return pdf_extract::inspect_pdf(&pdf_extract::PdfPageReader, pdf, costs::CostTable::builtin());
    }

    // An explicit --config must exist; the default location is optional.
    let mut cfg = match &cli.config {
        Some(path) => config::Config::load(path)?,
        None => config::Config::load_or_default(DEFAULT_CONFIG_PATH)?,
    };
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        cfg.output_dir = dir;
    }
    if let Some(file) = cli.output_file {
        cfg.output_file = file;
    }

    info!(
        data_dir = %cfg.data_dir.display(),
        output = %cfg.output_path().display(),
        cost_entries = costs::CostTable::builtin().len(),
        "Starting run"
    );

    match processor::run(&cfg)? {
        processor::RunOutcome::Written { path, ledger } => info!(
            path = %path.display(),
            documents = ledger.summaries().len(),
            items = ledger.details().len(),
            "Report ready"
        ),
        processor::RunOutcome::NothingProcessed => info!("Nothing to report"),
    }
    Ok(())
}
