use analytics::Metric;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use configuration::Config;
use core_types::{Frequency, FrequencySpec};
use indicatif::{ProgressBar, ProgressStyle};
use ingest::DateWindow;
use pipeline::{PipelineOrchestrator, ResultStore};
use std::path::PathBuf;

mod ingest;
mod logging;
mod render;

/// The main entry point for the riskboard application.
fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file when one is present.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let _log_guard = logging::init(&config.logging)?;

    if let Some(threads) = config.analysis.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to size the worker pool")?;
    }

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(args, &config),
        Commands::Compare(args) => handle_compare(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Risk and performance metrics of stocks against a benchmark, at several sampling frequencies.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every metric for each symbol, one table per frequency.
    Report(ReportArgs),
    /// Compare a single metric across symbols.
    Compare(CompareArgs),
}

#[derive(Args)]
struct Selection {
    /// Restrict the run to these symbols (repeatable). Defaults to the configured universe.
    #[arg(long = "symbol")]
    symbols: Vec<String>,

    /// Restrict the run to these frequencies (repeatable). Defaults to the configured list.
    #[arg(long = "frequency", value_enum)]
    frequencies: Vec<Frequency>,
}

#[derive(Args)]
struct ReportArgs {
    #[command(flatten)]
    selection: Selection,

    /// Emit the whole result store as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CompareArgs {
    /// The metric to compare.
    #[arg(long, value_enum, default_value = "volatility")]
    metric: Metric,

    #[command(flatten)]
    selection: Selection,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_report(args: ReportArgs, config: &Config) -> anyhow::Result<()> {
    let store = run_pipeline(&args.selection, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&store)?);
        return Ok(());
    }

    for frequency in store.frequencies() {
        println!("\n{frequency} Metrics");
        println!("{}", render::metrics_table(&store, frequency));
        for line in render::failure_lines(&store, frequency) {
            println!("{line}");
        }
    }
    Ok(())
}

fn handle_compare(args: CompareArgs, config: &Config) -> anyhow::Result<()> {
    let store = run_pipeline(&args.selection, config)?;

    for frequency in store.frequencies() {
        println!("\n{} Comparison ({frequency})", args.metric);
        println!("{}", render::comparison_table(&store, frequency, args.metric));
    }
    Ok(())
}

/// Loads the selected price histories and evaluates every (symbol, frequency) pair.
fn run_pipeline(selection: &Selection, config: &Config) -> anyhow::Result<ResultStore> {
    let specs: Vec<FrequencySpec> = if selection.frequencies.is_empty() {
        config.frequency_specs()?
    } else {
        selection
            .frequencies
            .iter()
            .map(|&f| config.frequency_spec(f))
            .collect::<Result<_, _>>()?
    };
    let symbols = if selection.symbols.is_empty() {
        &config.universe.symbols
    } else {
        &selection.symbols
    };

    let window = DateWindow {
        start: config.data.start_date,
        end: config.data.end_date,
    };
    let (assets, benchmark) =
        ingest::load_universe(&config.data.directory, symbols, &config.universe.benchmark, window)
            .context("failed to load price data")?;

    let orchestrator = PipelineOrchestrator::new(specs);

    // Set up the progress bar
    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message("pairs");

    let store = orchestrator.run_all_with_progress(&assets, &benchmark, &progress_bar);
    progress_bar.finish_and_clear();

    Ok(store)
}
