//! StockDash CLI: run the signal pipeline over a directory of price files.
//!
//! Commands:
//! - `run`: load, filter, normalize, compute SMA crossovers, print and save
//! - `tickers`: list loaded tickers with their date span and row count
//! - `sample`: write deterministic synthetic price files

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use stockdash_core::data::{generate_sample_series, write_sample_csv};
use stockdash_runner::{
    load_data, run_pipeline, save_outputs, volume_by_ticker, Parameters, PipelineOutput,
    RunSummary, Strategy,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stockdash",
    about = "StockDash CLI: moving-average crossover signals over local price files"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and print the resulting signals.
    Run(RunArgs),
    /// List tickers found in a data directory.
    Tickers {
        /// Directory with one CSV/TSV file per ticker.
        #[arg(long, default_value = "stock_data")]
        data_dir: PathBuf,
    },
    /// Generate synthetic random-walk price files.
    Sample {
        /// Directory to write `<TICKER>.csv` files into.
        #[arg(long, default_value = "stock_data")]
        output_dir: PathBuf,

        /// Tickers to generate (comma-separated).
        #[arg(long, value_delimiter = ',', required = true)]
        tickers: Vec<String>,

        /// First date (YYYY-MM-DD). Defaults to 2021-01-01.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last date (YYYY-MM-DD). Defaults to 2023-01-01.
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Directory with one CSV/TSV file per ticker.
    #[arg(long, default_value = "stock_data")]
    data_dir: PathBuf,

    /// TOML parameter file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tickers to select (comma-separated).
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// First date kept (YYYY-MM-DD, inclusive).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date kept (YYYY-MM-DD, inclusive).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Divide each ticker's closes by its first close in range.
    #[arg(long, default_value_t = false)]
    normalize: bool,

    /// Keep raw closes even when the config file enables normalization.
    #[arg(long, conflicts_with = "normalize", default_value_t = false)]
    no_normalize: bool,

    /// Short SMA window for the crossover strategy.
    #[arg(long, conflicts_with_all = ["ma_window", "no_strategy"])]
    short: Option<usize>,

    /// Long SMA window for the crossover strategy.
    #[arg(long, conflicts_with_all = ["ma_window", "no_strategy"])]
    long: Option<usize>,

    /// Single moving-average overlay instead of a crossover.
    #[arg(long, conflicts_with = "no_strategy")]
    ma_window: Option<usize>,

    /// Disable moving averages and signals.
    #[arg(long, default_value_t = false)]
    no_strategy: bool,

    /// Print the daily volume of each selected ticker.
    #[arg(long, default_value_t = false)]
    show_volume: bool,

    /// Save the derived table, the signals and a JSON summary here.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run_cmd(args),
        Commands::Tickers { data_dir } => run_tickers(&data_dir),
        Commands::Sample {
            output_dir,
            tickers,
            start,
            end,
        } => run_sample(&output_dir, &tickers, start, end),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_parameters(args: &RunArgs) -> Result<Parameters> {
    let mut params = match &args.config {
        Some(path) => Parameters::from_file(path)?,
        None => Parameters::default(),
    };

    if let Some(tickers) = &args.tickers {
        params.tickers = tickers
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }
    if let Some(start) = args.start {
        params.start_date = start;
    }
    if let Some(end) = args.end {
        params.end_date = end;
    }
    if args.normalize {
        params.normalize = true;
    } else if args.no_normalize {
        params.normalize = false;
    }

    if args.no_strategy {
        params.strategy = Strategy::None;
    } else if let Some(window) = args.ma_window {
        params.strategy = Strategy::MovingAverage { window };
    } else if args.short.is_some() || args.long.is_some() {
        // Unset windows keep the configured crossover, else the defaults.
        let (short_default, long_default) = match params.strategy {
            Strategy::SmaCrossover {
                short_window,
                long_window,
            } => (short_window, long_window),
            _ => (20, 50),
        };
        params.strategy = Strategy::SmaCrossover {
            short_window: args.short.unwrap_or(short_default),
            long_window: args.long.unwrap_or(long_default),
        };
    }

    params.validate()?;
    Ok(params)
}

fn run_cmd(args: RunArgs) -> Result<()> {
    let params = build_parameters(&args)?;
    let loaded = load_data(&args.data_dir)?;

    let output = run_pipeline(&loaded.table, &params)?;
    let summary = RunSummary::build(&params, loaded.dataset_hash.clone(), &output, &loaded.messages());

    print_summary(&summary);
    print_signals(&output);
    if args.show_volume {
        for line in format_volume(&volume_by_ticker(&output.filtered)) {
            println!("{line}");
        }
    }

    if let Some(dir) = &args.output_dir {
        let saved = save_outputs(&output, &summary, dir)?;
        info!(dir = %dir.display(), "outputs saved");
        println!("Derived table saved to: {}", saved.derived.display());
        println!("Signals saved to:       {}", saved.signals.display());
        println!("Summary saved to:       {}", saved.summary.display());
    }

    Ok(())
}

fn run_tickers(data_dir: &Path) -> Result<()> {
    let loaded = load_data(data_dir)?;

    println!("Data: {}", data_dir.display());
    println!("Dataset hash: {}", loaded.dataset_hash);
    println!();
    println!("{:<10} {:<25} {:>8}", "Ticker", "Date Range", "Rows");
    println!("{}", "-".repeat(45));
    for (ticker, rows) in loaded.table.iter_series() {
        let range = match loaded.table.date_span(ticker) {
            Some((first, last)) => format!("{first} to {last}"),
            None => "(empty)".into(),
        };
        println!("{:<10} {:<25} {:>8}", ticker, range, rows.len());
    }
    if let Some((first, last)) = loaded.table.date_range() {
        println!("{}", "-".repeat(45));
        println!("{:<10} {:<25} {:>8}", "All", format!("{first} to {last}"), loaded.table.len());
    }

    for message in loaded.messages() {
        println!("WARNING: {message}");
    }
    Ok(())
}

fn run_sample(
    output_dir: &Path,
    tickers: &[String],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let defaults = Parameters::default();
    let start = start.unwrap_or(defaults.start_date);
    let end = end.unwrap_or(defaults.end_date);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    for ticker in tickers.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        let points = generate_sample_series(ticker, start, end);
        let path = output_dir.join(format!("{ticker}.csv"));
        write_sample_csv(&path, &points)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote {} rows to {}", points.len(), path.display());
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let p = &summary.parameters;
    let tickers: Vec<&str> = p.tickers.iter().map(|t| t.as_str()).collect();

    println!();
    println!("=== StockDash Run ===");
    println!("Tickers:        {}", tickers.join(", "));
    println!("Period:         {} to {}", p.start_date, p.end_date);
    println!("Normalize:      {}", p.normalize);
    println!("Strategy:       {}", describe_strategy(p.strategy));
    println!("Rows:           {}", summary.total_rows);
    println!("Buy signals:    {}", summary.buys);
    println!("Sell signals:   {}", summary.sells);
    println!("Total volume:   {}", summary.total_volume);
    println!("Dataset hash:   {}", summary.dataset_hash);
    println!("Params hash:    {}", summary.params_hash);

    if !summary.tickers.is_empty() {
        println!();
        println!(
            "{:<8} {:<25} {:>6} {:>5} {:>5} {:>14} {:<12}",
            "Ticker", "Date Range", "Rows", "Buys", "Sells", "Volume", "Regime"
        );
        println!("{}", "-".repeat(82));
        for t in &summary.tickers {
            let regime = t
                .last_regime
                .map_or_else(|| "-".to_string(), |r| format!("{r:?}"));
            println!(
                "{:<8} {:<25} {:>6} {:>5} {:>5} {:>14} {:<12}",
                t.ticker,
                format!("{} to {}", t.first_date, t.last_date),
                t.rows,
                t.buys,
                t.sells,
                t.total_volume,
                regime
            );
        }
    }

    for warning in &summary.warnings {
        println!("WARNING: {warning}");
    }
    println!();
}

fn print_signals(output: &PipelineOutput) {
    if output.signals.is_empty() {
        println!("No crossover signals.");
        return;
    }
    println!("--- Signals ---");
    println!("{:<12} {:<8} {:>14} {:<6}", "Date", "Ticker", "Close", "Action");
    for s in &output.signals {
        println!(
            "{:<12} {:<8} {:>14.4} {:<6}",
            s.date.to_string(),
            s.ticker,
            s.close,
            s.action.to_string()
        );
    }
    println!();
}

/// Per-ticker `Date / Volume` tables, one block per ticker.
fn format_volume(view: &BTreeMap<String, Vec<(NaiveDate, u64)>>) -> Vec<String> {
    let mut lines = Vec::new();
    for (ticker, points) in view {
        lines.push(format!("--- Volume: {ticker} ---"));
        lines.push(format!("{:<12} {:>14}", "Date", "Volume"));
        for (date, volume) in points {
            lines.push(format!("{:<12} {:>14}", date.to_string(), volume));
        }
        lines.push(String::new());
    }
    lines
}

fn describe_strategy(strategy: Strategy) -> String {
    match strategy {
        Strategy::None => "none".into(),
        Strategy::SmaCrossover {
            short_window,
            long_window,
        } => format!("SMA crossover ({short_window}/{long_window})"),
        Strategy::MovingAverage { window } => format!("moving average ({window})"),
    }
}
