use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use log::{info, warn};
use orbit::arb::currency::CurrencyPair;
use orbit::arb::detector::{Detector, Outcome};
use orbit::arb::feed::{tradable, QuoteRecord};
use orbit::arb::quote::Quote;
use orbit::arb::spread::Spread;
use orbit::config::Config;
use orbit::utils::logger::setup_logger;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the most profitable currency cycle in a JSON quote snapshot
    Detect {
        /// JSON array of quote records
        file: PathBuf,
        /// Longest cycle to consider, in currencies
        #[arg(long)]
        max_cycle_length: Option<usize>,
        /// Only report yields strictly above this
        #[arg(long)]
        min_profit: Option<f64>,
        /// Search time budget in milliseconds
        #[arg(long)]
        budget_ms: Option<u64>,
        /// Stop after scoring this many cycles
        #[arg(long)]
        max_cycles: Option<u64>,
        /// Search components in parallel
        #[arg(long)]
        parallel: bool,
        /// Also report cycles that only trade inverse quotes
        #[arg(long)]
        inverse_only_cycles: bool,
    },
    /// Compare the venues quoting one market
    Spread {
        /// JSON array of quote records
        file: PathBuf,
        /// Market as BASE/QUOTE
        #[arg(long)]
        pair: String,
    },
}

/// Reads a snapshot and drops records the feed marked as not tradable
fn read_records(path: &Path) -> Result<Vec<QuoteRecord>> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<QuoteRecord> = serde_json::from_str(&text)
        .wrap_err_with(|| format!("Failed to parse quote records from {}", path.display()))?;
    info!("Read {} records from {}", records.len(), path.display());
    Ok(tradable(records))
}

fn detect(path: &Path, config: Config) -> Result<()> {
    let detector = Detector::new(config)?;
    let records = read_records(path)?;
    let detection = detector.detect(&records);

    for rejection in &detection.rejected {
        warn!(
            "Skipped record {} ({}): {}",
            rejection.index,
            rejection.venue.as_deref().unwrap_or("unknown venue"),
            rejection.reason
        );
    }
    match &detection.outcome {
        Outcome::Found(opportunity) => info!("Opportunity: {opportunity}"),
        Outcome::NotFound(miss) => info!("No opportunity: {miss}"),
    }

    println!("{}", serde_json::to_string_pretty(&detection)?);
    Ok(())
}

fn spread(path: &Path, pair: &str) -> Result<()> {
    let pair = CurrencyPair::parse(pair)?;
    let quotes: Vec<Quote> = read_records(path)?
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match Quote::try_from(record) {
            Ok(quote) => Some(quote),
            Err(reason) => {
                warn!("Skipped record {index}: {reason}");
                None
            }
        })
        .collect();

    let spread = Spread::find(&pair, &quotes);
    match &spread {
        Some(spread) => info!("Spread: {spread}"),
        None => info!("No spread on {pair}"),
    }

    println!("{}", serde_json::to_string_pretty(&spread)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.verbose)?;

    match cli.command {
        Commands::Detect {
            file,
            max_cycle_length,
            min_profit,
            budget_ms,
            max_cycles,
            parallel,
            inverse_only_cycles,
        } => {
            let mut config = Config::from_env()?;
            // Flags override the environment
            if max_cycle_length.is_some() {
                config.max_cycle_length = max_cycle_length;
            }
            if let Some(threshold) = min_profit {
                config.min_profit_threshold = threshold;
            }
            if let Some(ms) = budget_ms {
                config.search_budget = Some(Duration::from_millis(ms));
            }
            if max_cycles.is_some() {
                config.max_cycles = max_cycles;
            }
            config.parallel |= parallel;
            config.inverse_only_cycles |= inverse_only_cycles;
            detect(&file, config)?;
        }
        Commands::Spread { file, pair } => spread(&file, &pair)?,
    }

    Ok(())
}
