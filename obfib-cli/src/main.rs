//! obfib CLI — analyze bar files and manage strategy configs.
//!
//! Commands:
//! - `analyze` — run a CSV bar file through the full pipeline, print JSON
//! - `config` — print the default strategy configuration as TOML
//! - `check` — validate a TOML config and print its fingerprint

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use obfib_core::data::read_bars_csv;
use obfib_core::{Pipeline, RiskState, StrategyConfig};

#[derive(Parser)]
#[command(
    name = "obfib",
    about = "obfib — order block / Fibonacci / RSI setup detection with a risk gate"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a CSV bar file through signal detection, sessions and risk.
    Analyze {
        /// CSV with header timestamp,open,high,low,close,volume.
        #[arg(long)]
        bars: PathBuf,

        /// Symbol the bars belong to (e.g., EURUSD).
        #[arg(long)]
        symbol: String,

        /// Path to a TOML config file. Defaults to the built-in strategy.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Evaluation time (RFC 3339). Defaults to the last bar's timestamp.
        #[arg(long)]
        at: Option<String>,

        /// Account balance for position sizing.
        #[arg(long, default_value_t = 10_000.0)]
        balance: f64,
    },
    /// Print the default configuration as TOML.
    Config,
    /// Validate a TOML config file and print its fingerprint.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("obfib_core=info,obfib=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            bars,
            symbol,
            config,
            at,
            balance,
        } => run_analyze(&bars, &symbol, config.as_deref(), at.as_deref(), balance),
        Commands::Config => run_config(),
        Commands::Check { config } => run_check(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<StrategyConfig> {
    match path {
        Some(p) => {
            StrategyConfig::load(p).with_context(|| format!("loading config {}", p.display()))
        }
        None => Ok(StrategyConfig::default()),
    }
}

fn run_analyze(
    bars_path: &Path,
    symbol: &str,
    config_path: Option<&Path>,
    at: Option<&str>,
    balance: f64,
) -> Result<()> {
    let config = load_config(config_path)?;
    let fingerprint = config.fingerprint();
    let history = read_bars_csv(bars_path, symbol)
        .with_context(|| format!("reading bars from {}", bars_path.display()))?;

    let now: DateTime<Utc> = match at {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("invalid --at timestamp '{s}'"))?
            .with_timezone(&Utc),
        None => history
            .last()
            .map(|b| b.timestamp)
            .context("bar file is empty")?,
    };

    info!(
        symbol,
        bars = history.len(),
        config = %&fingerprint[..16],
        %now,
        "analyzing"
    );

    let pipeline = Pipeline::new(config, RiskState::new(balance))?;
    let outcome = pipeline.process(&history, &now);

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn run_config() -> Result<()> {
    print!("{}", StrategyConfig::default().to_toml_string()?);
    Ok(())
}

fn run_check(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    println!("config OK: {}", config.name);
    println!("  fingerprint: {}", config.fingerprint());
    println!("  min history: {} bars", config.min_history());
    let sessions: Vec<String> = config
        .sessions
        .windows
        .iter()
        .map(|w| format!("{} {}-{}", w.name, w.start, w.end))
        .collect();
    println!("  sessions:    {}", sessions.join(", "));
    Ok(())
}
