mod chart;
mod config;
mod dashboard;
mod error;
mod export;
mod indicator;
mod market_data;
mod model;
mod pipeline;
mod series;
mod signal;

use std::path::PathBuf;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use dashboard::Selection;
use market_data::coingecko::CoinGecko;
use model::{IndicatorFamily, IndicatorToggles, Timeframe};

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("market data error")]
    MarketData,
    #[display("export error")]
    Export,
}

#[derive(Parser)]
#[command(name = "greenwave", about = "Crypto indicator dashboard")]
struct Cli {
    /// Path to a TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Coin symbol, e.g. BTC (defaults to the first configured coin)
    #[arg(short, long)]
    symbol: Option<String>,

    /// Lookback window: 1D, 1W, 1M, 6M or 1Y
    #[arg(short, long, value_parser = parse_timeframe)]
    timeframe: Option<Timeframe>,

    /// Comma-separated indicators to compute (defaults to the configured set)
    #[arg(short, long, value_enum, value_delimiter = ',', conflicts_with = "no_indicators")]
    indicators: Option<Vec<IndicatorFamily>>,

    /// Show the price chart only
    #[arg(long)]
    no_indicators: bool,

    /// Write the chart as SVG; alerts go to a companion `_summary.txt`
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn parse_timeframe(s: &str) -> Result<Timeframe, String> {
    Timeframe::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Timeframe::ALL.iter().map(|tf| tf.as_str()).collect();
        format!("unknown timeframe \"{s}\", expected one of {}", names.join(", "))
    })
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config =
        config::load_or_default(cli.config.as_deref()).change_context(AppError::Config)?;

    init_tracing(&config);

    let selection = build_selection(&cli, &config)?;
    let provider = CoinGecko::new(&config.market_data).change_context(AppError::MarketData)?;

    // One refresh per invocation; failures come back as alert text.
    let view = dashboard::refresh(&provider, &selection).await;

    println!("{} · {}", selection.symbol.to_uppercase(), selection.timeframe);
    println!("{}", view.alerts);

    if let Some(path) = &cli.export {
        match &view.figure {
            Some(figure) => {
                let files = export::export(path, figure, &view.alerts)
                    .change_context(AppError::Export)?;
                println!("Chart saved to: {}", files.figure.display());
                if let Some(summary) = files.summary {
                    println!("Summary saved to: {}", summary.display());
                }
            }
            None => warn!(path = %path.display(), "refresh failed, nothing to export"),
        }
    }

    info!("done");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Merge CLI choices over the configured dashboard defaults.
fn build_selection(cli: &Cli, config: &AppConfig) -> Result<Selection, Report<AppError>> {
    let dashboard = &config.dashboard;

    let symbol = match &cli.symbol {
        Some(symbol) => symbol.clone(),
        None => dashboard.coins.first().cloned().ok_or_else(|| {
            Report::new(AppError::Config).attach("dashboard.coins is empty")
        })?,
    };
    if !dashboard
        .coins
        .iter()
        .any(|c| c.eq_ignore_ascii_case(&symbol))
    {
        warn!(symbol = %symbol, "symbol is not in the configured coin list");
    }

    let timeframe = cli.timeframe.unwrap_or(dashboard.timeframe);

    let toggles = if cli.no_indicators {
        IndicatorToggles::none()
    } else {
        match &cli.indicators {
            Some(families) => IndicatorToggles::from_families(families),
            None => dashboard.indicators,
        }
    };

    Ok(Selection {
        symbol,
        timeframe,
        toggles,
    })
}
