use clap::Args;
use serde_json::Value;
use tracing::debug;

use trade_bias_core::engine::{self, BiasAnalysisInput, BiasEngine};

use crate::input;

/// Upper bound on accepted trades unless overridden.
pub const DEFAULT_MAX_TRADES: usize = 100_000;

/// Where the trade log comes from. Shared by every analysis subcommand.
#[derive(Args)]
pub struct TradeSourceArgs {
    /// Path to JSON input file, either {"trades": [...]} or a bare array
    #[arg(long, conflicts_with = "csv")]
    pub input: Option<String>,

    /// Path to CSV trade log with Timestamp, Buy/sell, Asset and P/L columns
    #[arg(long)]
    pub csv: Option<String>,

    /// Reject logs with more trades than this
    #[arg(long, default_value_t = DEFAULT_MAX_TRADES)]
    pub max_trades: usize,
}

impl TradeSourceArgs {
    fn load(&self, what: &str) -> Result<BiasAnalysisInput, Box<dyn std::error::Error>> {
        let trades = if let Some(ref path) = self.input {
            input::file::read_trades(path)?
        } else if let Some(ref path) = self.csv {
            input::csv_in::read_csv_trades(path)?
        } else if let Some(trades) = input::stdin::read_stdin_trades()? {
            trades
        } else {
            return Err(format!(
                "--input <file.json>, --csv <file.csv> or stdin required for {}",
                what
            )
            .into());
        };
        check_trade_limit(trades.len(), self.max_trades)?;
        debug!(rows = trades.len(), "loaded trade log");
        Ok(BiasAnalysisInput { trades })
    }
}

fn check_trade_limit(count: usize, max_trades: usize) -> Result<(), String> {
    if count > max_trades {
        return Err(format!(
            "Trade log has {} rows, more than --max-trades {}",
            count, max_trades
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Full report
// ---------------------------------------------------------------------------

/// Arguments for the full bias report
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: TradeSourceArgs,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bias_input = args.source.load("bias analysis")?;
    let result = engine::analyze_trading_biases(&bias_input)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// Single detectors
// ---------------------------------------------------------------------------

/// Arguments for overtrading detection
#[derive(Args)]
pub struct OvertradingArgs {
    #[command(flatten)]
    pub source: TradeSourceArgs,
}

pub fn run_overtrading(args: OvertradingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bias_input = args.source.load("overtrading detection")?;
    let result = engine::analyze_with(
        &bias_input,
        "Overtrading Detection",
        BiasEngine::detect_overtrading,
    )?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for loss aversion detection
#[derive(Args)]
pub struct LossAversionArgs {
    #[command(flatten)]
    pub source: TradeSourceArgs,
}

pub fn run_loss_aversion(args: LossAversionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bias_input = args.source.load("loss aversion detection")?;
    let result = engine::analyze_with(
        &bias_input,
        "Loss Aversion Detection",
        BiasEngine::detect_loss_aversion,
    )?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for revenge trading detection
#[derive(Args)]
pub struct RevengeTradingArgs {
    #[command(flatten)]
    pub source: TradeSourceArgs,
}

pub fn run_revenge_trading(
    args: RevengeTradingArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let bias_input = args.source.load("revenge trading detection")?;
    let result = engine::analyze_with(
        &bias_input,
        "Revenge Trading Detection",
        BiasEngine::detect_revenge_trading,
    )?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Arguments for descriptive trade statistics
#[derive(Args)]
pub struct StatisticsArgs {
    #[command(flatten)]
    pub source: TradeSourceArgs,
}

pub fn run_statistics(args: StatisticsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bias_input = args.source.load("trade statistics")?;
    let result = engine::analyze_with(&bias_input, "Trading Statistics", BiasEngine::statistics)?;
    Ok(serde_json::to_value(result)?)
}
