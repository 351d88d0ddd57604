mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::bias::{
    AnalyzeArgs, LossAversionArgs, OvertradingArgs, RevengeTradingArgs, StatisticsArgs,
};

/// Behavioral bias detection for trade logs
#[derive(Parser)]
#[command(
    name = "tbias",
    version,
    about = "Behavioral bias detection for trade logs",
    long_about = "Scores a trade execution log for overtrading, loss aversion and revenge \
                  trading with decimal precision, and produces a summary, descriptive \
                  statistics and targeted recommendations. Reads JSON or CSV trade logs."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Full report: all three biases, summary, recommendations and statistics
    Analyze(AnalyzeArgs),
    /// Score overtrading only
    Overtrading(OvertradingArgs),
    /// Score loss aversion only
    LossAversion(LossAversionArgs),
    /// Score revenge trading only
    RevengeTrading(RevengeTradingArgs),
    /// Descriptive statistics for the trade log
    Statistics(StatisticsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    // stdout carries the rendered result, diagnostics go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::bias::run_analyze(args),
        Commands::Overtrading(args) => commands::bias::run_overtrading(args),
        Commands::LossAversion(args) => commands::bias::run_loss_aversion(args),
        Commands::RevengeTrading(args) => commands::bias::run_revenge_trading(args),
        Commands::Statistics(args) => commands::bias::run_statistics(args),
        Commands::Version => {
            println!("tbias {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
