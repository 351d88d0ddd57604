pub mod biases;
pub mod detection;
pub mod engine;
pub mod error;
pub mod report;
pub mod trade_log;
pub mod types;

pub use detection::{Bias, DetectionResult, Severity};
pub use engine::{
    analyze_trading_biases, analyze_with, BiasAnalysisInput, BiasAnalysisOutput, BiasEngine,
};
pub use error::TradeBiasError;
pub use trade_log::{RawTrade, Trade, TradeLog, TradeSide};
pub use types::*;

/// Standard result type for all trade-bias operations
pub type TradeBiasResult<T> = Result<T, TradeBiasError>;
