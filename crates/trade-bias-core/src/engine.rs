use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use crate::biases::{
    self, BiasDetections, LossAversionMetrics, OvertradingMetrics, RevengeTradingMetrics,
};
use crate::detection::{self, DetectionResult};
use crate::report::{self, Recommendation, Summary, TradingStatistics};
use crate::trade_log::{RawTrade, TradeLog};
use crate::types::*;
use crate::TradeBiasResult;

/// Dropped-row indices listed in the warning before it is truncated.
const MAX_LISTED_DROPPED_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BiasAnalysisInput {
    pub trades: Vec<RawTrade>,
}

/// Accepted JSON layouts for a trade log.
#[derive(Deserialize)]
#[serde(untagged)]
enum TradeDocument {
    Wrapped { trades: Vec<RawTrade> },
    Bare(Vec<RawTrade>),
}

impl BiasAnalysisInput {
    /// Parse either `{"trades": [...]}` or a bare array of trades.
    pub fn from_json_value(value: serde_json::Value) -> TradeBiasResult<Self> {
        let trades = match serde_json::from_value::<TradeDocument>(value)? {
            TradeDocument::Wrapped { trades } => trades,
            TradeDocument::Bare(trades) => trades,
        };
        Ok(BiasAnalysisInput { trades })
    }

    pub fn from_json_str(text: &str) -> TradeBiasResult<Self> {
        Self::from_json_value(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasAnalysisOutput {
    #[serde(flatten)]
    pub detections: BiasDetections,
    pub summary: Summary,
    pub recommendations: Vec<Recommendation>,
    pub statistics: TradingStatistics,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns one normalized trade log and runs every analysis against it.
///
/// Every method is a pure function of the log, so calls can be repeated or
/// reordered freely.
#[derive(Debug, Clone)]
pub struct BiasEngine {
    log: TradeLog,
}

impl BiasEngine {
    pub fn new(records: &[RawTrade]) -> TradeBiasResult<Self> {
        Ok(BiasEngine {
            log: TradeLog::from_raw(records)?,
        })
    }

    pub fn from_log(log: TradeLog) -> Self {
        BiasEngine { log }
    }

    pub fn log(&self) -> &TradeLog {
        &self.log
    }

    pub fn detect_overtrading(&self) -> DetectionResult<OvertradingMetrics> {
        biases::detect_overtrading(&self.log)
    }

    pub fn detect_loss_aversion(&self) -> DetectionResult<LossAversionMetrics> {
        biases::detect_loss_aversion(&self.log)
    }

    pub fn detect_revenge_trading(&self) -> DetectionResult<RevengeTradingMetrics> {
        biases::detect_revenge_trading(&self.log)
    }

    pub fn detect_all(&self) -> BiasDetections {
        BiasDetections::detect(&self.log)
    }

    pub fn summary(&self, detections: &BiasDetections) -> Summary {
        report::build_summary(&self.log, detections)
    }

    pub fn recommendations(&self, detections: &BiasDetections) -> Vec<Recommendation> {
        report::build_recommendations(detections)
    }

    pub fn statistics(&self) -> TradingStatistics {
        report::compute_statistics(&self.log)
    }

    /// Full report. Each detector runs exactly once.
    pub fn analyze(&self) -> BiasAnalysisOutput {
        let detections = self.detect_all();
        BiasAnalysisOutput {
            summary: self.summary(&detections),
            recommendations: self.recommendations(&detections),
            statistics: self.statistics(),
            detections,
        }
    }

    fn dropped_rows_warning(&self, total_rows: usize) -> Option<String> {
        let dropped = self.log.dropped_rows();
        if dropped.is_empty() {
            return None;
        }
        let mut listed: Vec<String> = dropped
            .iter()
            .take(MAX_LISTED_DROPPED_ROWS)
            .map(|idx| idx.to_string())
            .collect();
        if dropped.len() > MAX_LISTED_DROPPED_ROWS {
            listed.push("...".to_string());
        }
        Some(format!(
            "Dropped {} of {} rows with an unparseable timestamp or pnl (rows {})",
            dropped.len(),
            total_rows,
            listed.join(", ")
        ))
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub const METHODOLOGY: &str =
    "Behavioral Bias Detection — Overtrading, Loss Aversion, Revenge Trading";

fn assumptions() -> serde_json::Value {
    serde_json::json!({
        "ordering": "trades sorted by timestamp ascending, stable on ties",
        "pnl": {
            "max_abs": crate::trade_log::MAX_ABS_PNL.to_string(),
            "decimal_places": crate::trade_log::PNL_DECIMAL_PLACES,
        },
        "detection_threshold": detection::DETECTION_THRESHOLD.to_string(),
        "severity_bands": {
            "low": format!("< {}", detection::MODERATE_FROM),
            "moderate": format!("< {}", detection::HIGH_FROM),
            "high": format!(">= {}", detection::HIGH_FROM),
        },
        "overtrading": {
            "avg_trades_per_day_limit": biases::overtrading::AVG_TRADES_PER_DAY_LIMIT.to_string(),
            "max_trades_per_day_limit": biases::overtrading::MAX_TRADES_PER_DAY_LIMIT.to_string(),
            "rapid_window_minutes": biases::overtrading::RAPID_WINDOW_MINUTES.to_string(),
            "rapid_share_limit_pct": biases::overtrading::RAPID_SHARE_LIMIT.to_string(),
        },
        "loss_aversion": {
            "risk_reward": "average_win / average_loss",
            "poor_risk_reward": biases::loss_aversion::POOR_RISK_REWARD.to_string(),
            "weak_risk_reward": biases::loss_aversion::WEAK_RISK_REWARD.to_string(),
            "high_win_rate_pct": biases::loss_aversion::HIGH_WIN_RATE.to_string(),
            "outsized_loss_multiple": biases::loss_aversion::OUTSIZED_LOSS_MULTIPLE.to_string(),
        },
        "revenge_trading": {
            "rapid_after_loss_minutes": biases::revenge_trading::RAPID_AFTER_LOSS_MINUTES.to_string(),
            "position_size_proxy": "absolute P/L",
            "size_escalation_ratio": biases::revenge_trading::SIZE_ESCALATION_RATIO.to_string(),
            "post_loss_win_rate_floor_pct": biases::revenge_trading::POST_LOSS_WIN_RATE_FLOOR.to_string(),
        },
    })
}

/// Normalize the input, run `f` against the engine and wrap the result in the
/// standard envelope. Fails only if the input cannot be normalized.
pub fn analyze_with<T, F>(
    input: &BiasAnalysisInput,
    methodology: &str,
    f: F,
) -> TradeBiasResult<ComputationOutput<T>>
where
    T: Serialize,
    F: FnOnce(&BiasEngine) -> T,
{
    let start = Instant::now();
    let engine = BiasEngine::new(&input.trades)?;
    let warnings: Vec<String> = engine
        .dropped_rows_warning(input.trades.len())
        .into_iter()
        .collect();

    let result = f(&engine);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &assumptions(),
        warnings,
        elapsed,
        result,
    ))
}

/// Score a trade log for overtrading, loss aversion and revenge trading.
pub fn analyze_trading_biases(
    input: &BiasAnalysisInput,
) -> TradeBiasResult<ComputationOutput<BiasAnalysisOutput>> {
    let out = analyze_with(input, METHODOLOGY, BiasEngine::analyze)?;
    info!(
        trades = out.result.summary.total_trades,
        biases_detected = out.result.summary.bias_count,
        "bias analysis complete"
    );
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
