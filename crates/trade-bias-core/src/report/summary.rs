use serde::{Deserialize, Serialize};

use crate::biases::BiasDetections;
use crate::detection::Bias;
use crate::trade_log::TradeLog;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_trades: usize,
    pub total_pnl: Money,
    pub win_rate: Percent,
    pub biases_detected: Vec<Bias>,
    pub bias_count: usize,
}

pub fn build_summary(log: &TradeLog, detections: &BiasDetections) -> Summary {
    let biases_detected = detections.detected();
    Summary {
        total_trades: log.len(),
        total_pnl: log.total_pnl().round_dp(2),
        win_rate: log.win_rate().round_dp(1),
        bias_count: biases_detected.len(),
        biases_detected,
    }
}
