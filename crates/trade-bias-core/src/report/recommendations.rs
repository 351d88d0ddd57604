use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::biases::BiasDetections;
use crate::detection::{Bias, Severity};

/// Label used for advice not tied to a detected bias.
pub const GENERAL: &str = "General";

const MIN_DAILY_TRADE_CAP: i64 = 5;
const MIN_TAKE_PROFIT_PCT: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Bias label, or "General"
    pub bias: String,
    pub recommendation: String,
    pub priority: Priority,
}

impl Recommendation {
    fn new(bias: &str, recommendation: impl Into<String>, priority: Priority) -> Self {
        Recommendation {
            bias: bias.to_string(),
            recommendation: recommendation.into(),
            priority,
        }
    }
}

fn lead_priority(severity: Severity) -> Priority {
    if severity == Severity::High {
        Priority::High
    } else {
        Priority::Medium
    }
}

/// Half the measured daily average, never below five.
fn daily_trade_cap(avg_trades_per_day: Decimal) -> i64 {
    (avg_trades_per_day * dec!(0.5))
        .trunc()
        .to_i64()
        .unwrap_or(0)
        .max(MIN_DAILY_TRADE_CAP)
}

/// Twice the measured risk-reward ratio as a percentage, never below three.
fn take_profit_pct(risk_reward_ratio: Decimal) -> i64 {
    (risk_reward_ratio * dec!(2))
        .trunc()
        .to_i64()
        .unwrap_or(0)
        .max(MIN_TAKE_PROFIT_PCT)
}

pub fn build_recommendations(detections: &BiasDetections) -> Vec<Recommendation> {
    let mut out = Vec::new();

    let overtrading = &detections.overtrading;
    if overtrading.detected {
        let cap = overtrading
            .metrics
            .as_ref()
            .map(|m| daily_trade_cap(m.avg_trades_per_day))
            .unwrap_or(MIN_DAILY_TRADE_CAP);
        let label = Bias::Overtrading.label();
        out.push(Recommendation::new(
            label,
            format!("Set a daily trade limit of {} trades per day", cap),
            lead_priority(overtrading.severity),
        ));
        out.push(Recommendation::new(
            label,
            "Implement a mandatory 30-minute cooldown period between trades",
            Priority::Medium,
        ));
    }

    let loss_aversion = &detections.loss_aversion;
    if loss_aversion.detected {
        let take_profit = loss_aversion
            .metrics
            .as_ref()
            .map(|m| take_profit_pct(m.risk_reward_ratio))
            .unwrap_or(MIN_TAKE_PROFIT_PCT);
        let label = Bias::LossAversion.label();
        out.push(Recommendation::new(
            label,
            format!(
                "Set stop-loss orders at 2% and take-profit at {}% to improve risk-reward ratio",
                take_profit
            ),
            lead_priority(loss_aversion.severity),
        ));
        out.push(Recommendation::new(
            label,
            "Use trailing stop-losses to let winners run while protecting gains",
            Priority::Medium,
        ));
    }

    let revenge_trading = &detections.revenge_trading;
    if revenge_trading.detected {
        let label = Bias::RevengeTrading.label();
        out.push(Recommendation::new(
            label,
            "Implement a mandatory 2-hour break after any losing trade",
            lead_priority(revenge_trading.severity),
        ));
        out.push(Recommendation::new(
            label,
            "Reduce position size by 50% for the next 3 trades after a loss",
            Priority::Medium,
        ));
    }

    if out.is_empty() {
        out.push(Recommendation::new(
            GENERAL,
            "Maintain a trading journal to track emotions and decisions",
            Priority::Low,
        ));
        out.push(Recommendation::new(
            GENERAL,
            "Review your trading plan weekly and stick to predefined rules",
            Priority::Low,
        ));
    }
    out
}
