use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::{DetectionResult, Severity};
use crate::trade_log::TradeLog;
use crate::types::*;

pub const POOR_RISK_REWARD: Decimal = dec!(1.0);
pub const WEAK_RISK_REWARD: Decimal = dec!(1.5);
/// Win rate above which a sub-1.2 risk-reward signals winners cut early.
pub const HIGH_WIN_RATE: Percent = dec!(60);
pub const CUT_WINNERS_RISK_REWARD: Decimal = dec!(1.2);
/// Largest loss beyond this multiple of the largest win signals held losers.
pub const OUTSIZED_LOSS_MULTIPLE: Decimal = dec!(2);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossAversionMetrics {
    /// average_win / average_loss; zero if average_loss is zero
    pub risk_reward_ratio: Decimal,
    pub avg_win: Money,
    /// Magnitude, always non-negative
    pub avg_loss: Money,
    pub win_rate: Percent,
    pub largest_win: Money,
    /// Magnitude, always non-negative
    pub largest_loss: Money,
}

pub fn detect_loss_aversion(log: &TradeLog) -> DetectionResult<LossAversionMetrics> {
    let winners: Vec<Money> = log.wins().map(|t| t.pnl()).collect();
    let losers: Vec<Money> = log.losses().map(|t| t.pnl()).collect();

    if winners.is_empty() || losers.is_empty() {
        return DetectionResult::not_detected(
            "Insufficient data to detect loss aversion patterns.",
        );
    }

    let avg_win = mean(&winners);
    let avg_loss = mean(&losers).abs();
    let risk_reward = if avg_loss > Decimal::ZERO {
        avg_win / avg_loss
    } else {
        Decimal::ZERO
    };
    let win_rate = log.win_rate();
    let largest_win = winners.iter().copied().max().unwrap_or(Decimal::ZERO);
    let largest_loss = losers
        .iter()
        .copied()
        .map(|d| d.abs())
        .max()
        .unwrap_or(Decimal::ZERO);

    // -- Score --
    let mut score = Decimal::ZERO;
    if risk_reward < POOR_RISK_REWARD {
        score += dec!(40);
    } else if risk_reward < WEAK_RISK_REWARD {
        score += dec!(20);
    }
    if win_rate > HIGH_WIN_RATE && risk_reward < CUT_WINNERS_RISK_REWARD {
        score += dec!(30);
    }
    if largest_loss > largest_win * OUTSIZED_LOSS_MULTIPLE {
        score += dec!(30);
    }
    debug!(%score, %risk_reward, %win_rate, "loss aversion scored");

    let metrics = LossAversionMetrics {
        risk_reward_ratio: risk_reward.round_dp(2),
        avg_win: avg_win.round_dp(2),
        avg_loss: avg_loss.round_dp(2),
        win_rate: win_rate.round_dp(1),
        largest_win: largest_win.round_dp(2),
        largest_loss: largest_loss.round_dp(2),
    };
    DetectionResult::scored(score, metrics, |severity| {
        describe(severity, risk_reward, win_rate)
    })
}

fn describe(severity: Severity, risk_reward: Decimal, win_rate: Percent) -> String {
    match severity {
        Severity::High => format!(
            "Your risk-reward ratio ({:.2}) suggests you're cutting winners short while \
             holding losers. With a {:.1}% win rate, you need larger wins to offset losses.",
            risk_reward, win_rate
        ),
        Severity::Moderate => format!(
            "Your risk-reward ratio ({:.2}) could be improved. Consider letting winners run \
             longer and cutting losses faster.",
            risk_reward
        ),
        Severity::Low => "Your risk-reward management appears balanced.".to_string(),
    }
}
