use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::{DetectionResult, Severity};
use crate::trade_log::TradeLog;
use crate::types::*;

/// A post-loss trade inside this window counts as rapid.
pub const RAPID_AFTER_LOSS_MINUTES: Minutes = dec!(30);
/// Post-loss gap below this fraction of the post-non-loss gap scores.
pub const GAP_COMPRESSION_RATIO: Decimal = dec!(0.5);
pub const RAPID_AFTER_LOSS_SHARE_LIMIT: Percent = dec!(50);
/// Post-loss |P/L| above this multiple of post-non-loss |P/L| scores.
pub const SIZE_ESCALATION_RATIO: Decimal = dec!(1.3);
pub const POST_LOSS_WIN_RATE_FLOOR: Percent = dec!(40);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevengeTradingMetrics {
    pub avg_minutes_after_loss: Minutes,
    pub avg_minutes_after_non_loss: Minutes,
    pub rapid_trade_after_loss_pct: Percent,
    pub win_rate_after_loss: Percent,
    /// Mean |P/L| of post-loss trades, a stand-in for position size
    pub avg_abs_pl_after_loss: Money,
    pub avg_abs_pl_after_non_loss: Money,
}

/// Trades grouped by what the previous trade did.
#[derive(Debug, Default)]
struct FollowUps {
    gaps: Vec<Minutes>,
    abs_pnls: Vec<Money>,
    wins: usize,
}

impl FollowUps {
    fn push(&mut self, gap: Minutes, pnl: Money, is_win: bool) {
        self.gaps.push(gap);
        self.abs_pnls.push(pnl.abs());
        if is_win {
            self.wins += 1;
        }
    }

    fn len(&self) -> usize {
        self.gaps.len()
    }

    fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }
}

pub fn detect_revenge_trading(log: &TradeLog) -> DetectionResult<RevengeTradingMetrics> {
    if log.len() < 2 {
        return DetectionResult::not_detected(
            "Insufficient data to detect revenge trading patterns.",
        );
    }

    let mut after_loss = FollowUps::default();
    let mut after_non_loss = FollowUps::default();
    for t in log.trades() {
        // The first trade has no predecessor and belongs to neither group
        let (Some(prev_was_loss), Some(gap)) = (t.prev_was_loss, t.minutes_since_prev) else {
            continue;
        };
        let group = if prev_was_loss {
            &mut after_loss
        } else {
            &mut after_non_loss
        };
        group.push(gap, t.pnl(), t.is_win);
    }

    if after_loss.is_empty() {
        return DetectionResult::not_detected("No consecutive loss patterns detected.");
    }

    let gap_after_loss = mean(&after_loss.gaps);
    let abs_pl_after_loss = mean(&after_loss.abs_pnls);
    // An empty comparison group neutralizes the two relative terms
    let (gap_after_non_loss, abs_pl_after_non_loss) = if after_non_loss.is_empty() {
        (gap_after_loss, abs_pl_after_loss)
    } else {
        (mean(&after_non_loss.gaps), mean(&after_non_loss.abs_pnls))
    };

    let rapid = after_loss
        .gaps
        .iter()
        .filter(|gap| **gap < RAPID_AFTER_LOSS_MINUTES)
        .count();
    let rapid_pct = percent_of(rapid, after_loss.len());
    let win_rate_after_loss = percent_of(after_loss.wins, after_loss.len());

    // -- Score --
    let mut score = Decimal::ZERO;
    if gap_after_loss < gap_after_non_loss * GAP_COMPRESSION_RATIO {
        score += dec!(40);
    }
    if rapid_pct > RAPID_AFTER_LOSS_SHARE_LIMIT {
        score += dec!(30);
    }
    if abs_pl_after_loss > abs_pl_after_non_loss * SIZE_ESCALATION_RATIO {
        score += dec!(20);
    }
    if win_rate_after_loss < POST_LOSS_WIN_RATE_FLOOR {
        score += dec!(20);
    }
    debug!(
        %score,
        post_loss_trades = after_loss.len(),
        post_non_loss_trades = after_non_loss.len(),
        "revenge trading scored"
    );

    let metrics = RevengeTradingMetrics {
        avg_minutes_after_loss: gap_after_loss.round_dp(1),
        avg_minutes_after_non_loss: gap_after_non_loss.round_dp(1),
        rapid_trade_after_loss_pct: rapid_pct.round_dp(1),
        win_rate_after_loss: win_rate_after_loss.round_dp(1),
        avg_abs_pl_after_loss: abs_pl_after_loss.round_dp(2),
        avg_abs_pl_after_non_loss: abs_pl_after_non_loss.round_dp(2),
    };
    DetectionResult::scored(score, metrics, |severity| {
        describe(severity, rapid_pct, win_rate_after_loss)
    })
}

fn describe(severity: Severity, rapid_pct: Percent, win_rate_after_loss: Percent) -> String {
    match severity {
        Severity::High => format!(
            "You're trading {:.1}% of the time within 30 minutes after losses, with only \
             {:.1}% win rate in those trades. This suggests emotional, revenge-driven trading.",
            rapid_pct, win_rate_after_loss
        ),
        Severity::Moderate => format!(
            "You show some tendency to trade quickly after losses ({:.1}%). Take breaks \
             after losses to avoid emotional decisions.",
            rapid_pct
        ),
        Severity::Low => {
            "You're managing emotions well after losses. Continue this discipline.".to_string()
        }
    }
}
