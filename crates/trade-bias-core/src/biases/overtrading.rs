use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::detection::{DetectionResult, Severity};
use crate::trade_log::TradeLog;
use crate::types::*;

/// Mean trades per day above which the frequency term applies.
pub const AVG_TRADES_PER_DAY_LIMIT: Decimal = dec!(10);
/// Busiest-day trade count above which the peak term applies.
pub const MAX_TRADES_PER_DAY_LIMIT: Decimal = dec!(20);
/// A trade this close to its predecessor counts as rapid.
pub const RAPID_WINDOW_MINUTES: Minutes = dec!(5);
/// Share of rapid trades above which the rapid-fire term applies.
pub const RAPID_SHARE_LIMIT: Percent = dec!(30);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertradingMetrics {
    pub avg_trades_per_day: Decimal,
    pub max_trades_per_day: u32,
    pub rapid_trade_percentage: Percent,
    /// Mean of strictly positive gaps only
    pub avg_minutes_between_trades: Minutes,
    pub win_rate: Percent,
}

pub fn detect_overtrading(log: &TradeLog) -> DetectionResult<OvertradingMetrics> {
    // -- Trades per calendar day --
    let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for t in log.trades() {
        *per_day.entry(t.date).or_insert(0) += 1;
    }
    let avg_per_day = if per_day.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from(log.len() as u64) / Decimal::from(per_day.len() as u64)
    };
    let max_per_day = per_day.values().copied().max().unwrap_or(0);

    // -- Inter-trade gaps --
    let positive_gaps: Vec<Minutes> = log
        .trades()
        .iter()
        .filter_map(|t| t.minutes_since_prev)
        .filter(|gap| *gap > Decimal::ZERO)
        .collect();
    let avg_gap = mean(&positive_gaps);

    // Duplicate timestamps (gap 0) are rapid; the first trade has no gap
    let rapid = log
        .trades()
        .iter()
        .filter(|t| matches!(t.minutes_since_prev, Some(gap) if gap < RAPID_WINDOW_MINUTES))
        .count();
    let rapid_pct = percent_of(rapid, log.len());

    // -- Score --
    let mut score = Decimal::ZERO;
    if avg_per_day > AVG_TRADES_PER_DAY_LIMIT {
        score += (avg_per_day / AVG_TRADES_PER_DAY_LIMIT * dec!(20)).min(dec!(40));
    }
    let max_dec = Decimal::from(max_per_day);
    if max_dec > MAX_TRADES_PER_DAY_LIMIT {
        score += (max_dec / MAX_TRADES_PER_DAY_LIMIT * dec!(15)).min(dec!(30));
    }
    if rapid_pct > RAPID_SHARE_LIMIT {
        score += (rapid_pct / RAPID_SHARE_LIMIT * dec!(15)).min(dec!(30));
    }
    debug!(%score, %avg_per_day, max_per_day, %rapid_pct, "overtrading scored");

    let metrics = OvertradingMetrics {
        avg_trades_per_day: avg_per_day.round_dp(2),
        max_trades_per_day: max_per_day,
        rapid_trade_percentage: rapid_pct.round_dp(1),
        avg_minutes_between_trades: avg_gap.round_dp(1),
        win_rate: log.win_rate().round_dp(1),
    };
    DetectionResult::scored(score, metrics, |severity| {
        describe(severity, avg_per_day, rapid_pct)
    })
}

fn describe(severity: Severity, avg_per_day: Decimal, rapid_pct: Percent) -> String {
    match severity {
        Severity::High => format!(
            "You're averaging {:.1} trades per day with {:.1}% occurring within 5 minutes of \
             each other. This suggests impulsive, strategy-less trading that increases \
             transaction costs and emotional stress.",
            avg_per_day, rapid_pct
        ),
        Severity::Moderate => format!(
            "Your trading frequency ({:.1} trades/day) is elevated. Consider whether each \
             trade aligns with your strategy before executing.",
            avg_per_day
        ),
        Severity::Low => {
            "Your trading frequency appears reasonable, but monitor for impulsive trades."
                .to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
