use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::trade_log::TradeLog;
use crate::types::*;

/// Descriptive statistics for the whole log. Pure aggregation, no thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingStatistics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub total_pnl: Money,
    pub avg_pnl: Money,
    /// Highest single P/L (may be negative if nothing won)
    pub largest_win: Money,
    /// Lowest single P/L, signed
    pub largest_loss: Money,
    pub win_rate: Percent,
    pub trading_days: usize,
    pub unique_assets: usize,
    /// gross profit / gross loss; None if nothing lost
    pub profit_factor: Option<Decimal>,
    /// Largest peak-to-trough decline of cumulative P/L
    pub max_drawdown: Money,
    pub max_consecutive_wins: u32,
    pub max_consecutive_losses: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_trade_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_trade_at: Option<NaiveDateTime>,
}

pub fn compute_statistics(log: &TradeLog) -> TradingStatistics {
    let trades = log.trades();
    let pnls: Vec<Money> = trades.iter().map(|t| t.pnl()).collect();

    let winning_trades = log.wins().count();
    let losing_trades = log.losses().count();
    let total_pnl: Money = pnls.iter().copied().sum();

    let gross_profit: Money = log.wins().map(|t| t.pnl()).sum();
    let gross_loss: Money = log.losses().map(|t| t.pnl()).sum::<Decimal>().abs();
    let profit_factor = if gross_loss > Decimal::ZERO {
        Some((gross_profit / gross_loss).round_dp(2))
    } else {
        None
    };

    let trading_days = trades.iter().map(|t| t.date).collect::<BTreeSet<_>>().len();
    let unique_assets = trades
        .iter()
        .filter_map(|t| t.trade.asset.as_deref())
        .collect::<BTreeSet<_>>()
        .len();

    let (max_consecutive_wins, max_consecutive_losses) = longest_streaks(log);

    TradingStatistics {
        total_trades: log.len(),
        winning_trades,
        losing_trades,
        breakeven_trades: log.len() - winning_trades - losing_trades,
        total_pnl: total_pnl.round_dp(2),
        avg_pnl: mean(&pnls).round_dp(2),
        largest_win: pnls.iter().copied().max().unwrap_or(Decimal::ZERO).round_dp(2),
        largest_loss: pnls.iter().copied().min().unwrap_or(Decimal::ZERO).round_dp(2),
        win_rate: log.win_rate().round_dp(1),
        trading_days,
        unique_assets,
        profit_factor,
        max_drawdown: compute_max_drawdown(&pnls).round_dp(2),
        max_consecutive_wins,
        max_consecutive_losses,
        first_trade_at: trades.first().map(|t| t.timestamp()),
        last_trade_at: trades.last().map(|t| t.timestamp()),
    }
}

/// Largest peak-to-trough decline in the cumulative running P/L.
fn compute_max_drawdown(pnls: &[Money]) -> Money {
    let mut cumulative = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut max_dd = Decimal::ZERO;

    for &pnl in pnls {
        cumulative += pnl;
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = peak - cumulative;
        if drawdown > max_dd {
            max_dd = drawdown;
        }
    }
    max_dd
}

/// Longest runs of wins and losses; a breakeven trade ends both.
fn longest_streaks(log: &TradeLog) -> (u32, u32) {
    let mut max_wins: u32 = 0;
    let mut max_losses: u32 = 0;
    let mut cur_wins: u32 = 0;
    let mut cur_losses: u32 = 0;

    for t in log.trades() {
        if t.is_win {
            cur_wins += 1;
            cur_losses = 0;
            max_wins = max_wins.max(cur_wins);
        } else if t.is_loss {
            cur_losses += 1;
            cur_wins = 0;
            max_losses = max_losses.max(cur_losses);
        } else {
            cur_wins = 0;
            cur_losses = 0;
        }
    }
    (max_wins, max_losses)
}
