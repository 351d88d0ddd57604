use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

use crate::types::{percent_of, Minutes, Money, Percent};
use crate::{TradeBiasError, TradeBiasResult};

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A trade record as supplied by the caller, before validation.
///
/// Fields are kept loosely typed so that a bad row can be dropped instead of
/// failing the whole batch. Both the lower-case keys and the spreadsheet
/// column headings (`Timestamp`, `Buy/sell`, `Asset`, `P/L`) are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrade {
    #[serde(default, alias = "Timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(
        default,
        alias = "Buy/sell",
        alias = "action",
        skip_serializing_if = "Option::is_none"
    )]
    pub side: Option<Value>,
    #[serde(default, alias = "Asset", skip_serializing_if = "Option::is_none")]
    pub asset: Option<Value>,
    #[serde(
        default,
        alias = "P/L",
        alias = "pl",
        skip_serializing_if = "Option::is_none"
    )]
    pub pnl: Option<Value>,
}

/// Direction of the execution. Carried through but not used for scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
    #[default]
    Unknown,
    Other(String),
}

/// A validated trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: NaiveDateTime,
    pub side: TradeSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    pub pnl: Money,
}

/// A trade plus the per-trade fields every detector reads.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTrade {
    pub trade: Trade,
    /// Row index in the caller's input
    pub source_index: usize,
    pub date: NaiveDate,
    pub is_win: bool,
    pub is_loss: bool,
    /// None for the first trade in the log
    pub minutes_since_prev: Option<Minutes>,
    /// None for the first trade in the log
    pub prev_was_loss: Option<bool>,
}

impl NormalizedTrade {
    pub fn pnl(&self) -> Money {
        self.trade.pnl
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.trade.timestamp
    }
}

/// Valid trades in ascending timestamp order. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLog {
    trades: Vec<NormalizedTrade>,
    dropped_rows: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Accepts RFC 3339 (wall-clock time at the given offset is kept), the
/// common naive ISO layouts, and a bare date (midnight).
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Largest accepted |P/L| for a single trade. Larger values are unparseable.
pub const MAX_ABS_PNL: Money = dec!(1000000000000000);

/// Decimal places kept on each P/L. Bounds how small a nonzero loss can be,
/// so ratios against it stay representable.
pub const PNL_DECIMAL_PLACES: u32 = 8;

/// Numeric coercion: JSON numbers and numeric strings, anything else is None.
/// Values are rounded to [`PNL_DECIMAL_PLACES`]; |P/L| above [`MAX_ABS_PNL`]
/// is None.
pub fn parse_pnl(value: &Value) -> Option<Money> {
    let pnl = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }?;
    bounded_pnl(pnl)
}

fn bounded_pnl(pnl: Money) -> Option<Money> {
    if pnl.abs() > MAX_ABS_PNL {
        return None;
    }
    Some(pnl.round_dp(PNL_DECIMAL_PLACES))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}

impl TradeSide {
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "buy" | "long" => TradeSide::Buy,
            "sell" | "short" => TradeSide::Sell,
            "" => TradeSide::Unknown,
            _ => TradeSide::Other(trimmed.to_string()),
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl RawTrade {
    /// Validate a single row. None when timestamp or pnl cannot be parsed.
    pub fn parse(&self) -> Option<Trade> {
        let timestamp = self
            .timestamp
            .as_ref()
            .and_then(Value::as_str)
            .and_then(parse_timestamp)?;
        let pnl = self.pnl.as_ref().and_then(parse_pnl)?;
        let side = self
            .side
            .as_ref()
            .and_then(value_text)
            .map(|s| TradeSide::parse(&s))
            .unwrap_or_default();
        let asset = self.asset.as_ref().and_then(value_text);
        Some(Trade {
            timestamp,
            side,
            asset,
            pnl,
        })
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn minutes_between(earlier: NaiveDateTime, later: NaiveDateTime) -> Minutes {
    let millis = later.signed_duration_since(earlier).num_milliseconds();
    Decimal::from(millis) / dec!(60000)
}

fn missing_fields(records: &[RawTrade]) -> Vec<&'static str> {
    let presence = [
        ("timestamp", records.iter().any(|r| r.timestamp.is_some())),
        ("side", records.iter().any(|r| r.side.is_some())),
        ("asset", records.iter().any(|r| r.asset.is_some())),
        ("pnl", records.iter().any(|r| r.pnl.is_some())),
    ];
    presence
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name)
        .collect()
}

impl TradeLog {
    /// Build the analyzable log from raw rows.
    ///
    /// The schema check runs before any row is parsed: a field that no record
    /// carries at all is a validation failure. Rows whose timestamp or pnl
    /// cannot be parsed are dropped; the batch fails only if none survive.
    pub fn from_raw(records: &[RawTrade]) -> TradeBiasResult<Self> {
        if records.is_empty() {
            return Err(TradeBiasError::invalid(
                "trades",
                "No trading data provided",
            ));
        }
        let missing = missing_fields(records);
        if !missing.is_empty() {
            return Err(TradeBiasError::invalid(
                missing.join(", "),
                format!("Missing required fields: {}", missing.join(", ")),
            ));
        }

        let mut parsed: Vec<(usize, Trade)> = Vec::with_capacity(records.len());
        let mut dropped_rows = Vec::new();
        for (idx, raw) in records.iter().enumerate() {
            match raw.parse() {
                Some(trade) => parsed.push((idx, trade)),
                None => {
                    debug!(row = idx, "dropping trade with unparseable timestamp or pnl");
                    dropped_rows.push(idx);
                }
            }
        }

        let trades = Self::normalize(parsed)?;
        debug!(
            trades = trades.len(),
            dropped = dropped_rows.len(),
            "normalized trade log"
        );
        Ok(TradeLog {
            trades,
            dropped_rows,
        })
    }

    /// Build the log from already-validated trades.
    ///
    /// P/L is held to the same bound and precision as parsed input; a trade
    /// outside the bound fails the whole batch.
    pub fn from_trades(trades: Vec<Trade>) -> TradeBiasResult<Self> {
        let mut indexed = Vec::with_capacity(trades.len());
        for (idx, mut trade) in trades.into_iter().enumerate() {
            trade.pnl = bounded_pnl(trade.pnl).ok_or_else(|| {
                TradeBiasError::invalid(
                    "pnl",
                    format!("Trade {} P/L exceeds the maximum of {}", idx, MAX_ABS_PNL),
                )
            })?;
            indexed.push((idx, trade));
        }
        Ok(TradeLog {
            trades: Self::normalize(indexed)?,
            dropped_rows: Vec::new(),
        })
    }

    fn normalize(mut parsed: Vec<(usize, Trade)>) -> TradeBiasResult<Vec<NormalizedTrade>> {
        if parsed.is_empty() {
            return Err(TradeBiasError::invalid(
                "trades",
                "No valid trading data found after processing",
            ));
        }

        // Vec::sort_by_key is stable: equal timestamps keep input order
        parsed.sort_by_key(|(_, t)| t.timestamp);

        let mut out = Vec::with_capacity(parsed.len());
        let mut prev: Option<(NaiveDateTime, bool)> = None;
        for (source_index, trade) in parsed {
            let is_loss = trade.pnl < Decimal::ZERO;
            let minutes_since_prev = prev.map(|(ts, _)| minutes_between(ts, trade.timestamp));
            let prev_was_loss = prev.map(|(_, loss)| loss);
            prev = Some((trade.timestamp, is_loss));
            out.push(NormalizedTrade {
                date: trade.timestamp.date(),
                is_win: trade.pnl > Decimal::ZERO,
                is_loss,
                minutes_since_prev,
                prev_was_loss,
                source_index,
                trade,
            });
        }
        Ok(out)
    }

    pub fn trades(&self) -> &[NormalizedTrade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Input row indices that were dropped during parsing.
    pub fn dropped_rows(&self) -> &[usize] {
        &self.dropped_rows
    }

    pub fn wins(&self) -> impl Iterator<Item = &NormalizedTrade> {
        self.trades.iter().filter(|t| t.is_win)
    }

    pub fn losses(&self) -> impl Iterator<Item = &NormalizedTrade> {
        self.trades.iter().filter(|t| t.is_loss)
    }

    pub fn total_pnl(&self) -> Money {
        self.trades.iter().map(|t| t.pnl()).sum()
    }

    /// Winning trades as a share of all trades, 0-100.
    pub fn win_rate(&self) -> Percent {
        percent_of(self.wins().count(), self.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
