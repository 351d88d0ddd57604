use serde_json::Value;
use std::io::Read;

use trade_bias_core::RawTrade;

use super::file::resolve_path;

/// Column positions located by case-insensitive header substring match.
/// The first matching header wins for each field.
#[derive(Debug, Default, PartialEq)]
struct ColumnMap {
    timestamp: Option<usize>,
    side: Option<usize>,
    asset: Option<usize>,
    pnl: Option<usize>,
}

fn find_column(headers: &[String], needles: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| needles.iter().any(|needle| h.contains(needle)))
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        ColumnMap {
            timestamp: find_column(&lowered, &["timestamp"]),
            side: find_column(&lowered, &["buy", "sell", "action", "side"]),
            asset: find_column(&lowered, &["asset", "symbol"]),
            pnl: find_column(&lowered, &["p/l", "pnl", "profit"]),
        }
    }
}

fn cell(record: &csv::StringRecord, idx: Option<usize>) -> Option<Value> {
    let text = record.get(idx?)?.trim();
    if text.is_empty() {
        None
    } else {
        Some(Value::String(text.to_string()))
    }
}

/// Parse CSV trade rows. Unmatched columns and blank cells become absent
/// fields, which the core validates like any other input.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawTrade>, Box<dyn std::error::Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = ColumnMap::from_headers(rdr.headers()?);

    let mut trades = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        trades.push(RawTrade {
            timestamp: cell(&record, columns.timestamp),
            side: cell(&record, columns.side),
            asset: cell(&record, columns.asset),
            pnl: cell(&record, columns.pnl),
        });
    }
    Ok(trades)
}

/// Read a CSV trade log file.
pub fn read_csv_trades(path: &str) -> Result<Vec<RawTrade>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let file = std::fs::File::open(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    parse_csv(file).map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}
