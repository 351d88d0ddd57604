use serde_json::Value;
use std::io;

use super::{flatten, scalar_text};

const BIAS_KEYS: [&str; 3] = ["overtrading", "loss_aversion", "revenge_trading"];
const BIAS_COLUMNS: [&str; 5] = ["bias", "detected", "severity", "score", "description"];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    for row in csv_rows(value) {
        let _ = wtr.write_record(&row);
    }
    let _ = wtr.flush();
}

/// A full report becomes one row per bias; anything else is flattened to
/// two-column `field,value` rows.
fn csv_rows(value: &Value) -> Vec<Vec<String>> {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(map) = result.as_object() {
        if BIAS_KEYS.iter().all(|k| map.contains_key(*k)) {
            let mut rows = vec![BIAS_COLUMNS.iter().map(|c| c.to_string()).collect()];
            for key in BIAS_KEYS {
                let detection = &map[key];
                let mut row = vec![key.to_string()];
                row.extend(
                    BIAS_COLUMNS[1..]
                        .iter()
                        .map(|col| detection.get(*col).map(scalar_text).unwrap_or_default()),
                );
                rows.push(row);
            }
            return rows;
        }
    }

    let mut pairs = Vec::new();
    flatten("", result, &mut pairs);
    let mut rows = vec![vec!["field".to_string(), "value".to_string()]];
    rows.extend(pairs.into_iter().map(|(k, v)| vec![k, v]));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_report_one_row_per_bias() {
        let detection = |score: &str| {
            json!({"detected": false, "severity": "Low", "score": score, "metrics": null, "description": "ok"})
        };
        let v = json!({
            "result": {
                "overtrading": detection("0"),
                "loss_aversion": detection("20"),
                "revenge_trading": detection("10"),
                "summary": {}
            }
        });
        let rows = csv_rows(&v);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec!["bias", "detected", "severity", "score", "description"]);
        assert_eq!(rows[2], vec!["loss_aversion", "false", "Low", "20", "ok"]);
    }

    #[test]
    fn test_single_detection_flattened() {
        let v = json!({"result": {"score": "40", "metrics": {"avg_win": "50"}}});
        let rows = csv_rows(&v);
        assert_eq!(rows[0], vec!["field", "value"]);
        assert!(rows.contains(&vec!["metrics.avg_win".to_string(), "50".to_string()]));
    }
}
