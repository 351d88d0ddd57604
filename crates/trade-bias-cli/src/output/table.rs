use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, scalar_text};

const BIASES: [(&str, &str); 3] = [
    ("overtrading", "Overtrading"),
    ("loss_aversion", "Loss Aversion"),
    ("revenge_trading", "Revenge Trading"),
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result);
                print_envelope_notes(map);
            } else {
                print_field_value(value);
            }
        }
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value) {
    match result {
        Value::Object(res) if BIASES.iter().all(|(key, _)| res.contains_key(*key)) => {
            print_report(res)
        }
        _ => print_field_value(result),
    }
}

/// Full report: bias scores, summary, recommendations, statistics.
fn print_report(res: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Bias", "Detected", "Severity", "Score", "Assessment"]);
    for (key, label) in BIASES {
        let d = &res[key];
        builder.push_record([
            label.to_string(),
            field(d, "detected"),
            field(d, "severity"),
            field(d, "score"),
            field(d, "description"),
        ]);
    }
    println!("{}", Table::from(builder));

    if let Some(summary) = res.get("summary") {
        println!(
            "\nTrades: {}  Total P/L: {}  Win rate: {}%  Biases detected: {}",
            field(summary, "total_trades"),
            field(summary, "total_pnl"),
            field(summary, "win_rate"),
            field(summary, "bias_count"),
        );
    }

    if let Some(Value::Array(recs)) = res.get("recommendations") {
        let mut builder = Builder::default();
        builder.push_record(["Priority", "Bias", "Recommendation"]);
        for rec in recs {
            builder.push_record([
                field(rec, "priority"),
                field(rec, "bias"),
                field(rec, "recommendation"),
            ]);
        }
        println!("\nRecommendations:\n{}", Table::from(builder));
    }

    if let Some(stats) = res.get("statistics") {
        println!("\nStatistics:");
        print_field_value(stats);
    }
}

fn print_field_value(value: &Value) {
    let mut pairs = Vec::new();
    flatten("", value, &mut pairs);
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in pairs {
        builder.push_record([key, val]);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn field(value: &Value, key: &str) -> String {
    value.get(key).map(scalar_text).unwrap_or_default()
}
