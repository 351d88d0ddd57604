use serde_json::Value;

use super::scalar_text;

/// Print just the key answer from the output.
///
/// A full report prints the detected biases (or "none"); otherwise the first
/// non-null priority field, falling back to the first field in the result.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_text(value));
}

fn minimal_text(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(Value::Array(biases)) = result_obj.pointer("/summary/biases_detected") {
        if biases.is_empty() {
            return "none".to_string();
        }
        let labels: Vec<String> = biases.iter().map(scalar_text).collect();
        return labels.join(", ");
    }

    let priority_keys = ["score", "total_pnl", "win_rate"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return scalar_text(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, scalar_text(val));
        }
    }

    scalar_text(result_obj)
}
