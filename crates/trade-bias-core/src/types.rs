use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All P/L values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages on a 0-100 scale (55.0 = 55%), matching the detector thresholds.
pub type Percent = Decimal;

/// Elapsed time between trades, in (fractional) minutes
pub type Minutes = Decimal;

/// Bias severity score, 0-100
pub type Score = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Mean of a slice, zero when empty.
pub(crate) fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().copied().sum::<Decimal>() / Decimal::from(values.len() as u64)
}

/// `part / whole` on a 0-100 scale, zero when `whole` is zero.
pub(crate) fn percent_of(part: usize, whole: usize) -> Percent {
    if whole == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part as u64) / Decimal::from(whole as u64) * Decimal::ONE_HUNDRED
}
